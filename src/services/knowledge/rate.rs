use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    knowledge::requests::RateKnowledgeRequest,
};
use crate::services::error_response;

use super::KnowledgeService;

pub async fn handle_rate(
    service: &KnowledgeService,
    id: i64,
    req: RateKnowledgeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if !(1.0..=5.0).contains(&req.rating) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::InvalidRating,
            "Rating must be between 1 and 5",
        )));
    }

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::KnowledgeRated,
    )
    .details(serde_json::json!({ "rating": req.rating }));

    match storage.rate_knowledge_entry(id, req.rating, audit).await {
        Ok(Some(entry)) => Ok(HttpResponse::Ok().json(ApiResponse::success(entry, "Rating recorded"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
            ErrorCode::KnowledgeNotFound,
            "Knowledge entry not found",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
