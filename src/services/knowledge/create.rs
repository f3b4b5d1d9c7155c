use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    knowledge::requests::CreateKnowledgeRequest,
};
use crate::services::error_response;

use super::KnowledgeService;

pub async fn handle_create(
    service: &KnowledgeService,
    req: CreateKnowledgeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    if req.topic.trim().is_empty() || req.content.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::BadRequest,
            "Topic and content must not be empty",
        )));
    }

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::KnowledgeCreated,
    )
    .details(serde_json::json!({ "category": req.category.to_string() }));

    match storage.create_knowledge_entry(user.id, req, audit).await {
        Ok(entry) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(entry, "Knowledge entry created")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
