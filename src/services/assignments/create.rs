use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::GraderError;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::CreateAssignmentRequest,
    audit::entities::{AuditAction, NewAuditEntry},
};
use crate::services::error_response;

use super::AssignmentService;

pub async fn handle_create(
    service: &AssignmentService,
    req: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::AssignmentCreated,
    );

    // 评分标准解析失败报 422，其余错误走统一映射
    match storage.create_assignment(user_id, req, audit).await {
        Ok(assignment) => {
            tracing::info!("Assignment {} created by user {}", assignment.id, user_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "Assignment created")))
        }
        Err(GraderError::Validation(msg)) => Ok(HttpResponse::UnprocessableEntity()
            .json(ApiResponse::<()>::error_empty(ErrorCode::RubricInvalid, msg))),
        Err(e) => Ok(error_response(&e)),
    }
}
