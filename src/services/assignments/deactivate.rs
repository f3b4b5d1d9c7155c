use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    users::entities::UserRole,
};
use crate::services::error_response;

use super::AssignmentService;

pub async fn handle_deactivate(
    service: &AssignmentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    // 仅所有者或管理员可停用
    let assignment = match storage.get_assignment_by_id(id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    if assignment.created_by != user.id && user.role != UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error_empty(
            ErrorCode::Forbidden,
            "Only the owner can deactivate an assignment",
        )));
    }

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::AssignmentDeactivated,
    )
    .resource(crate::storage::resource::ASSIGNMENT, id);

    match storage.deactivate_assignment(id, audit).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
            "Assignment deactivated",
        ))),
        Ok(false) => Ok(HttpResponse::Conflict().json(ApiResponse::<()>::error_empty(
            ErrorCode::AssignmentInactive,
            "Assignment is already inactive",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
