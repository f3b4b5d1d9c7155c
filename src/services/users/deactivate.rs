use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
};
use crate::services::error_response;

use super::UserService;

pub async fn handle_deactivate(
    service: &UserService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 管理员不能停用自己，防止锁死最后一个管理员账户
    if RequireSession::extract_user_id(request) == Some(id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::BadRequest,
            "Cannot deactivate the current account",
        )));
    }

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::UserDeactivated,
    )
    .resource(crate::storage::resource::USER, id);

    match storage.deactivate_user(id, audit).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
            "User deactivated",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
            ErrorCode::UserNotFound,
            "User not found or already inactive",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
