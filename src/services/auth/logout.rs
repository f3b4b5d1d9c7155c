use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
};

use super::AuthService;

pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(session) = RequireSession::extract_session(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let audit = NewAuditEntry::new(RequireSession::audit_context(request), AuditAction::Logout)
        .resource(crate::storage::resource::SESSION, session.id.clone());

    // 吊销是幂等的，重复登出同样返回成功
    match storage.revoke_session(&session.id, audit).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("Logged out"))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                ErrorCode::InternalServerError,
                format!("Logout failed: {e}"),
            )),
        ),
    }
}
