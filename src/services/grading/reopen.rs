use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
};
use crate::services::error_response;

use super::{GradingService, PERSIST_RETRIES, conflict_response, load_owned_session};

pub async fn handle_reopen(
    service: &GradingService,
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

    for _ in 0..PERSIST_RETRIES {
        let mut session = match load_owned_session(&storage, id, &user).await {
            Ok(session) => session,
            Err(response) => return Ok(response),
        };

        let expected_status = session.status;
        let expected_version = session.version;

        if let Err(e) = session.reopen() {
            return Ok(error_response(&e));
        }

        let audit = NewAuditEntry::new(
            RequireSession::audit_context(request),
            AuditAction::GradingReopened,
        )
        .resource(crate::storage::resource::GRADING_SESSION, id);

        match storage
            .persist_grading_session(&session, expected_status, expected_version, audit)
            .await
        {
            Ok(true) => {
                session.version = expected_version + 1;
                return Ok(HttpResponse::Ok().json(ApiResponse::success(session, "Session reopened")));
            }
            Ok(false) => continue,
            Err(e) => return Ok(error_response(&e)),
        }
    }

    Ok(conflict_response())
}
