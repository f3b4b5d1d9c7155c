use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
};
use crate::services::error_response;

use super::{GradingService, PERSIST_RETRIES, conflict_response, load_owned_session, load_rubric};

pub async fn handle_complete(
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
        let rubric = match load_rubric(&storage, session.assignment_id).await {
            Ok(rubric) => rubric,
            Err(response) => return Ok(response),
        };

        let expected_status = session.status;
        let expected_version = session.version;

        if let Err(e) = session.complete(&rubric, chrono::Utc::now()) {
            return Ok(error_response(&e));
        }

        let audit = NewAuditEntry::new(
            RequireSession::audit_context(request),
            AuditAction::GradingCompleted,
        )
        .resource(crate::storage::resource::GRADING_SESSION, id)
        .details(serde_json::json!({
            "total_score": session.total_score,
            "percentage": session.percentage,
            "ai_acceptance_rate": session.ai_acceptance_rate,
            "edit_count": session.edit_count,
        }));

        match storage
            .persist_grading_session(&session, expected_status, expected_version, audit)
            .await
        {
            Ok(true) => {
                session.version = expected_version + 1;
                tracing::info!(
                    "Grading session {} completed, total {:?}",
                    id,
                    session.total_score
                );
                return Ok(HttpResponse::Ok().json(ApiResponse::success(session, "Grading completed")));
            }
            Ok(false) => continue,
            Err(e) => return Ok(error_response(&e)),
        }
    }

    Ok(conflict_response())
}
