use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    grading::requests::ReviseFinalRequest,
};
use crate::services::error_response;

use super::{GradingService, PERSIST_RETRIES, conflict_response, load_owned_session, load_rubric};

pub async fn handle_revise(
    service: &GradingService,
    id: i64,
    req: ReviseFinalRequest,
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

        let edited = match session.revise_final(
            &req.criterion_id,
            req.score,
            req.feedback.clone(),
            &rubric,
        ) {
            Ok(edited) => edited,
            Err(e) => return Ok(error_response(&e)),
        };

        let audit = NewAuditEntry::new(
            RequireSession::audit_context(request),
            AuditAction::CriterionRevised,
        )
        .resource(crate::storage::resource::GRADING_SESSION, id)
        .details(serde_json::json!({
            "criterion_id": req.criterion_id,
            "score": req.score,
            "material_edit": edited,
        }));

        match storage
            .persist_grading_session(&session, expected_status, expected_version, audit)
            .await
        {
            Ok(true) => {
                session.version = expected_version + 1;
                return Ok(HttpResponse::Ok().json(ApiResponse::success(session, "Criterion revised")));
            }
            Ok(false) => continue,
            Err(e) => return Ok(error_response(&e)),
        }
    }

    Ok(conflict_response())
}
