use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    grading::requests::ApplyAutomatedRequest,
};
use crate::services::error_response;

use super::{GradingService, PERSIST_RETRIES, conflict_response, load_owned_session, load_rubric};

pub async fn handle_apply_automated(
    service: &GradingService,
    id: i64,
    req: ApplyAutomatedRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    // 每次自动评分调用扣一次当日配额，超限直接拒绝
    let today = chrono::Utc::now().date_naive();
    let new_count = match storage
        .consume_quota(user.id, today, 1, config.quota.daily_limit)
        .await
    {
        Ok(count) => count,
        Err(e) => return Ok(error_response(&e)),
    };

    let quota_audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::QuotaConsumed,
    )
    .resource(crate::storage::resource::USER, user.id)
    .details(serde_json::json!({ "api_usage_count": new_count }));
    if let Err(e) = storage.record_audit(quota_audit).await {
        tracing::warn!("Failed to record quota audit: {}", e);
    }

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

        if let Err(e) = session.apply_automated(req.result.clone(), &rubric) {
            return Ok(error_response(&e));
        }
        session.code_metrics = req.code_metrics.clone();

        let audit = NewAuditEntry::new(
            RequireSession::audit_context(request),
            AuditAction::AutomatedResultApplied,
        )
        .resource(crate::storage::resource::GRADING_SESSION, id)
        .details(serde_json::json!({ "criteria": session.ai_result.len() }));

        match storage
            .persist_grading_session(&session, expected_status, expected_version, audit)
            .await
        {
            Ok(true) => {
                session.version = expected_version + 1;
                return Ok(
                    HttpResponse::Ok().json(ApiResponse::success(session, "Automated result stored"))
                );
            }
            Ok(false) => continue,
            Err(e) => return Ok(error_response(&e)),
        }
    }

    Ok(conflict_response())
}
