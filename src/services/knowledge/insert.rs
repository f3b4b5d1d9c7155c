use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    knowledge::requests::InsertFeedbackRequest,
};
use crate::services::error_response;
use crate::services::grading::{PERSIST_RETRIES, conflict_response, load_owned_session, load_rubric};

use super::KnowledgeService;

/// 把知识库条目内容追加到评分会话某条目的反馈中。
/// 会话行、使用计数与审计在同一事务内走乐观持久化。
pub async fn handle_insert(
    service: &KnowledgeService,
    id: i64,
    req: InsertFeedbackRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let entry = match storage.get_knowledge_entry(id).await {
        Ok(Some(entry)) if entry.is_active => entry,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::KnowledgeNotFound,
                "Knowledge entry not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    for _ in 0..PERSIST_RETRIES {
        let mut session =
            match load_owned_session(&storage, req.grading_session_id, &user).await {
                Ok(session) => session,
                Err(response) => return Ok(response),
            };

        let rubric = match load_rubric(&storage, session.assignment_id).await {
            Ok(rubric) => rubric,
            Err(response) => return Ok(response),
        };

        let expected_status = session.status;
        let expected_version = session.version;

        if let Err(e) = session.append_feedback(&req.criterion_id, &entry.content, &rubric) {
            return Ok(error_response(&e));
        }

        let audit = NewAuditEntry::new(
            RequireSession::audit_context(request),
            AuditAction::FeedbackInserted,
        )
        .resource(crate::storage::resource::GRADING_SESSION, session.id)
        .details(serde_json::json!({
            "knowledge_entry_id": id,
            "criterion_id": req.criterion_id,
        }));

        match storage
            .persist_grading_session_with_usage(&session, expected_status, expected_version, id, audit)
            .await
        {
            Ok(true) => {
                session.version = expected_version + 1;
                return Ok(
                    HttpResponse::Ok().json(ApiResponse::success(session, "Feedback inserted"))
                );
            }
            Ok(false) => continue,
            Err(e) => return Ok(error_response(&e)),
        }
    }

    Ok(conflict_response())
}
