use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    grading::requests::{NewGradingSession, OpenGradingSessionRequest},
};
use crate::services::error_response;
use crate::utils::hash_student_identifier;

use super::GradingService;

pub async fn handle_open(
    service: &GradingService,
    req: OpenGradingSessionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    // 作业必须存在且处于活跃状态
    let assignment = match storage.get_assignment_by_id(req.assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    if !assignment.is_active {
        return Ok(HttpResponse::Conflict().json(ApiResponse::<()>::error_empty(
            ErrorCode::AssignmentInactive,
            "Assignment has been deactivated",
        )));
    }

    // 原始学生标识只进哈希，绝不落库
    let student_identifier_hash = req
        .student_identifier
        .as_deref()
        .map(|identifier| hash_student_identifier(identifier, assignment.id));

    let new_session = NewGradingSession {
        assignment_id: assignment.id,
        grader_id: user.id,
        student_identifier_hash,
        student_code: req.student_code,
        research_consent: req.research_consent,
    };

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::GradingOpened,
    )
    .details(serde_json::json!({ "assignment_id": assignment.id }));

    match storage.create_grading_session(new_session, audit).await {
        Ok(session) => {
            tracing::info!(
                "Grading session {} opened by user {} for assignment {}",
                session.id,
                user.id,
                assignment.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(session, "Grading session opened")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
