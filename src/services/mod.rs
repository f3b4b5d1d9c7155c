pub mod assignments;
pub mod audit;
pub mod auth;
pub mod grading;
pub mod knowledge;
pub mod metrics;
pub mod users;

pub use assignments::AssignmentService;
pub use audit::AuditService;
pub use auth::AuthService;
pub use grading::GradingService;
pub use knowledge::KnowledgeService;
pub use metrics::MetricsService;
pub use users::UserService;

use actix_web::HttpResponse;

use crate::errors::GraderError;
use crate::models::{ApiResponse, ErrorCode};

/// 把领域错误映射到 HTTP 响应
///
/// 错误分类集中在一处，各操作 handler 对非特判错误统一走这里。
pub(crate) fn error_response(err: &GraderError) -> HttpResponse {
    let (builder, code) = match err {
        GraderError::DuplicateIdentity(_) => {
            (HttpResponse::Conflict(), ErrorCode::UserAlreadyExists)
        }
        GraderError::InvalidCredentials(_) => {
            (HttpResponse::Unauthorized(), ErrorCode::AuthFailed)
        }
        GraderError::QuotaExceeded(_) => {
            (HttpResponse::TooManyRequests(), ErrorCode::QuotaExceeded)
        }
        GraderError::SessionExpired(_) => {
            (HttpResponse::Unauthorized(), ErrorCode::SessionExpired)
        }
        GraderError::SessionRevoked(_) => {
            (HttpResponse::Unauthorized(), ErrorCode::SessionRevoked)
        }
        GraderError::InvalidState(_) => {
            (HttpResponse::Conflict(), ErrorCode::InvalidGradingState)
        }
        GraderError::IncompleteRubric(_) => {
            (HttpResponse::UnprocessableEntity(), ErrorCode::IncompleteRubric)
        }
        GraderError::AssignmentInactive(_) => {
            (HttpResponse::Conflict(), ErrorCode::AssignmentInactive)
        }
        GraderError::InvalidRating(_) => (HttpResponse::BadRequest(), ErrorCode::InvalidRating),
        GraderError::Validation(_) => (HttpResponse::BadRequest(), ErrorCode::BadRequest),
        GraderError::NotFound(_) => (HttpResponse::NotFound(), ErrorCode::NotFound),
        _ => (
            HttpResponse::InternalServerError(),
            ErrorCode::InternalServerError,
        ),
    };

    let mut builder = builder;
    builder.json(ApiResponse::<()>::error_empty(code, err.message()))
}
