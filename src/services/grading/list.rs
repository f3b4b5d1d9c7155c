use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    grading::{
        entities::GradingStatus,
        requests::{GradingSessionListParams, GradingSessionListQuery},
    },
    users::entities::UserRole,
};
use crate::services::error_response;

use super::GradingService;

pub async fn handle_list(
    service: &GradingService,
    params: GradingSessionListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let status = match params.status.as_deref() {
        Some(raw) => match GradingStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                    ErrorCode::BadRequest,
                    "Invalid status filter",
                )));
            }
        },
        None => None,
    };

    // 管理员可以查看全部会话，其他角色只能查看自己的
    let grader_id = if user.role == UserRole::Admin {
        None
    } else {
        Some(user.id)
    };

    let query = GradingSessionListQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        grader_id,
        assignment_id: params.assignment_id,
        status,
    };

    match storage.list_grading_sessions_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK"))),
        Err(e) => Ok(error_response(&e)),
    }
}
