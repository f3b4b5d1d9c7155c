use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode, auth::responses::QuotaResponse};

use super::AuthService;

pub async fn handle_me(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    match RequireSession::extract_user(request) {
        Some(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user, "OK"))),
        None => Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))),
    }
}

/// 当日配额占用；计数器跨日后由下一次消耗惰性清零，
/// 这里按日期判断展示值，避免午夜后显示昨天的计数
pub async fn handle_quota(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    match RequireSession::extract_user(request) {
        Some(user) => {
            let today = chrono::Utc::now().date_naive();
            let used = if user.api_usage_reset_date < today {
                0
            } else {
                user.api_usage_count
            };

            let response = QuotaResponse {
                api_usage_count: used,
                daily_limit: config.quota.daily_limit,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK")))
        }
        None => Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))),
    }
}
