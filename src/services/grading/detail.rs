use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode};

use super::{GradingService, load_owned_session};

pub async fn handle_detail(
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

    match load_owned_session(&storage, id, &user).await {
        Ok(session) => Ok(HttpResponse::Ok().json(ApiResponse::success(session, "OK"))),
        Err(response) => Ok(response),
    }
}
