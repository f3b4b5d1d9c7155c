use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Deserialize;

use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

use super::UserService;

#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub feedback_type: String,
    pub payload: serde_json::Value,
}

pub async fn handle_submit_feedback(
    service: &UserService,
    req: SubmitFeedbackRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    match storage
        .create_user_feedback(user_id, &req.feedback_type, req.payload)
        .await
    {
        Ok(id) => Ok(HttpResponse::Created().json(ApiResponse::success(
            serde_json::json!({ "id": id }),
            "Feedback recorded",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
