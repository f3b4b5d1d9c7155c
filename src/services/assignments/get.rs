use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

use super::AssignmentService;

pub async fn handle_get(
    service: &AssignmentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_assignment_by_id(id).await {
        Ok(Some(assignment)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "OK")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
