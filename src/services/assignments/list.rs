use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::{AssignmentListParams, AssignmentListQuery},
};
use crate::services::error_response;

use super::AssignmentService;

pub async fn handle_list(
    service: &AssignmentService,
    params: AssignmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let query = AssignmentListQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        created_by: user_id,
        course_code: params.course_code,
    };

    match storage.list_assignments_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK"))),
        Err(e) => Ok(error_response(&e)),
    }
}
