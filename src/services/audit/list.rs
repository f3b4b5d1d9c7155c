use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{ApiResponse, audit::requests::AuditLogListParams};
use crate::services::error_response;

use super::AuditService;

pub async fn handle_list(
    service: &AuditService,
    params: AuditLogListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_audit_log_with_pagination(params.into()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK"))),
        Err(e) => Ok(error_response(&e)),
    }
}
