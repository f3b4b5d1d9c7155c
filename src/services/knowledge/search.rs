use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse,
    knowledge::requests::{KnowledgeSearchParams, KnowledgeSearchQuery},
};
use crate::services::error_response;

use super::KnowledgeService;

pub async fn handle_search(
    service: &KnowledgeService,
    params: KnowledgeSearchParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let query = KnowledgeSearchQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        category: params.category,
        topic: params.topic,
    };

    match storage.search_knowledge(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK"))),
        Err(e) => Ok(error_response(&e)),
    }
}
