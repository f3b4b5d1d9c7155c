use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::knowledge::requests::{
    CreateKnowledgeRequest, InsertFeedbackRequest, KnowledgeSearchParams, RateKnowledgeRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::KnowledgeService;

// 懒加载的全局 KnowledgeService 实例
static KNOWLEDGE_SERVICE: Lazy<KnowledgeService> = Lazy::new(KnowledgeService::new_lazy);

pub async fn create_entry(
    req: HttpRequest,
    payload: web::Json<CreateKnowledgeRequest>,
) -> ActixResult<HttpResponse> {
    KNOWLEDGE_SERVICE.create(payload.into_inner(), &req).await
}

pub async fn search_entries(
    req: HttpRequest,
    query: web::Query<KnowledgeSearchParams>,
) -> ActixResult<HttpResponse> {
    KNOWLEDGE_SERVICE.search(query.into_inner(), &req).await
}

pub async fn rate_entry(
    req: HttpRequest,
    id: web::Path<i64>,
    payload: web::Json<RateKnowledgeRequest>,
) -> ActixResult<HttpResponse> {
    KNOWLEDGE_SERVICE
        .rate(id.into_inner(), payload.into_inner(), &req)
        .await
}

pub async fn insert_into_feedback(
    req: HttpRequest,
    id: web::Path<i64>,
    payload: web::Json<InsertFeedbackRequest>,
) -> ActixResult<HttpResponse> {
    KNOWLEDGE_SERVICE
        .insert_into_feedback(id.into_inner(), payload.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_knowledge_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/knowledge")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::grader_roles()))
                    .route("", web::post().to(create_entry))
                    .route("", web::get().to(search_entries))
                    .route("/{id}/rate", web::post().to(rate_entry))
                    .route("/{id}/insert", web::post().to(insert_into_feedback)),
            ),
    );
}
