use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::metrics::requests::{
    ComputeMetricsRequest, GoldScoreAgreementRequest, ResearchExportParams,
};
use crate::models::users::entities::UserRole;
use crate::services::MetricsService;

// 懒加载的全局 MetricsService 实例
static METRICS_SERVICE: Lazy<MetricsService> = Lazy::new(MetricsService::new_lazy);

pub async fn compute_metrics(
    req: HttpRequest,
    payload: web::Json<ComputeMetricsRequest>,
) -> ActixResult<HttpResponse> {
    METRICS_SERVICE.compute(payload.into_inner(), &req).await
}

pub async fn list_metrics(
    req: HttpRequest,
    query: web::Query<ComputeMetricsRequest>,
) -> ActixResult<HttpResponse> {
    METRICS_SERVICE.list(query.into_inner(), &req).await
}

pub async fn gold_agreement(
    req: HttpRequest,
    payload: web::Json<GoldScoreAgreementRequest>,
) -> ActixResult<HttpResponse> {
    METRICS_SERVICE
        .gold_agreement(payload.into_inner(), &req)
        .await
}

pub async fn export_research_data(
    req: HttpRequest,
    query: web::Query<ResearchExportParams>,
) -> ActixResult<HttpResponse> {
    METRICS_SERVICE.export(query.into_inner(), &req).await
}

// 配置路由：研究指标只开放给教授与管理员
pub fn configure_metrics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/metrics")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::professor_roles()))
                    .route("", web::get().to(list_metrics))
                    .route("/compute", web::post().to(compute_metrics))
                    .route("/gold-agreement", web::post().to(gold_agreement))
                    .route("/export", web::get().to(export_research_data)),
            ),
    );
}
