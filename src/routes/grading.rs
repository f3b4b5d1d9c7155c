use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grading::requests::{
    ApplyAutomatedRequest, FlagSessionRequest, GradingSessionListParams,
    OpenGradingSessionRequest, ReviseFinalRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::GradingService;

// 懒加载的全局 GradingService 实例
static GRADING_SERVICE: Lazy<GradingService> = Lazy::new(GradingService::new_lazy);

pub async fn open_session(
    req: HttpRequest,
    payload: web::Json<OpenGradingSessionRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.open(payload.into_inner(), &req).await
}

pub async fn list_sessions(
    req: HttpRequest,
    query: web::Query<GradingSessionListParams>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.list(query.into_inner(), &req).await
}

pub async fn session_detail(req: HttpRequest, id: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.detail(id.into_inner(), &req).await
}

pub async fn apply_automated_result(
    req: HttpRequest,
    id: web::Path<i64>,
    payload: web::Json<ApplyAutomatedRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .apply_automated(id.into_inner(), payload.into_inner(), &req)
        .await
}

pub async fn revise_criterion(
    req: HttpRequest,
    id: web::Path<i64>,
    payload: web::Json<ReviseFinalRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .revise(id.into_inner(), payload.into_inner(), &req)
        .await
}

pub async fn complete_session(req: HttpRequest, id: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.complete(id.into_inner(), &req).await
}

pub async fn flag_session(
    req: HttpRequest,
    id: web::Path<i64>,
    payload: web::Json<FlagSessionRequest>,
) -> ActixResult<HttpResponse> {
    GRADING_SERVICE
        .flag(id.into_inner(), payload.into_inner(), &req)
        .await
}

pub async fn reopen_session(req: HttpRequest, id: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADING_SERVICE.reopen(id.into_inner(), &req).await
}

// 配置路由
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading-sessions")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::grader_roles()))
                    .route("", web::post().to(open_session))
                    .route("", web::get().to(list_sessions))
                    .route("/{id}", web::get().to(session_detail))
                    .route(
                        "/{id}/automated-result",
                        web::post().to(apply_automated_result),
                    )
                    .route("/{id}/revisions", web::post().to(revise_criterion))
                    .route("/{id}/complete", web::post().to(complete_session))
                    .route("/{id}/flag", web::post().to(flag_session))
                    .route("/{id}/reopen", web::post().to(reopen_session)),
            ),
    );
}
