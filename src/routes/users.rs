use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::UserListParams;
use crate::services::UserService;
use crate::services::users::feedback::SubmitFeedbackRequest;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list(query.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    USER_SERVICE.get(user_id.into_inner(), &req).await
}

pub async fn deactivate_user(
    req: HttpRequest,
    user_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.deactivate(user_id.into_inner(), &req).await
}

pub async fn submit_feedback(
    req: HttpRequest,
    payload: web::Json<SubmitFeedbackRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.submit_feedback(payload.into_inner(), &req).await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireSession)
            .route("/feedback", web::post().to(submit_feedback))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new(&UserRole::Admin))
                    .route("", web::get().to(list_users))
                    .route("/{id}", web::get().to(get_user))
                    .route("/{id}", web::delete().to(deactivate_user)),
            ),
    );
}
