use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::{AssignmentListParams, CreateAssignmentRequest};
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

pub async fn create_assignment(
    req: HttpRequest,
    payload: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.create(payload.into_inner(), &req).await
}

pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list(query.into_inner(), &req).await
}

pub async fn get_assignment(req: HttpRequest, id: web::Path<i64>) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get(id.into_inner(), &req).await
}

pub async fn deactivate_assignment(
    req: HttpRequest,
    id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.deactivate(id.into_inner(), &req).await
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::grader_roles()))
                    .route("", web::post().to(create_assignment))
                    .route("", web::get().to(list_assignments))
                    .route("/{id}", web::get().to(get_assignment))
                    .route("/{id}", web::delete().to(deactivate_assignment)),
            ),
    );
}
