pub mod automated;
pub mod complete;
pub mod detail;
pub mod flag;
pub mod list;
pub mod open;
pub mod reopen;
pub mod revise;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::entities::Rubric,
    grading::entities::GradingSession,
    users::entities::{User, UserRole},
};
use crate::services::error_response;
use crate::storage::Storage;

/// 乐观持久化的最大重放次数；超过即对并发冲突报 409
pub(crate) const PERSIST_RETRIES: usize = 3;

pub struct GradingService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradingService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 开启评分会话
    pub async fn open(
        &self,
        req: crate::models::grading::requests::OpenGradingSessionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        open::handle_open(self, req, request).await
    }

    // 存入自动评分结果
    pub async fn apply_automated(
        &self,
        id: i64,
        req: crate::models::grading::requests::ApplyAutomatedRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        automated::handle_apply_automated(self, id, req, request).await
    }

    // 修订单个条目
    pub async fn revise(
        &self,
        id: i64,
        req: crate::models::grading::requests::ReviseFinalRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        revise::handle_revise(self, id, req, request).await
    }

    // 完成评分
    pub async fn complete(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        complete::handle_complete(self, id, request).await
    }

    // 标记会话
    pub async fn flag(
        &self,
        id: i64,
        req: crate::models::grading::requests::FlagSessionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        flag::handle_flag(self, id, req, request).await
    }

    // 重新打开被标记的会话
    pub async fn reopen(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        reopen::handle_reopen(self, id, request).await
    }

    // 查看会话详情
    pub async fn detail(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        detail::handle_detail(self, id, request).await
    }

    // 列出会话
    pub async fn list(
        &self,
        params: crate::models::grading::requests::GradingSessionListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::handle_list(self, params, request).await
    }
}

/// 读取会话并做所有权检查：评审员本人或管理员
pub(crate) async fn load_owned_session(
    storage: &Arc<dyn Storage>,
    id: i64,
    user: &User,
) -> Result<GradingSession, HttpResponse> {
    let session = storage
        .get_grading_session(id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| {
            HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::GradingSessionNotFound,
                "Grading session not found",
            ))
        })?;

    if session.grader_id != user.id && user.role != UserRole::Admin {
        return Err(HttpResponse::Forbidden().json(ApiResponse::<()>::error_empty(
            ErrorCode::Forbidden,
            "Not the grader of this session",
        )));
    }

    Ok(session)
}

/// 读取会话所属作业的评分标准
pub(crate) async fn load_rubric(
    storage: &Arc<dyn Storage>,
    assignment_id: i64,
) -> Result<Rubric, HttpResponse> {
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| {
            HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            ))
        })?;

    Ok(assignment.rubric)
}

/// 重放次数用尽后的冲突响应
pub(crate) fn conflict_response() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::<()>::error_empty(
        ErrorCode::InvalidGradingState,
        "Concurrent modification, please retry",
    ))
}
