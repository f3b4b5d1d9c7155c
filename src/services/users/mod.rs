pub mod deactivate;
pub mod feedback;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
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

    // 列出用户（管理员）
    pub async fn list(
        &self,
        params: crate::models::users::requests::UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::handle_list(self, params, request).await
    }

    // 查看单个用户（管理员）
    pub async fn get(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::handle_get(self, id, request).await
    }

    // 软停用用户（管理员）
    pub async fn deactivate(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        deactivate::handle_deactivate(self, id, request).await
    }

    // 提交系统反馈
    pub async fn submit_feedback(
        &self,
        payload: feedback::SubmitFeedbackRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        feedback::handle_submit_feedback(self, payload, request).await
    }
}
