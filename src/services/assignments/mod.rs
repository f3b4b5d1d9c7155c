pub mod create;
pub mod deactivate;
pub mod get;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
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

    // 创建作业
    pub async fn create(
        &self,
        req: crate::models::assignments::requests::CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create(self, req, request).await
    }

    // 列出自己的作业
    pub async fn list(
        &self,
        params: crate::models::assignments::requests::AssignmentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::handle_list(self, params, request).await
    }

    // 查看单个作业
    pub async fn get(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::handle_get(self, id, request).await
    }

    // 停用作业
    pub async fn deactivate(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        deactivate::handle_deactivate(self, id, request).await
    }
}
