pub mod create;
pub mod insert;
pub mod rate;
pub mod search;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct KnowledgeService {
    storage: Option<Arc<dyn Storage>>,
}

impl KnowledgeService {
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

    // 创建知识库条目
    pub async fn create(
        &self,
        req: crate::models::knowledge::requests::CreateKnowledgeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create(self, req, request).await
    }

    // 检索知识库
    pub async fn search(
        &self,
        params: crate::models::knowledge::requests::KnowledgeSearchParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        search::handle_search(self, params, request).await
    }

    // 给条目打分
    pub async fn rate(
        &self,
        id: i64,
        req: crate::models::knowledge::requests::RateKnowledgeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        rate::handle_rate(self, id, req, request).await
    }

    // 把条目内容插入评分会话的反馈里
    pub async fn insert_into_feedback(
        &self,
        id: i64,
        req: crate::models::knowledge::requests::InsertFeedbackRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        insert::handle_insert(self, id, req, request).await
    }
}
