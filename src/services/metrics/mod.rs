pub mod agreement;
pub mod compute;
pub mod export;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct MetricsService {
    storage: Option<Arc<dyn Storage>>,
}

impl MetricsService {
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

    // 重算窗口内的聚合指标
    pub async fn compute(
        &self,
        req: crate::models::metrics::requests::ComputeMetricsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        compute::handle_compute(self, req, request).await
    }

    // 查询窗口内已落库的指标
    pub async fn list(
        &self,
        params: crate::models::metrics::requests::ComputeMetricsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        compute::handle_list(self, params, request).await
    }

    // 金标准对照
    pub async fn gold_agreement(
        &self,
        req: crate::models::metrics::requests::GoldScoreAgreementRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        agreement::handle_agreement(self, req, request).await
    }

    // 研究数据导出
    pub async fn export(
        &self,
        params: crate::models::metrics::requests::ResearchExportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        export::handle_export(self, params, request).await
    }
}
