use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;

// 审计日志查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct AuditLogListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub user_id: Option<i64>,
    pub action: Option<String>,
}

// 审计日志查询参数（用于存储层）
#[derive(Debug, Clone)]
pub struct AuditLogQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub user_id: Option<i64>,
    pub action: Option<String>,
}

impl From<AuditLogListParams> for AuditLogQuery {
    fn from(params: AuditLogListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            user_id: params.user_id,
            action: params.action,
        }
    }
}
