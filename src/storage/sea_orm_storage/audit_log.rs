use super::SeaOrmStorage;
use crate::entity::audit_log::{ActiveModel, Column, Entity as AuditLog};
use crate::errors::{GraderError, Result};
use crate::models::{
    PaginationInfo,
    audit::{entities::NewAuditEntry, requests::AuditLogQuery, responses::AuditLogListResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

/// 在任意连接（含事务）上追加一条审计记录
///
/// 业务行更新与其审计条目共用一个事务时走这里，保证两者同生共死。
pub(crate) async fn insert_audit<C: ConnectionTrait>(conn: &C, entry: NewAuditEntry) -> Result<()> {
    let details_json = match entry.details {
        Some(ref value) => Some(serde_json::to_string(value)?),
        None => None,
    };

    let model = ActiveModel {
        user_id: Set(entry.context.user_id),
        session_id: Set(entry.context.session_id),
        action: Set(entry.action.as_str().to_string()),
        resource_type: Set(entry.resource_type),
        resource_id: Set(entry.resource_id),
        details_json: Set(details_json),
        ip_address: Set(entry.context.ip_address),
        user_agent: Set(entry.context.user_agent),
        timestamp: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| GraderError::database_operation(format!("写入审计日志失败: {e}")))?;

    Ok(())
}

impl SeaOrmStorage {
    /// 独立追加审计条目（无业务事务伴随，如登录失败）
    pub async fn record_audit_impl(&self, entry: NewAuditEntry) -> Result<()> {
        insert_audit(&self.db, entry).await
    }

    /// 分页查询审计日志，时间倒序
    pub async fn list_audit_log_with_pagination_impl(
        &self,
        query: AuditLogQuery,
    ) -> Result<AuditLogListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = AuditLog::find();

        if let Some(user_id) = query.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }

        if let Some(ref action) = query.action {
            select = select.filter(Column::Action.eq(action.as_str()));
        }

        select = select.order_by_desc(Column::Timestamp);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询审计总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询审计页数失败: {e}")))?;

        let entries = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询审计日志失败: {e}")))?;

        Ok(AuditLogListResponse {
            items: entries.into_iter().map(|m| m.into_entry()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }
}
