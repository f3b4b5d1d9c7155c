use super::SeaOrmStorage;
use crate::entity::user_sessions::{ActiveModel, Column, Entity as UserSessions};
use crate::errors::{GraderError, Result};
use crate::models::{audit::entities::NewAuditEntry, auth::entities::Session};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入新会话
    pub async fn create_session_impl(&self, session: Session) -> Result<Session> {
        let model = ActiveModel {
            id: Set(session.id.clone()),
            user_id: Set(session.user_id),
            created_at: Set(session.created_at.timestamp()),
            expires_at: Set(session.expires_at.timestamp()),
            ip_address: Set(session.ip_address.clone()),
            user_agent: Set(session.user_agent.clone()),
            is_active: Set(session.is_active),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("创建会话失败: {e}")))?;

        Ok(session)
    }

    /// 按令牌取会话
    pub async fn get_session_impl(&self, token: &str) -> Result<Option<Session>> {
        let result = UserSessions::find_by_id(token)
            .one(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询会话失败: {e}")))?;

        Ok(result.map(|m| m.into_session()))
    }

    /// 吊销会话，幂等；吊销动作与审计同事务
    pub async fn revoke_session_impl(&self, token: &str, audit: NewAuditEntry) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let result = UserSessions::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .filter(Column::Id.eq(token))
            .filter(Column::IsActive.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("吊销会话失败: {e}")))?;

        // 已吊销过的会话不再追加审计，保持幂等语义
        if result.rows_affected > 0 {
            super::audit_log::insert_audit(&txn, audit).await?;
        }

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
