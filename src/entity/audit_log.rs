//! 审计日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub details_json: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_entry(self) -> crate::models::audit::entities::AuditLogEntry {
        use chrono::{DateTime, Utc};

        crate::models::audit::entities::AuditLogEntry {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            action: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            details: self
                .details_json
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            timestamp: DateTime::<Utc>::from_timestamp(self.timestamp, 0).unwrap_or_default(),
        }
    }
}
