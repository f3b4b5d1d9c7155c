//! 研究指标实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "research_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub metric_type: String,
    pub metric_value: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub context_json: Option<String>,
    pub computed_at: i64,
    pub period_start: i64,
    pub period_end: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_metric(self) -> crate::models::metrics::entities::ResearchMetric {
        use chrono::{DateTime, Utc};

        crate::models::metrics::entities::ResearchMetric {
            id: self.id,
            metric_type: self.metric_type,
            metric_value: self.metric_value,
            context: self
                .context_json
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            computed_at: DateTime::<Utc>::from_timestamp(self.computed_at, 0).unwrap_or_default(),
            period_start: DateTime::<Utc>::from_timestamp(self.period_start, 0)
                .unwrap_or_default(),
            period_end: DateTime::<Utc>::from_timestamp(self.period_end, 0).unwrap_or_default(),
        }
    }
}
