use super::SeaOrmStorage;
use crate::entity::prelude::UserFeedbackActiveModel;
use crate::entity::research_metrics::{ActiveModel, Column, Entity as ResearchMetrics};
use crate::errors::{GraderError, Result};
use crate::models::{
    audit::entities::NewAuditEntry,
    metrics::entities::{NewResearchMetric, ResearchMetric},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 幂等重算：删除窗口内旧行后整体写入新行，连同审计一并提交
    ///
    /// computed_at 固定取 period_end，同一窗口重复计算得到逐字节相同的行。
    pub async fn replace_metrics_for_period_impl(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        metrics: Vec<NewResearchMetric>,
        audit: NewAuditEntry,
    ) -> Result<Vec<ResearchMetric>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        ResearchMetrics::delete_many()
            .filter(Column::PeriodStart.eq(period_start.timestamp()))
            .filter(Column::PeriodEnd.eq(period_end.timestamp()))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("清理旧指标失败: {e}")))?;

        let mut stored = Vec::with_capacity(metrics.len());
        for metric in metrics {
            let context_json = match metric.context {
                Some(ref value) => Some(serde_json::to_string(value)?),
                None => None,
            };

            let model = ActiveModel {
                metric_type: Set(metric.metric_type.as_str().to_string()),
                metric_value: Set(metric.metric_value),
                context_json: Set(context_json),
                computed_at: Set(period_end.timestamp()),
                period_start: Set(period_start.timestamp()),
                period_end: Set(period_end.timestamp()),
                ..Default::default()
            };

            let inserted = model
                .insert(&txn)
                .await
                .map_err(|e| GraderError::database_operation(format!("写入指标失败: {e}")))?;
            stored.push(inserted.into_metric());
        }

        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(stored)
    }

    /// 查询窗口内已落库的指标
    pub async fn list_metrics_for_period_impl(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<ResearchMetric>> {
        let models = ResearchMetrics::find()
            .filter(Column::PeriodStart.eq(period_start.timestamp()))
            .filter(Column::PeriodEnd.eq(period_end.timestamp()))
            .order_by_asc(Column::MetricType)
            .all(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询指标失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_metric()).collect())
    }

    /// 记录用户反馈
    pub async fn create_user_feedback_impl(
        &self,
        user_id: i64,
        feedback_type: &str,
        payload: serde_json::Value,
    ) -> Result<i64> {
        let model = UserFeedbackActiveModel {
            user_id: Set(user_id),
            feedback_type: Set(feedback_type.to_string()),
            feedback_json: Set(serde_json::to_string(&payload)?),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("写入用户反馈失败: {e}")))?;

        Ok(inserted.id)
    }
}
