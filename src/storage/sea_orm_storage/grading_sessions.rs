use super::SeaOrmStorage;
use crate::entity::grading_sessions::{
    ActiveModel, Column, Entity as GradingSessions, split_criterion_map,
};
use crate::errors::{GraderError, Result};
use crate::models::{
    PaginationInfo,
    audit::entities::NewAuditEntry,
    grading::{
        entities::{GradingSession, GradingStatus},
        requests::{GradingSessionListQuery, NewGradingSession},
        responses::GradingSessionListResponse,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait as _};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::BTreeMap;

impl SeaOrmStorage {
    /// 开启草稿会话，插入与审计同事务
    pub async fn create_grading_session_impl(
        &self,
        new_session: NewGradingSession,
        audit: NewAuditEntry,
    ) -> Result<GradingSession> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            assignment_id: Set(new_session.assignment_id),
            grader_id: Set(new_session.grader_id),
            student_identifier_hash: Set(new_session.student_identifier_hash),
            student_code: Set(new_session.student_code),
            code_metrics_json: Set(None),
            ai_scores_json: Set("{}".to_string()),
            ai_feedback_json: Set("{}".to_string()),
            final_scores_json: Set("{}".to_string()),
            final_feedback_json: Set("{}".to_string()),
            status: Set(GradingStatus::Draft.to_string()),
            time_started: Set(chrono::Utc::now().timestamp()),
            edit_count: Set(0),
            research_consent: Set(new_session.research_consent),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("创建评分会话失败: {e}")))?;

        let audit = audit.resource(crate::storage::resource::GRADING_SESSION, inserted.id);
        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(inserted.into_grading_session())
    }

    /// 通过 ID 获取评分会话
    pub async fn get_grading_session_impl(&self, id: i64) -> Result<Option<GradingSession>> {
        let result = GradingSessions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询评分会话失败: {e}")))?;

        Ok(result.map(|m| m.into_grading_session()))
    }

    /// 分页列出评分会话
    pub async fn list_grading_sessions_with_pagination_impl(
        &self,
        query: GradingSessionListQuery,
    ) -> Result<GradingSessionListResponse> {
        let page = std::cmp::Ord::max(query.page.unwrap_or(1), 1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = GradingSessions::find();

        if let Some(grader_id) = query.grader_id {
            select = select.filter(Column::GraderId.eq(grader_id));
        }

        if let Some(assignment_id) = query.assignment_id {
            select = select.filter(Column::AssignmentId.eq(assignment_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_desc(Column::TimeStarted);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询会话总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询会话页数失败: {e}")))?;

        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询会话列表失败: {e}")))?;

        Ok(GradingSessionListResponse {
            items: models
                .into_iter()
                .map(|m| m.into_grading_session())
                .collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 带版本过滤的会话行 UPDATE
    ///
    /// 以 version 的期望值过滤并在同一条语句中 +1。status 和 edit_count
    /// 都可能在一次变更中不变（反馈追加、无实质修订），不能充当行版本。
    /// 并发写入者先提交后，本次 UPDATE 不命中任何行并返回 0。
    async fn update_session_row<C: ConnectionTrait>(
        conn: &C,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
    ) -> Result<u64> {
        let (ai_scores, ai_feedback) = split_criterion_map(&session.ai_result)?;
        let (final_scores, final_feedback) = split_criterion_map(&session.final_result)?;
        let code_metrics_json = match session.code_metrics {
            Some(ref value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        let result = GradingSessions::update_many()
            .col_expr(Column::CodeMetricsJson, Expr::value(code_metrics_json))
            .col_expr(Column::AiScoresJson, Expr::value(ai_scores))
            .col_expr(Column::AiFeedbackJson, Expr::value(ai_feedback))
            .col_expr(Column::FinalScoresJson, Expr::value(final_scores))
            .col_expr(Column::FinalFeedbackJson, Expr::value(final_feedback))
            .col_expr(Column::TotalScore, Expr::value(session.total_score))
            .col_expr(Column::Percentage, Expr::value(session.percentage))
            .col_expr(Column::Status, Expr::value(session.status.to_string()))
            .col_expr(
                Column::TimeCompleted,
                Expr::value(session.time_completed.map(|t| t.timestamp())),
            )
            .col_expr(
                Column::GradingDurationSeconds,
                Expr::value(session.grading_duration_seconds),
            )
            .col_expr(Column::EditCount, Expr::value(session.edit_count))
            .col_expr(
                Column::AiAcceptanceRate,
                Expr::value(session.ai_acceptance_rate),
            )
            .col_expr(Column::Version, Expr::value(expected_version + 1))
            .filter(Column::Id.eq(session.id))
            .filter(Column::Status.eq(expected_status.to_string()))
            .filter(Column::Version.eq(expected_version))
            .exec(conn)
            .await
            .map_err(|e| GraderError::database_operation(format!("更新评分会话失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 乐观持久化已在内存中完成变换的会话
    ///
    /// 行更新与审计条目在同一事务内提交；返回 false 表示并发冲突，
    /// 调用方重读重放。
    pub async fn persist_grading_session_impl(
        &self,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
        audit: NewAuditEntry,
    ) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let rows = Self::update_session_row(&txn, session, expected_status, expected_version)
            .await?;
        if rows == 0 {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        }

        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 持久化会话并在同一事务内把知识库条目的使用计数 +1
    ///
    /// 反馈插入要求两者同生共死：会话行没写进去就不该计使用，
    /// 条目已消失则整个插入失败回滚。
    pub async fn persist_grading_session_with_usage_impl(
        &self,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
        knowledge_entry_id: i64,
        audit: NewAuditEntry,
    ) -> Result<bool> {
        use crate::entity::knowledge_base::{
            Column as KnowledgeColumn, Entity as KnowledgeBase,
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let rows = Self::update_session_row(&txn, session, expected_status, expected_version)
            .await?;
        if rows == 0 {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        }

        let usage = KnowledgeBase::update_many()
            .col_expr(
                KnowledgeColumn::UsageCount,
                Expr::col(KnowledgeColumn::UsageCount).add(1),
            )
            .col_expr(
                KnowledgeColumn::LastUsed,
                Expr::value(Some(chrono::Utc::now().timestamp())),
            )
            .filter(KnowledgeColumn::Id.eq(knowledge_entry_id))
            .filter(KnowledgeColumn::IsActive.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("更新使用计数失败: {e}")))?;

        if usage.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Err(GraderError::not_found(format!(
                "知识库条目不存在或已停用: {knowledge_entry_id}"
            )));
        }

        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 聚合窗口内已完成的会话，flagged 不在其列
    pub async fn list_completed_in_window_impl(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<GradingSession>> {
        let models = GradingSessions::find()
            .filter(Column::Status.eq(GradingStatus::Completed.to_string()))
            .filter(Column::TimeCompleted.gte(period_start.timestamp()))
            .filter(Column::TimeCompleted.lt(period_end.timestamp()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询窗口内会话失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_grading_session()).collect())
    }

    /// 按状态统计窗口内的会话数
    ///
    /// 已完成的会话按 time_completed 归入窗口，其余按 time_started。
    pub async fn count_sessions_by_status_in_window_impl(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<BTreeMap<String, i64>> {
        let completed = GradingStatus::Completed.to_string();
        let condition = Condition::any()
            .add(
                Condition::all()
                    .add(Column::Status.eq(completed.clone()))
                    .add(Column::TimeCompleted.gte(period_start.timestamp()))
                    .add(Column::TimeCompleted.lt(period_end.timestamp())),
            )
            .add(
                Condition::all()
                    .add(Column::Status.ne(completed))
                    .add(Column::TimeStarted.gte(period_start.timestamp()))
                    .add(Column::TimeStarted.lt(period_end.timestamp())),
            );

        let statuses: Vec<String> = GradingSessions::find()
            .select_only()
            .column(Column::Status)
            .filter(condition)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("统计会话状态失败: {e}")))?;

        let mut counts = BTreeMap::new();
        for status in statuses {
            *counts.entry(status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// 研究导出：同意参与研究且已完成的会话
    pub async fn list_research_sessions_impl(
        &self,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        assignment_id: Option<i64>,
    ) -> Result<Vec<GradingSession>> {
        let mut select = GradingSessions::find()
            .filter(Column::ResearchConsent.eq(true))
            .filter(Column::Status.eq(GradingStatus::Completed.to_string()));

        if let Some(start) = period_start {
            select = select.filter(Column::TimeCompleted.gte(start.timestamp()));
        }

        if let Some(end) = period_end {
            select = select.filter(Column::TimeCompleted.lt(end.timestamp()));
        }

        if let Some(assignment_id) = assignment_id {
            select = select.filter(Column::AssignmentId.eq(assignment_id));
        }

        let models = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询研究会话失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_grading_session()).collect())
    }
}
