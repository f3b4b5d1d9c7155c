use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    assignments::{
        entities::Assignment,
        requests::{AssignmentListQuery, CreateAssignmentRequest},
        responses::AssignmentListResponse,
    },
    audit::{
        entities::NewAuditEntry, requests::AuditLogQuery, responses::AuditLogListResponse,
    },
    auth::entities::Session,
    grading::{
        entities::{GradingSession, GradingStatus},
        requests::{GradingSessionListQuery, NewGradingSession},
        responses::GradingSessionListResponse,
    },
    knowledge::{
        entities::KnowledgeBaseEntry,
        requests::{CreateKnowledgeRequest, KnowledgeSearchQuery},
        responses::KnowledgeListResponse,
    },
    metrics::entities::{NewResearchMetric, ResearchMetric},
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段须已是 Argon2 哈希）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 软停用用户，从不删除
    async fn deactivate_user(&self, id: i64, audit: NewAuditEntry) -> Result<bool>;
    // 统计用户数量（用于首启管理员播种）
    async fn count_users(&self) -> Result<u64>;
    // 配额消耗：惰性按日清零后按 amount 原子自增并检查上限
    async fn consume_quota(
        &self,
        user_id: i64,
        today: NaiveDate,
        amount: i64,
        daily_limit: i64,
    ) -> Result<i64>;

    /// 会话管理方法
    // 写入新会话（令牌由调用方生成）
    async fn create_session(&self, session: Session) -> Result<Session>;
    // 按令牌取会话
    async fn get_session(&self, token: &str) -> Result<Option<Session>>;
    // 吊销会话，幂等
    async fn revoke_session(&self, token: &str, audit: NewAuditEntry) -> Result<bool>;

    /// 作业管理方法
    // 创建作业（评分标准入库前已规范化）
    async fn create_assignment(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
        audit: NewAuditEntry,
    ) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 列出作业（始终限定所有者）
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    // 停用作业
    async fn deactivate_assignment(&self, id: i64, audit: NewAuditEntry) -> Result<bool>;

    /// 评分会话方法
    // 开启草稿会话
    async fn create_grading_session(
        &self,
        new_session: NewGradingSession,
        audit: NewAuditEntry,
    ) -> Result<GradingSession>;
    // 通过ID获取评分会话
    async fn get_grading_session(&self, id: i64) -> Result<Option<GradingSession>>;
    // 列出评分会话
    async fn list_grading_sessions_with_pagination(
        &self,
        query: GradingSessionListQuery,
    ) -> Result<GradingSessionListResponse>;
    // 乐观持久化：仅当行内 status/version 仍等于期望值时写入并把 version +1，
    // 行更新与审计条目在同一事务内提交；返回 false 表示并发冲突
    async fn persist_grading_session(
        &self,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
        audit: NewAuditEntry,
    ) -> Result<bool>;
    // 同上，并在同一事务内把知识库条目使用计数 +1、刷新 last_used
    async fn persist_grading_session_with_usage(
        &self,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
        knowledge_entry_id: i64,
        audit: NewAuditEntry,
    ) -> Result<bool>;
    // 聚合窗口内已完成的会话（flagged 不参与）
    async fn list_completed_in_window(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<GradingSession>>;
    // 按状态统计窗口内的会话数（completed 按 time_completed 归窗，其余按 time_started）
    async fn count_sessions_by_status_in_window(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<BTreeMap<String, i64>>;
    // 研究导出：仅同意参与研究且已完成的会话
    async fn list_research_sessions(
        &self,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        assignment_id: Option<i64>,
    ) -> Result<Vec<GradingSession>>;

    /// 知识库方法
    // 创建条目
    async fn create_knowledge_entry(
        &self,
        created_by: i64,
        req: CreateKnowledgeRequest,
        audit: NewAuditEntry,
    ) -> Result<KnowledgeBaseEntry>;
    // 通过ID获取条目
    async fn get_knowledge_entry(&self, id: i64) -> Result<Option<KnowledgeBaseEntry>>;
    // 按类别/主题检索，按使用次数与效果排序
    async fn search_knowledge(&self, query: KnowledgeSearchQuery)
    -> Result<KnowledgeListResponse>;
    // 评分：加权滑动均值 old*0.3 + new*0.7
    async fn rate_knowledge_entry(
        &self,
        id: i64,
        rating: f64,
        audit: NewAuditEntry,
    ) -> Result<Option<KnowledgeBaseEntry>>;
    /// 审计方法
    // 追加审计条目（独立于任何业务事务，如登录失败）
    async fn record_audit(&self, entry: NewAuditEntry) -> Result<()>;
    // 查询审计日志
    async fn list_audit_log_with_pagination(
        &self,
        query: AuditLogQuery,
    ) -> Result<AuditLogListResponse>;

    /// 研究指标方法
    // 以重算结果整体替换窗口内的指标行（幂等重算）
    async fn replace_metrics_for_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        metrics: Vec<NewResearchMetric>,
        audit: NewAuditEntry,
    ) -> Result<Vec<ResearchMetric>>;
    // 查询窗口内已落库的指标
    async fn list_metrics_for_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<ResearchMetric>>;

    /// 用户反馈方法
    // 记录用户对系统的反馈
    async fn create_user_feedback(
        &self,
        user_id: i64,
        feedback_type: &str,
        payload: serde_json::Value,
    ) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

/// 供审计条目复用的资源类型常量
pub mod resource {
    pub const USER: &str = "user";
    pub const SESSION: &str = "session";
    pub const ASSIGNMENT: &str = "assignment";
    pub const GRADING_SESSION: &str = "grading_session";
    pub const KNOWLEDGE_ENTRY: &str = "knowledge_entry";
    pub const RESEARCH_METRICS: &str = "research_metrics";
}
