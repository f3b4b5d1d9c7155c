//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod audit_log;
mod grading_sessions;
mod knowledge_base;
mod research_metrics;
mod sessions;
mod users;

use crate::config::AppConfig;
use crate::errors::{GraderError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::new_with_url(&config.database.url, config.database.pool_size).await
    }

    /// 按指定 URL 建立存储（测试用内存库走这里，池大小须为 1）
    pub async fn new_with_url(url: &str, pool_size: u32) -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, pool_size, config.database.timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, config.database.timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| GraderError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GraderError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GraderError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| GraderError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GraderError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn deactivate_user(&self, id: i64, audit: NewAuditEntry) -> Result<bool> {
        self.deactivate_user_impl(id, audit).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn consume_quota(
        &self,
        user_id: i64,
        today: NaiveDate,
        amount: i64,
        daily_limit: i64,
    ) -> Result<i64> {
        self.consume_quota_impl(user_id, today, amount, daily_limit)
            .await
    }

    // 会话模块
    async fn create_session(&self, session: Session) -> Result<Session> {
        self.create_session_impl(session).await
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.get_session_impl(token).await
    }

    async fn revoke_session(&self, token: &str, audit: NewAuditEntry) -> Result<bool> {
        self.revoke_session_impl(token, audit).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
        audit: NewAuditEntry,
    ) -> Result<Assignment> {
        self.create_assignment_impl(created_by, req, audit).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn deactivate_assignment(&self, id: i64, audit: NewAuditEntry) -> Result<bool> {
        self.deactivate_assignment_impl(id, audit).await
    }

    // 评分会话模块
    async fn create_grading_session(
        &self,
        new_session: NewGradingSession,
        audit: NewAuditEntry,
    ) -> Result<GradingSession> {
        self.create_grading_session_impl(new_session, audit).await
    }

    async fn get_grading_session(&self, id: i64) -> Result<Option<GradingSession>> {
        self.get_grading_session_impl(id).await
    }

    async fn list_grading_sessions_with_pagination(
        &self,
        query: GradingSessionListQuery,
    ) -> Result<GradingSessionListResponse> {
        self.list_grading_sessions_with_pagination_impl(query).await
    }

    async fn persist_grading_session(
        &self,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
        audit: NewAuditEntry,
    ) -> Result<bool> {
        self.persist_grading_session_impl(session, expected_status, expected_version, audit)
            .await
    }

    async fn persist_grading_session_with_usage(
        &self,
        session: &GradingSession,
        expected_status: GradingStatus,
        expected_version: i64,
        knowledge_entry_id: i64,
        audit: NewAuditEntry,
    ) -> Result<bool> {
        self.persist_grading_session_with_usage_impl(
            session,
            expected_status,
            expected_version,
            knowledge_entry_id,
            audit,
        )
        .await
    }

    async fn list_completed_in_window(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<GradingSession>> {
        self.list_completed_in_window_impl(period_start, period_end)
            .await
    }

    async fn count_sessions_by_status_in_window(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<std::collections::BTreeMap<String, i64>> {
        self.count_sessions_by_status_in_window_impl(period_start, period_end)
            .await
    }

    async fn list_research_sessions(
        &self,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        assignment_id: Option<i64>,
    ) -> Result<Vec<GradingSession>> {
        self.list_research_sessions_impl(period_start, period_end, assignment_id)
            .await
    }

    // 知识库模块
    async fn create_knowledge_entry(
        &self,
        created_by: i64,
        req: CreateKnowledgeRequest,
        audit: NewAuditEntry,
    ) -> Result<KnowledgeBaseEntry> {
        self.create_knowledge_entry_impl(created_by, req, audit)
            .await
    }

    async fn get_knowledge_entry(&self, id: i64) -> Result<Option<KnowledgeBaseEntry>> {
        self.get_knowledge_entry_impl(id).await
    }

    async fn search_knowledge(
        &self,
        query: KnowledgeSearchQuery,
    ) -> Result<KnowledgeListResponse> {
        self.search_knowledge_impl(query).await
    }

    async fn rate_knowledge_entry(
        &self,
        id: i64,
        rating: f64,
        audit: NewAuditEntry,
    ) -> Result<Option<KnowledgeBaseEntry>> {
        self.rate_knowledge_entry_impl(id, rating, audit).await
    }

    // 审计模块
    async fn record_audit(&self, entry: NewAuditEntry) -> Result<()> {
        self.record_audit_impl(entry).await
    }

    async fn list_audit_log_with_pagination(
        &self,
        query: AuditLogQuery,
    ) -> Result<AuditLogListResponse> {
        self.list_audit_log_with_pagination_impl(query).await
    }

    // 研究指标模块
    async fn replace_metrics_for_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        metrics: Vec<NewResearchMetric>,
        audit: NewAuditEntry,
    ) -> Result<Vec<ResearchMetric>> {
        self.replace_metrics_for_period_impl(period_start, period_end, metrics, audit)
            .await
    }

    async fn list_metrics_for_period(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<ResearchMetric>> {
        self.list_metrics_for_period_impl(period_start, period_end)
            .await
    }

    // 用户反馈模块
    async fn create_user_feedback(
        &self,
        user_id: i64,
        feedback_type: &str,
        payload: serde_json::Value,
    ) -> Result<i64> {
        self.create_user_feedback_impl(user_id, feedback_type, payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::entities::{AuditAction, AuditContext};
    use crate::models::auth::entities::SessionState;
    use crate::models::users::entities::UserRole;
    use crate::utils::generate_session_token;
    use chrono::Duration;

    // 内存库必须单连接，否则每个池连接各自拿到一个空库
    async fn memory_storage() -> SeaOrmStorage {
        SeaOrmStorage::new_with_url(":memory:", 1)
            .await
            .expect("Failed to create in-memory storage")
    }

    fn audit(action: AuditAction) -> NewAuditEntry {
        NewAuditEntry::new(AuditContext::default(), action)
    }

    async fn seed_user(storage: &SeaOrmStorage, username: &str) -> User {
        storage
            .create_user(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "argon2-hash-placeholder".to_string(),
                role: UserRole::Ta,
                department: "Computer Science".to_string(),
                courses: vec![],
            })
            .await
            .expect("Failed to create user")
    }

    fn rubric_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Test Rubric",
            "criteria": [
                { "id": "correctness", "title": "Correctness" },
                { "id": "style", "title": "Style" }
            ]
        })
    }

    async fn seed_assignment(storage: &SeaOrmStorage, owner: i64) -> Assignment {
        storage
            .create_assignment(
                owner,
                CreateAssignmentRequest {
                    name: "Lab 1".to_string(),
                    course_code: "CS101".to_string(),
                    prompt: "Implement a stack".to_string(),
                    rubric: rubric_json(),
                    due_date: None,
                    assignment_type: None,
                    learning_objectives: vec![],
                },
                audit(AuditAction::AssignmentCreated),
            )
            .await
            .expect("Failed to create assignment")
    }

    async fn seed_grading_session(
        storage: &SeaOrmStorage,
        assignment_id: i64,
        grader_id: i64,
    ) -> GradingSession {
        storage
            .create_grading_session(
                NewGradingSession {
                    assignment_id,
                    grader_id,
                    student_identifier_hash: None,
                    student_code: "fn main() {}".to_string(),
                    research_consent: true,
                },
                audit(AuditAction::GradingOpened),
            )
            .await
            .expect("Failed to create grading session")
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let storage = memory_storage().await;
        seed_user(&storage, "alice").await;

        let err = storage
            .create_user(CreateUserRequest {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password: "hash".to_string(),
                role: UserRole::Ta,
                department: "Computer Science".to_string(),
                courses: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GraderError::DuplicateIdentity(_)));
    }

    #[tokio::test]
    async fn test_quota_increments_then_blocks_at_limit() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "bob").await;
        let today = chrono::Utc::now().date_naive();

        assert_eq!(
            storage.consume_quota(user.id, today, 1, 2).await.unwrap(),
            1
        );
        assert_eq!(
            storage.consume_quota(user.id, today, 1, 2).await.unwrap(),
            2
        );

        let err = storage
            .consume_quota(user.id, today, 1, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, GraderError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_quota_amount_counted_against_limit() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "ivan").await;
        let today = chrono::Utc::now().date_naive();

        // 一次扣 2，上限 3：第二次再扣 2 会越界，计数保持不变
        assert_eq!(
            storage.consume_quota(user.id, today, 2, 3).await.unwrap(),
            2
        );
        let err = storage
            .consume_quota(user.id, today, 2, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, GraderError::QuotaExceeded(_)));
        assert_eq!(
            storage.consume_quota(user.id, today, 1, 3).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_quota_rolls_over_on_new_day() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "carol").await;
        let today = chrono::Utc::now().date_naive();
        let tomorrow = today + Duration::days(1);

        assert_eq!(
            storage.consume_quota(user.id, today, 1, 1).await.unwrap(),
            1
        );
        assert!(storage.consume_quota(user.id, today, 1, 1).await.is_err());

        // 新的一天：计数清零后重新累计
        assert_eq!(
            storage
                .consume_quota(user.id, tomorrow, 1, 1)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_session_revocation_is_idempotent() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "dave").await;
        let now = chrono::Utc::now();
        let token = generate_session_token();

        storage
            .create_session(Session {
                id: token.clone(),
                user_id: user.id,
                created_at: now,
                expires_at: now + Duration::hours(8),
                ip_address: None,
                user_agent: None,
                is_active: true,
            })
            .await
            .unwrap();

        assert!(
            storage
                .revoke_session(&token, audit(AuditAction::Logout))
                .await
                .unwrap()
        );
        // 重复吊销不报错，也不再写审计
        assert!(
            !storage
                .revoke_session(&token, audit(AuditAction::Logout))
                .await
                .unwrap()
        );

        let session = storage.get_session(&token).await.unwrap().unwrap();
        assert_eq!(session.state_at(chrono::Utc::now()), SessionState::Revoked);
    }

    #[tokio::test]
    async fn test_persist_rejects_stale_version() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "erin").await;
        let assignment = seed_assignment(&storage, user.id).await;
        let mut session = seed_grading_session(&storage, assignment.id, user.id).await;

        session.edit_count += 1;

        // 期望版本与行内不符时写入被拒绝
        let stale = storage
            .persist_grading_session(
                &session,
                GradingStatus::Draft,
                99,
                audit(AuditAction::CriterionRevised),
            )
            .await
            .unwrap();
        assert!(!stale);

        let fresh = storage
            .persist_grading_session(
                &session,
                GradingStatus::Draft,
                0,
                audit(AuditAction::CriterionRevised),
            )
            .await
            .unwrap();
        assert!(fresh);

        let reloaded = storage
            .get_grading_session(session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.edit_count, 1);
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn test_stale_snapshot_cannot_overwrite_feedback_only_change() {
        use crate::models::grading::entities::CriterionResult;

        let storage = memory_storage().await;
        let user = seed_user(&storage, "judy").await;
        let assignment = seed_assignment(&storage, user.id).await;
        let session = seed_grading_session(&storage, assignment.id, user.id).await;

        // 两个写入者各持同一行的快照
        let mut writer_a = session.clone();
        let mut writer_b = session;

        // A 只追加反馈：status 与 edit_count 都不变，只有 version 能看见这次写入
        writer_a.final_result.insert(
            "correctness".to_string(),
            CriterionResult {
                score: None,
                feedback: Some("Check loop bounds".to_string()),
            },
        );
        assert!(
            storage
                .persist_grading_session(
                    &writer_a,
                    GradingStatus::Draft,
                    writer_a.version,
                    audit(AuditAction::FeedbackInserted),
                )
                .await
                .unwrap()
        );

        // B 从过期快照做实质修订，必须被拒绝而不是覆盖 A 的提交
        writer_b.final_result.insert(
            "style".to_string(),
            CriterionResult {
                score: Some(2),
                feedback: None,
            },
        );
        writer_b.edit_count += 1;
        assert!(
            !storage
                .persist_grading_session(
                    &writer_b,
                    GradingStatus::Draft,
                    writer_b.version,
                    audit(AuditAction::CriterionRevised),
                )
                .await
                .unwrap()
        );

        let reloaded = storage
            .get_grading_session(writer_a.id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.final_result.contains_key("correctness"));
        assert!(!reloaded.final_result.contains_key("style"));
        assert_eq!(reloaded.version, 1);
    }

    #[tokio::test]
    async fn test_mutation_and_audit_commit_together() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "frank").await;
        seed_assignment(&storage, user.id).await;

        let log = storage
            .list_audit_log_with_pagination(AuditLogQuery {
                page: Some(1),
                size: Some(10),
                user_id: None,
                action: Some(AuditAction::AssignmentCreated.as_str().to_string()),
            })
            .await
            .unwrap();
        assert_eq!(log.items.len(), 1);
        assert_eq!(log.items[0].action, AuditAction::AssignmentCreated.as_str());
    }

    #[tokio::test]
    async fn test_rating_blend_through_storage() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "grace").await;
        let entry = storage
            .create_knowledge_entry(
                user.id,
                CreateKnowledgeRequest {
                    category: crate::models::knowledge::entities::KnowledgeCategory::CommonIssue,
                    topic: "off-by-one".to_string(),
                    content: "Check loop bounds".to_string(),
                },
                audit(AuditAction::KnowledgeCreated),
            )
            .await
            .unwrap();

        let first = storage
            .rate_knowledge_entry(entry.id, 4.0, audit(AuditAction::KnowledgeRated))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.effectiveness_rating, Some(4.0));

        let second = storage
            .rate_knowledge_entry(entry.id, 2.0, audit(AuditAction::KnowledgeRated))
            .await
            .unwrap()
            .unwrap();
        let expected = 4.0 * 0.3 + 2.0 * 0.7;
        assert!((second.effectiveness_rating.unwrap() - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_feedback_insert_bumps_usage_in_same_transaction() {
        use crate::models::grading::entities::CriterionResult;

        let storage = memory_storage().await;
        let user = seed_user(&storage, "kevin").await;
        let assignment = seed_assignment(&storage, user.id).await;
        let mut session = seed_grading_session(&storage, assignment.id, user.id).await;
        let entry = storage
            .create_knowledge_entry(
                user.id,
                CreateKnowledgeRequest {
                    category: crate::models::knowledge::entities::KnowledgeCategory::CommonIssue,
                    topic: "naming".to_string(),
                    content: "Prefer descriptive names".to_string(),
                },
                audit(AuditAction::KnowledgeCreated),
            )
            .await
            .unwrap();

        session.final_result.insert(
            "style".to_string(),
            CriterionResult {
                score: None,
                feedback: Some(entry.content.clone()),
            },
        );
        assert!(
            storage
                .persist_grading_session_with_usage(
                    &session,
                    GradingStatus::Draft,
                    0,
                    entry.id,
                    audit(AuditAction::FeedbackInserted),
                )
                .await
                .unwrap()
        );

        let touched = storage.get_knowledge_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(touched.usage_count, 1);
        assert!(touched.last_used.is_some());

        // 会话写入被版本冲突拒绝时，使用计数不得增加
        assert!(
            !storage
                .persist_grading_session_with_usage(
                    &session,
                    GradingStatus::Draft,
                    0,
                    entry.id,
                    audit(AuditAction::FeedbackInserted),
                )
                .await
                .unwrap()
        );
        let untouched = storage.get_knowledge_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(untouched.usage_count, 1);
    }

    #[tokio::test]
    async fn test_status_counts_cover_all_states_in_window() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "laura").await;
        let assignment = seed_assignment(&storage, user.id).await;

        seed_grading_session(&storage, assignment.id, user.id).await;
        let mut completed = seed_grading_session(&storage, assignment.id, user.id).await;
        completed.status = GradingStatus::Completed;
        completed.time_completed = Some(chrono::Utc::now());
        storage
            .persist_grading_session(
                &completed,
                GradingStatus::Draft,
                0,
                audit(AuditAction::GradingCompleted),
            )
            .await
            .unwrap();

        let start = chrono::Utc::now() - Duration::hours(1);
        let end = chrono::Utc::now() + Duration::hours(1);
        let counts = storage
            .count_sessions_by_status_in_window(start, end)
            .await
            .unwrap();

        assert_eq!(counts.get("draft"), Some(&1));
        assert_eq!(counts.get("completed"), Some(&1));
    }

    #[tokio::test]
    async fn test_replace_metrics_is_idempotent() {
        let storage = memory_storage().await;
        let start = chrono::Utc::now() - Duration::days(7);
        let end = chrono::Utc::now();

        let metrics = vec![NewResearchMetric {
            metric_type: crate::models::metrics::entities::MetricType::SessionsCompleted,
            metric_value: 0.0,
            context: None,
        }];

        storage
            .replace_metrics_for_period(
                start,
                end,
                metrics.clone(),
                audit(AuditAction::MetricsComputed),
            )
            .await
            .unwrap();
        storage
            .replace_metrics_for_period(start, end, metrics, audit(AuditAction::MetricsComputed))
            .await
            .unwrap();

        // 重算覆盖而非追加
        let stored = storage.list_metrics_for_period(start, end).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_research_export_excludes_nonconsenting() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "heidi").await;
        let assignment = seed_assignment(&storage, user.id).await;

        let mut consenting = seed_grading_session(&storage, assignment.id, user.id).await;
        let nonconsenting = storage
            .create_grading_session(
                NewGradingSession {
                    assignment_id: assignment.id,
                    grader_id: user.id,
                    student_identifier_hash: None,
                    student_code: "pass".to_string(),
                    research_consent: false,
                },
                audit(AuditAction::GradingOpened),
            )
            .await
            .unwrap();

        // 只有已完成且同意参与研究的会话进入导出
        consenting.status = GradingStatus::Completed;
        consenting.time_completed = Some(chrono::Utc::now());
        storage
            .persist_grading_session(
                &consenting,
                GradingStatus::Draft,
                0,
                audit(AuditAction::GradingCompleted),
            )
            .await
            .unwrap();

        let exported = storage
            .list_research_sessions(None, None, Some(assignment.id))
            .await
            .unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].id, consenting.id);
        assert_ne!(exported[0].id, nonconsenting.id);
    }
}
