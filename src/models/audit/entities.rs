//! 审计日志模型
//!
//! 审计日志只追加：核心从不修改或删除已写入的条目。
//! 每个已提交的状态变更都必须带有对应的审计记录（与变更同事务提交）。

use serde::{Deserialize, Serialize};

// 审计动作标签
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserCreated,
    UserDeactivated,
    LoginSuccess,
    LoginFailed,
    Logout,
    SessionRejected,
    QuotaConsumed,
    AssignmentCreated,
    AssignmentDeactivated,
    GradingOpened,
    AutomatedResultApplied,
    CriterionRevised,
    GradingCompleted,
    GradingFlagged,
    GradingReopened,
    FeedbackInserted,
    KnowledgeCreated,
    KnowledgeRated,
    MetricsComputed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserCreated => "user_created",
            AuditAction::UserDeactivated => "user_deactivated",
            AuditAction::LoginSuccess => "login_success",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::Logout => "logout",
            AuditAction::SessionRejected => "session_rejected",
            AuditAction::QuotaConsumed => "quota_consumed",
            AuditAction::AssignmentCreated => "assignment_created",
            AuditAction::AssignmentDeactivated => "assignment_deactivated",
            AuditAction::GradingOpened => "grading_opened",
            AuditAction::AutomatedResultApplied => "automated_result_applied",
            AuditAction::CriterionRevised => "criterion_revised",
            AuditAction::GradingCompleted => "grading_completed",
            AuditAction::GradingFlagged => "grading_flagged",
            AuditAction::GradingReopened => "grading_reopened",
            AuditAction::FeedbackInserted => "feedback_inserted",
            AuditAction::KnowledgeCreated => "knowledge_created",
            AuditAction::KnowledgeRated => "knowledge_rated",
            AuditAction::MetricsComputed => "metrics_computed",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 已落库的审计条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 请求上下文：谁、通过哪个会话、从哪里
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 待写入的审计条目
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub context: AuditContext,
    pub action: AuditAction,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(context: AuditContext, action: AuditAction) -> Self {
        Self {
            context,
            action,
            resource_type: None,
            resource_id: None,
            details: None,
        }
    }

    pub fn resource(mut self, resource_type: &str, resource_id: impl ToString) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self.resource_id = Some(resource_id.to_string());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
