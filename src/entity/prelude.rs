//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::audit_log::{
    ActiveModel as AuditLogActiveModel, Entity as AuditLog, Model as AuditLogModel,
};
pub use super::grading_sessions::{
    ActiveModel as GradingSessionActiveModel, Entity as GradingSessions,
    Model as GradingSessionModel,
};
pub use super::knowledge_base::{
    ActiveModel as KnowledgeBaseActiveModel, Entity as KnowledgeBase, Model as KnowledgeBaseModel,
};
pub use super::research_metrics::{
    ActiveModel as ResearchMetricActiveModel, Entity as ResearchMetrics,
    Model as ResearchMetricModel,
};
pub use super::user_feedback::{
    ActiveModel as UserFeedbackActiveModel, Entity as UserFeedback, Model as UserFeedbackModel,
};
pub use super::user_sessions::{
    ActiveModel as UserSessionActiveModel, Entity as UserSessions, Model as UserSessionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
