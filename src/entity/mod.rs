//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod assignments;
pub mod audit_log;
pub mod grading_sessions;
pub mod knowledge_base;
pub mod research_metrics;
pub mod user_feedback;
pub mod user_sessions;
pub mod users;
