pub mod assignments;

pub mod audit;

pub mod auth;

pub mod grading;

pub mod knowledge;

pub mod metrics;

pub mod users;

pub use assignments::configure_assignment_routes;
pub use audit::configure_audit_routes;
pub use auth::configure_auth_routes;
pub use grading::configure_grading_routes;
pub use knowledge::configure_knowledge_routes;
pub use metrics::configure_metrics_routes;
pub use users::configure_user_routes;
