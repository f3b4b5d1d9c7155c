pub mod hash;
pub mod parameter_error_handler;
pub mod password;
pub mod sql;
pub mod token;
pub mod validate;

pub use hash::hash_student_identifier;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
pub use token::generate_session_token;
