//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_grader_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum GraderError {
            $($variant(String),)*
        }

        impl GraderError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GraderError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GraderError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GraderError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GraderError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GraderError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_grader_errors! {
    // 身份模块
    DuplicateIdentity("E001", "Duplicate Identity"),
    InvalidCredentials("E002", "Invalid Credentials"),
    QuotaExceeded("E003", "API Quota Exceeded"),
    // 会话模块
    SessionExpired("E004", "Session Expired"),
    SessionRevoked("E005", "Session Revoked"),
    // 评分生命周期
    InvalidState("E006", "Invalid Grading State"),
    IncompleteRubric("E007", "Incomplete Rubric"),
    AssignmentInactive("E008", "Assignment Inactive"),
    // 知识库
    InvalidRating("E009", "Invalid Rating"),
    // 基础设施
    StorageUnavailable("E010", "Storage Unavailable"),
    DatabaseConfig("E011", "Database Configuration Error"),
    DatabaseConnection("E012", "Database Connection Error"),
    DatabaseOperation("E013", "Database Operation Error"),
    Validation("E014", "Validation Error"),
    NotFound("E015", "Resource Not Found"),
    Serialization("E016", "Serialization Error"),
    DateParse("E017", "Date Parse Error"),
}

impl GraderError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GraderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GraderError {}

// 将存储边界的约束冲突翻译为领域错误，不向调用方泄漏原始数据库错误
impl From<sea_orm::DbErr> for GraderError {
    fn from(err: sea_orm::DbErr) -> Self {
        let text = err.to_string();
        if text.contains("UNIQUE constraint failed")
            || text.contains("duplicate key value")
            || text.contains("Duplicate entry")
        {
            GraderError::DuplicateIdentity(text)
        } else {
            GraderError::DatabaseOperation(text)
        }
    }
}

impl From<std::io::Error> for GraderError {
    fn from(err: std::io::Error) -> Self {
        GraderError::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for GraderError {
    fn from(err: serde_json::Error) -> Self {
        GraderError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GraderError {
    fn from(err: chrono::ParseError) -> Self {
        GraderError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GraderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GraderError::duplicate_identity("test").code(), "E001");
        assert_eq!(GraderError::quota_exceeded("test").code(), "E003");
        assert_eq!(GraderError::invalid_state("test").code(), "E006");
        assert_eq!(GraderError::incomplete_rubric("test").code(), "E007");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GraderError::session_expired("test").error_type(),
            "Session Expired"
        );
        assert_eq!(
            GraderError::session_revoked("test").error_type(),
            "Session Revoked"
        );
    }

    #[test]
    fn test_error_message() {
        let err = GraderError::invalid_rating("rating must be between 1 and 5");
        assert_eq!(err.message(), "rating must be between 1 and 5");
    }

    #[test]
    fn test_unique_violation_translated() {
        let err = sea_orm::DbErr::Custom("UNIQUE constraint failed: users.username".to_string());
        let translated: GraderError = err.into();
        assert_eq!(translated.code(), "E001");
    }

    #[test]
    fn test_format_simple() {
        let err = GraderError::validation("Invalid rubric");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid rubric"));
    }
}
