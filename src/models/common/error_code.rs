use serde::{Deserialize, Serialize};

/// API 响应错误码
///
/// 与 `GraderError` 的内部错误码分离：ErrorCode 面向 HTTP 客户端，
/// GraderError 面向日志和内部传播。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 认证 1xxx
    Unauthorized = 1001,
    AuthFailed = 1002,
    SessionExpired = 1003,
    SessionRevoked = 1004,
    Forbidden = 1005,

    // 用户 2xxx
    UserNameInvalid = 2001,
    UserEmailInvalid = 2002,
    UserAlreadyExists = 2003,
    UserNotFound = 2004,
    RegisterFailed = 2005,
    PasswordInvalid = 2006,
    QuotaExceeded = 2007,

    // 作业 3xxx
    AssignmentNotFound = 3001,
    AssignmentInactive = 3002,
    RubricInvalid = 3003,

    // 评分会话 4xxx
    GradingSessionNotFound = 4001,
    InvalidGradingState = 4002,
    IncompleteRubric = 4003,
    UnknownCriterion = 4004,

    // 知识库 5xxx
    KnowledgeNotFound = 5001,
    InvalidRating = 5002,

    // 指标 6xxx
    InvalidMetricsWindow = 6001,

    // 通用 9xxx
    BadRequest = 9001,
    NotFound = 9002,
    InternalServerError = 9000,
}
