use crate::models::users::entities::User;
use serde::Serialize;

// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// 不透明会话令牌，后续请求通过 Authorization: Bearer 携带
    pub session_token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

// 配额消耗响应
#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub api_usage_count: i64,
    pub daily_limit: i64,
}
