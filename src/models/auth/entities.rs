use serde::{Deserialize, Serialize};

/// 客户端上下文，随登录请求采集并写入会话与审计日志
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// 用户会话
///
/// 纯能力令牌：不透明的随机 ID 绑定一个用户，绝对过期时间加显式吊销位。
/// 过期只在使用时检查，没有后台清扫。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// 不可猜测的令牌，同时也是存储层主键
    #[serde(skip_serializing)]
    pub id: String,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
}

/// 会话校验结果，区分过期与吊销以便审计
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Usable,
    Expired,
    Revoked,
}

impl Session {
    /// 会话可用当且仅当 `active ∧ now < expires_at`
    pub fn state_at(&self, now: chrono::DateTime<chrono::Utc>) -> SessionState {
        if !self.is_active {
            SessionState::Revoked
        } else if now >= self.expires_at {
            SessionState::Expired
        } else {
            SessionState::Usable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session(expires_in: Duration, active: bool) -> Session {
        let now = Utc::now();
        Session {
            id: "token".to_string(),
            user_id: 1,
            created_at: now,
            expires_at: now + expires_in,
            ip_address: None,
            user_agent: None,
            is_active: active,
        }
    }

    #[test]
    fn test_usable_session() {
        let s = session(Duration::hours(8), true);
        assert_eq!(s.state_at(Utc::now()), SessionState::Usable);
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let s = session(Duration::zero(), true);
        assert_eq!(s.state_at(Utc::now()), SessionState::Expired);
    }

    #[test]
    fn test_revoked_wins_over_expiry() {
        // 吊销后即使尚未过期也不可用，且审计记录为 revoked
        let s = session(Duration::hours(8), false);
        assert_eq!(s.state_at(Utc::now()), SessionState::Revoked);
    }
}
