use serde::{Deserialize, Serialize};

// 用户角色
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Professor, // 教授
    Ta,        // 助教
    Admin,     // 管理员
}

impl UserRole {
    pub const PROFESSOR: &'static str = "professor";
    pub const TA: &'static str = "ta";
    pub const ADMIN: &'static str = "admin";

    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    pub fn grader_roles() -> &'static [&'static UserRole] {
        &[&Self::Professor, &Self::Ta, &Self::Admin]
    }
    pub fn professor_roles() -> &'static [&'static UserRole] {
        &[&Self::Professor, &Self::Admin]
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            UserRole::PROFESSOR => Ok(UserRole::Professor),
            UserRole::TA => Ok(UserRole::Ta),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: professor, ta, admin"
            ))),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Professor => write!(f, "{}", UserRole::PROFESSOR),
            UserRole::Ta => write!(f, "{}", UserRole::TA),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professor" => Ok(UserRole::Professor),
            "ta" => Ok(UserRole::Ta),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户实体
//
// 用户只会被软停用（is_active = false），从不物理删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub role: UserRole,
    pub department: String,
    pub courses: Vec<String>,
    pub is_active: bool,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// 当日已消耗的自动评分调用次数
    pub api_usage_count: i64,
    /// 计数器所属的日历日；跨日后在首次使用时惰性清零
    pub api_usage_reset_date: chrono::NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Professor, UserRole::Ta, UserRole::Admin] {
            let parsed = UserRole::from_str(&role.to_string()).unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_invalid_role_rejected() {
        assert!(UserRole::from_str("student").is_err());
        assert!(serde_json::from_str::<UserRole>("\"student\"").is_err());
    }
}
