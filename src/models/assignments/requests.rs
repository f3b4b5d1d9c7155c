use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;

// 创建作业请求
#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub name: String,
    pub course_code: String,
    pub prompt: String,
    /// 原始评分标准 JSON，入库前解析规范化
    pub rubric: serde_json::Value,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub assignment_type: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

// 作业查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct AssignmentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub course_code: Option<String>,
}

// 作业列表查询参数（用于存储层），始终限定所有者
#[derive(Debug, Clone)]
pub struct AssignmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub created_by: i64,
    pub course_code: Option<String>,
}
