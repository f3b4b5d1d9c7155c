use super::entities::KnowledgeCategory;
use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;

// 创建知识库条目请求
#[derive(Debug, Deserialize)]
pub struct CreateKnowledgeRequest {
    pub category: KnowledgeCategory,
    pub topic: String,
    pub content: String,
}

// 评分请求（1-5）
#[derive(Debug, Deserialize)]
pub struct RateKnowledgeRequest {
    pub rating: f64,
}

// 插入反馈请求
#[derive(Debug, Deserialize)]
pub struct InsertFeedbackRequest {
    pub grading_session_id: i64,
    pub criterion_id: String,
}

// 知识库查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct KnowledgeSearchParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub category: Option<KnowledgeCategory>,
    pub topic: Option<String>,
}

// 知识库查询参数（用于存储层）
#[derive(Debug, Clone)]
pub struct KnowledgeSearchQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub category: Option<KnowledgeCategory>,
    pub topic: Option<String>,
}
