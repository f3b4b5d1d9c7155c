use super::entities::KnowledgeBaseEntry;
use crate::models::PaginationInfo;
use serde::Serialize;

// 知识库列表响应
#[derive(Debug, Serialize)]
pub struct KnowledgeListResponse {
    pub items: Vec<KnowledgeBaseEntry>,
    pub pagination: PaginationInfo,
}
