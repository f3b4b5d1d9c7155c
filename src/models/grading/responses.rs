use super::entities::GradingSession;
use crate::models::PaginationInfo;
use serde::Serialize;

// 评分会话列表响应
#[derive(Debug, Serialize)]
pub struct GradingSessionListResponse {
    pub items: Vec<GradingSession>,
    pub pagination: PaginationInfo,
}
