use super::entities::Assignment;
use crate::models::PaginationInfo;
use serde::Serialize;

// 作业列表响应
#[derive(Debug, Serialize)]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
    pub pagination: PaginationInfo,
}
