use super::entities::AuditLogEntry;
use crate::models::common::pagination::PaginationInfo;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuditLogListResponse {
    pub items: Vec<AuditLogEntry>,
    pub pagination: PaginationInfo,
}
