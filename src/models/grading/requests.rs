use std::collections::BTreeMap;

use serde::Deserialize;

use super::entities::AutomatedCriterion;
use crate::models::common::pagination::PaginationQuery;

// 开启评分会话请求
#[derive(Debug, Deserialize)]
pub struct OpenGradingSessionRequest {
    pub assignment_id: i64,
    /// 提交物（代码或文本），原样存储
    pub student_code: String,
    /// 原始学生标识，仅用于计算单向哈希，从不落库
    pub student_identifier: Option<String>,
    #[serde(default)]
    pub research_consent: bool,
}

// 存入自动评分结果请求：criterion id → (score, feedback)
#[derive(Debug, Deserialize)]
pub struct ApplyAutomatedRequest {
    pub result: BTreeMap<String, AutomatedCriterion>,
    pub code_metrics: Option<serde_json::Value>,
}

// 修订单个条目请求
#[derive(Debug, Deserialize)]
pub struct ReviseFinalRequest {
    pub criterion_id: String,
    pub score: i64,
    pub feedback: Option<String>,
}

// 标记会话请求
#[derive(Debug, Deserialize)]
pub struct FlagSessionRequest {
    pub reason: String,
}

// 新建评分会话（用于存储层，标识已哈希）
#[derive(Debug, Clone)]
pub struct NewGradingSession {
    pub assignment_id: i64,
    pub grader_id: i64,
    pub student_identifier_hash: Option<String>,
    pub student_code: String,
    pub research_consent: bool,
}

// 评分会话查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct GradingSessionListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub assignment_id: Option<i64>,
    pub status: Option<String>,
}

// 评分会话列表查询参数（用于存储层）
#[derive(Debug, Clone)]
pub struct GradingSessionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub grader_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub status: Option<super::entities::GradingStatus>,
}
