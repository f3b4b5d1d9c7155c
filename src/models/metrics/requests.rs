use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 计算窗口请求
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeMetricsRequest {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// 金标准对照请求：对一批评分会话给出参考分数
#[derive(Debug, Clone, Deserialize)]
pub struct GoldScoreAgreementRequest {
    pub sessions: Vec<GoldSessionScores>,
}

/// 单个会话的参考分数集
#[derive(Debug, Clone, Deserialize)]
pub struct GoldSessionScores {
    pub grading_session_id: i64,
    /// 评分项 ID 到参考分数
    pub gold_scores: BTreeMap<String, i64>,
}

/// 研究导出筛选
#[derive(Debug, Clone, Deserialize)]
pub struct ResearchExportParams {
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub assignment_id: Option<i64>,
}
