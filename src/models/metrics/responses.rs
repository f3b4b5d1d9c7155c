use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entities::ResearchMetric;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsComputeResponse {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub sessions_considered: u64,
    pub metrics: Vec<ResearchMetric>,
}

/// 单个会话的金标准对照结果
#[derive(Debug, Clone, Serialize)]
pub struct SessionAgreement {
    pub grading_session_id: i64,
    /// 完全一致的评分项占比，0 到 1
    pub agreement: f64,
    pub compared_criteria: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoldScoreAgreementResponse {
    /// 可对照会话的平均一致率；没有可对照会话时为 None
    pub average_agreement: Option<f64>,
    pub sessions: Vec<SessionAgreement>,
    /// 缺失、未完成或无可对照条目而被跳过的会话
    pub skipped_session_ids: Vec<i64>,
}

/// 单条匿名化的研究导出记录
#[derive(Debug, Clone, Serialize)]
pub struct ResearchExportRecord {
    pub student_identifier_hash: String,
    pub assignment_id: i64,
    pub ai_scores: BTreeMap<String, Option<i64>>,
    pub final_scores: BTreeMap<String, Option<i64>>,
    pub edit_count: i64,
    pub ai_acceptance_rate: Option<f64>,
    pub grading_duration_seconds: Option<i64>,
    pub total_score: Option<f64>,
    pub percentage: Option<f64>,
    pub time_completed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchExportResponse {
    pub records: Vec<ResearchExportRecord>,
    pub exported_at: DateTime<Utc>,
}
