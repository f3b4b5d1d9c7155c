//! 研究指标模型
//!
//! 指标由已完成评分会话的快照重新计算得出，
//! 同一窗口重复计算必须产生相同结果。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 聚合指标类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    AiAcceptanceRate,
    AvgGradingDurationSeconds,
    AvgEditCount,
    SessionsCompleted,
    /// context 中携带按状态分组的计数
    SessionsByStatus,
    AvgScorePercentage,
    /// context 中携带按百分比分档的计数
    ScoreDistribution,
    GoldScoreAgreement,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::AiAcceptanceRate => "ai_acceptance_rate",
            MetricType::AvgGradingDurationSeconds => "avg_grading_duration_seconds",
            MetricType::AvgEditCount => "avg_edit_count",
            MetricType::SessionsCompleted => "sessions_completed",
            MetricType::SessionsByStatus => "sessions_by_status",
            MetricType::AvgScorePercentage => "avg_score_percentage",
            MetricType::ScoreDistribution => "score_distribution",
            MetricType::GoldScoreAgreement => "gold_score_agreement",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MetricType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai_acceptance_rate" => Ok(MetricType::AiAcceptanceRate),
            "avg_grading_duration_seconds" => Ok(MetricType::AvgGradingDurationSeconds),
            "avg_edit_count" => Ok(MetricType::AvgEditCount),
            "sessions_completed" => Ok(MetricType::SessionsCompleted),
            "sessions_by_status" => Ok(MetricType::SessionsByStatus),
            "avg_score_percentage" => Ok(MetricType::AvgScorePercentage),
            "score_distribution" => Ok(MetricType::ScoreDistribution),
            "gold_score_agreement" => Ok(MetricType::GoldScoreAgreement),
            _ => Err(()),
        }
    }
}

/// 待落库的聚合指标
#[derive(Debug, Clone)]
pub struct NewResearchMetric {
    pub metric_type: MetricType,
    pub metric_value: f64,
    pub context: Option<serde_json::Value>,
}

/// 已落库的聚合指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchMetric {
    pub id: i64,
    pub metric_type: String,
    pub metric_value: f64,
    pub context: Option<serde_json::Value>,
    pub computed_at: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_metric_type_round_trip() {
        for mt in [
            MetricType::AiAcceptanceRate,
            MetricType::AvgGradingDurationSeconds,
            MetricType::AvgEditCount,
            MetricType::SessionsCompleted,
            MetricType::SessionsByStatus,
            MetricType::AvgScorePercentage,
            MetricType::ScoreDistribution,
            MetricType::GoldScoreAgreement,
        ] {
            assert_eq!(MetricType::from_str(mt.as_str()), Ok(mt));
        }
        assert!(MetricType::from_str("nonsense").is_err());
    }
}
