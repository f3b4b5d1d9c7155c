use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, NewAuditEntry},
    grading::entities::GradingSession,
    metrics::entities::{MetricType, NewResearchMetric},
    metrics::requests::ComputeMetricsRequest,
    metrics::responses::MetricsComputeResponse,
};
use crate::services::error_response;

use super::MetricsService;

/// 百分比分档，左闭右开，相邻档位无缝衔接；末档上沿取无穷大兜住 100
const DISTRIBUTION_BUCKETS: [(&str, f64, f64); 5] = [
    ("0-59", 0.0, 60.0),
    ("60-69", 60.0, 70.0),
    ("70-79", 70.0, 80.0),
    ("80-89", 80.0, 90.0),
    ("90-100", 90.0, f64::INFINITY),
];

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        None
    } else {
        Some(collected.iter().sum::<f64>() / collected.len() as f64)
    }
}

/// 对窗口内已完成的会话做纯聚合：相同输入必产出相同指标行。
/// 均值类指标只看 completed（flagged 在存储层查询时已被排除），
/// status_counts 覆盖窗口内的全部状态。
pub(crate) fn compute_window_metrics(
    sessions: &[GradingSession],
    status_counts: &std::collections::BTreeMap<String, i64>,
) -> Vec<NewResearchMetric> {
    let mut metrics = vec![
        NewResearchMetric {
            metric_type: MetricType::SessionsByStatus,
            metric_value: status_counts.values().sum::<i64>() as f64,
            context: Some(serde_json::json!(status_counts)),
        },
        NewResearchMetric {
            metric_type: MetricType::SessionsCompleted,
            metric_value: sessions.len() as f64,
            context: None,
        },
    ];

    if let Some(value) = mean_of(sessions.iter().filter_map(|s| s.ai_acceptance_rate)) {
        metrics.push(NewResearchMetric {
            metric_type: MetricType::AiAcceptanceRate,
            metric_value: value,
            context: None,
        });
    }

    if let Some(value) = mean_of(
        sessions
            .iter()
            .filter_map(|s| s.grading_duration_seconds.map(|d| d as f64)),
    ) {
        metrics.push(NewResearchMetric {
            metric_type: MetricType::AvgGradingDurationSeconds,
            metric_value: value,
            context: None,
        });
    }

    if let Some(value) = mean_of(sessions.iter().map(|s| s.edit_count as f64)) {
        metrics.push(NewResearchMetric {
            metric_type: MetricType::AvgEditCount,
            metric_value: value,
            context: None,
        });
    }

    let percentages: Vec<f64> = sessions.iter().filter_map(|s| s.percentage).collect();
    if let Some(value) = mean_of(percentages.iter().copied()) {
        metrics.push(NewResearchMetric {
            metric_type: MetricType::AvgScorePercentage,
            metric_value: value,
            context: None,
        });

        let mut buckets = serde_json::Map::new();
        for (label, low, high) in DISTRIBUTION_BUCKETS {
            let count = percentages
                .iter()
                .filter(|p| **p >= low && **p < high)
                .count();
            buckets.insert(label.to_string(), serde_json::json!(count));
        }
        metrics.push(NewResearchMetric {
            metric_type: MetricType::ScoreDistribution,
            metric_value: percentages.len() as f64,
            context: Some(serde_json::Value::Object(buckets)),
        });
    }

    metrics
}

pub async fn handle_compute(
    service: &MetricsService,
    req: ComputeMetricsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if req.period_start >= req.period_end {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::InvalidMetricsWindow,
            "period_start must be before period_end",
        )));
    }

    let sessions = match storage
        .list_completed_in_window(req.period_start, req.period_end)
        .await
    {
        Ok(sessions) => sessions,
        Err(e) => return Ok(error_response(&e)),
    };

    let status_counts = match storage
        .count_sessions_by_status_in_window(req.period_start, req.period_end)
        .await
    {
        Ok(counts) => counts,
        Err(e) => return Ok(error_response(&e)),
    };

    let metrics = compute_window_metrics(&sessions, &status_counts);

    let audit = NewAuditEntry::new(
        RequireSession::audit_context(request),
        AuditAction::MetricsComputed,
    )
    .details(serde_json::json!({
        "period_start": req.period_start,
        "period_end": req.period_end,
        "sessions_considered": sessions.len(),
    }));

    match storage
        .replace_metrics_for_period(req.period_start, req.period_end, metrics, audit)
        .await
    {
        Ok(stored) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MetricsComputeResponse {
                period_start: req.period_start,
                period_end: req.period_end,
                sessions_considered: sessions.len() as u64,
                metrics: stored,
            },
            "Metrics computed",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn handle_list(
    service: &MetricsService,
    params: ComputeMetricsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if params.period_start >= params.period_end {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::InvalidMetricsWindow,
            "period_start must be before period_end",
        )));
    }

    match storage
        .list_metrics_for_period(params.period_start, params.period_end)
        .await
    {
        Ok(metrics) => Ok(HttpResponse::Ok().json(ApiResponse::success(metrics, "OK"))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::{GradingStatus, GradingSession};
    use std::collections::BTreeMap;

    fn completed_session(
        percentage: Option<f64>,
        acceptance: Option<f64>,
        duration: Option<i64>,
        edits: i64,
    ) -> GradingSession {
        GradingSession {
            id: 1,
            assignment_id: 1,
            grader_id: 1,
            student_identifier_hash: None,
            student_code: String::new(),
            code_metrics: None,
            ai_result: BTreeMap::new(),
            final_result: BTreeMap::new(),
            total_score: None,
            percentage,
            status: GradingStatus::Completed,
            time_started: chrono::Utc::now(),
            time_completed: Some(chrono::Utc::now()),
            grading_duration_seconds: duration,
            edit_count: edits,
            ai_acceptance_rate: acceptance,
            research_consent: false,
            version: 0,
        }
    }

    fn value_of(metrics: &[NewResearchMetric], mt: MetricType) -> Option<f64> {
        metrics
            .iter()
            .find(|m| m.metric_type == mt)
            .map(|m| m.metric_value)
    }

    #[test]
    fn test_empty_window_yields_only_counts() {
        let metrics = compute_window_metrics(&[], &BTreeMap::new());
        assert_eq!(metrics.len(), 2);
        assert_eq!(value_of(&metrics, MetricType::SessionsByStatus), Some(0.0));
        assert_eq!(value_of(&metrics, MetricType::SessionsCompleted), Some(0.0));
    }

    #[test]
    fn test_status_counts_carried_into_context() {
        let counts = BTreeMap::from([
            ("completed".to_string(), 2),
            ("draft".to_string(), 3),
            ("flagged".to_string(), 1),
        ]);
        let metrics = compute_window_metrics(&[], &counts);

        let by_status = metrics
            .iter()
            .find(|m| m.metric_type == MetricType::SessionsByStatus)
            .unwrap();
        assert_eq!(by_status.metric_value, 6.0);
        let context = by_status.context.clone().unwrap();
        assert_eq!(context["draft"], 3);
        assert_eq!(context["flagged"], 1);
        assert_eq!(context["completed"], 2);
    }

    #[test]
    fn test_means_over_present_values_only() {
        let sessions = vec![
            completed_session(Some(80.0), Some(0.5), Some(100), 2),
            completed_session(Some(90.0), None, Some(300), 4),
        ];
        let metrics = compute_window_metrics(&sessions, &BTreeMap::new());

        assert_eq!(value_of(&metrics, MetricType::SessionsCompleted), Some(2.0));
        // 只有一个会话带接受率，均值就是它本身
        assert_eq!(value_of(&metrics, MetricType::AiAcceptanceRate), Some(0.5));
        assert_eq!(
            value_of(&metrics, MetricType::AvgGradingDurationSeconds),
            Some(200.0)
        );
        assert_eq!(value_of(&metrics, MetricType::AvgEditCount), Some(3.0));
        assert_eq!(
            value_of(&metrics, MetricType::AvgScorePercentage),
            Some(85.0)
        );
    }

    #[test]
    fn test_score_distribution_buckets() {
        let sessions = vec![
            completed_session(Some(55.0), None, None, 0),
            completed_session(Some(72.0), None, None, 0),
            completed_session(Some(95.0), None, None, 0),
            completed_session(Some(100.0), None, None, 0),
            completed_session(None, None, None, 0),
        ];
        let metrics = compute_window_metrics(&sessions, &BTreeMap::new());

        let distribution = metrics
            .iter()
            .find(|m| m.metric_type == MetricType::ScoreDistribution)
            .and_then(|m| m.context.clone())
            .unwrap();
        assert_eq!(distribution["0-59"], 1);
        assert_eq!(distribution["70-79"], 1);
        assert_eq!(distribution["90-100"], 2);
        assert_eq!(distribution["60-69"], 0);
        // 没有百分比的会话不进入分布
        assert_eq!(
            value_of(&metrics, MetricType::ScoreDistribution),
            Some(4.0)
        );
    }

    #[test]
    fn test_bucket_boundaries_leave_no_gaps() {
        // 非整数百分比落在相邻档位的缝隙上也必须归档
        let sessions = vec![
            completed_session(Some(59.5), None, None, 0),
            completed_session(Some(69.5), None, None, 0),
            completed_session(Some(100.0), None, None, 0),
        ];
        let metrics = compute_window_metrics(&sessions, &BTreeMap::new());

        let distribution = metrics
            .iter()
            .find(|m| m.metric_type == MetricType::ScoreDistribution)
            .and_then(|m| m.context.clone())
            .unwrap();
        assert_eq!(distribution["0-59"], 1);
        assert_eq!(distribution["60-69"], 1);
        assert_eq!(distribution["90-100"], 1);

        let bucketed: i64 = distribution
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_i64().unwrap())
            .sum();
        assert_eq!(bucketed, 3);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let sessions = vec![
            completed_session(Some(80.0), Some(0.8), Some(120), 1),
            completed_session(Some(60.0), Some(0.4), Some(240), 3),
        ];
        let first = compute_window_metrics(&sessions, &BTreeMap::new());
        let second = compute_window_metrics(&sessions, &BTreeMap::new());
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.metric_type, b.metric_type);
            assert_eq!(a.metric_value, b.metric_value);
            assert_eq!(a.context, b.context);
        }
    }
}
