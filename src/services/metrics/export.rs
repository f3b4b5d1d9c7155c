use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse,
    grading::entities::GradingSession,
    metrics::requests::ResearchExportParams,
    metrics::responses::{ResearchExportRecord, ResearchExportResponse},
};
use crate::services::error_response;

use super::MetricsService;

fn score_map(
    map: &crate::models::grading::entities::CriterionMap,
) -> std::collections::BTreeMap<String, Option<i64>> {
    map.iter()
        .map(|(id, result)| (id.clone(), result.score))
        .collect()
}

fn export_record(session: GradingSession) -> ResearchExportRecord {
    ResearchExportRecord {
        student_identifier_hash: session.student_identifier_hash.unwrap_or_default(),
        assignment_id: session.assignment_id,
        ai_scores: score_map(&session.ai_result),
        final_scores: score_map(&session.final_result),
        edit_count: session.edit_count,
        ai_acceptance_rate: session.ai_acceptance_rate,
        grading_duration_seconds: session.grading_duration_seconds,
        total_score: session.total_score,
        percentage: session.percentage,
        time_completed: session.time_completed,
    }
}

/// 匿名化研究导出：只包含同意参与研究且已完成的会话，
/// 学生身份仅以单向哈希出现，提交物本身不导出。
pub async fn handle_export(
    service: &MetricsService,
    params: ResearchExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let sessions = match storage
        .list_research_sessions(params.period_start, params.period_end, params.assignment_id)
        .await
    {
        Ok(sessions) => sessions,
        Err(e) => return Ok(error_response(&e)),
    };

    let records: Vec<ResearchExportRecord> = sessions.into_iter().map(export_record).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ResearchExportResponse {
            records,
            exported_at: chrono::Utc::now(),
        },
        "OK",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::{CriterionResult, GradingStatus};
    use std::collections::BTreeMap;

    #[test]
    fn test_export_record_strips_submission() {
        let session = GradingSession {
            id: 7,
            assignment_id: 3,
            grader_id: 1,
            student_identifier_hash: Some("abc123".to_string()),
            student_code: "print('secret')".to_string(),
            code_metrics: None,
            ai_result: BTreeMap::from([(
                "style".to_string(),
                CriterionResult {
                    score: Some(2),
                    feedback: Some("ok".to_string()),
                },
            )]),
            final_result: BTreeMap::from([(
                "style".to_string(),
                CriterionResult {
                    score: Some(3),
                    feedback: None,
                },
            )]),
            total_score: Some(3.0),
            percentage: Some(100.0),
            status: GradingStatus::Completed,
            time_started: chrono::Utc::now(),
            time_completed: Some(chrono::Utc::now()),
            grading_duration_seconds: Some(60),
            edit_count: 1,
            ai_acceptance_rate: Some(0.0),
            research_consent: true,
            version: 1,
        };

        let record = export_record(session);
        assert_eq!(record.student_identifier_hash, "abc123");
        assert_eq!(record.ai_scores["style"], Some(2));
        assert_eq!(record.final_scores["style"], Some(3));

        // 导出的序列化结果不得包含提交物内容
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("secret"));
    }
}
