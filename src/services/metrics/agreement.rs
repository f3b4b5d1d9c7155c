use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    grading::entities::{CriterionMap, GradingStatus},
    metrics::entities::MetricType,
    metrics::requests::GoldScoreAgreementRequest,
    metrics::responses::{GoldScoreAgreementResponse, SessionAgreement},
};
use crate::services::error_response;

use super::MetricsService;

/// 金标准逐项对照：只统计双方都有分数的条目，完全一致才算命中
pub(crate) fn exact_agreement(
    final_result: &CriterionMap,
    gold_scores: &std::collections::BTreeMap<String, i64>,
) -> (f64, u64) {
    let mut compared = 0u64;
    let mut matched = 0u64;

    for (criterion_id, gold) in gold_scores {
        let Some(final_score) = final_result.get(criterion_id).and_then(|r| r.score) else {
            continue;
        };
        compared += 1;
        if final_score == *gold {
            matched += 1;
        }
    }

    if compared == 0 {
        (0.0, 0)
    } else {
        (matched as f64 / compared as f64, compared)
    }
}

/// 批次平均一致率，空批次没有均值
pub(crate) fn average_agreement(sessions: &[SessionAgreement]) -> Option<f64> {
    if sessions.is_empty() {
        None
    } else {
        Some(sessions.iter().map(|s| s.agreement).sum::<f64>() / sessions.len() as f64)
    }
}

/// 批量金标准对照：逐个会话比对，不可对照的会话跳过而不是让整批失败
pub async fn handle_agreement(
    service: &MetricsService,
    req: GoldScoreAgreementRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if req.sessions.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::BadRequest,
            "At least one session is required",
        )));
    }

    let mut compared = Vec::new();
    let mut skipped = Vec::new();

    for entry in &req.sessions {
        let session = match storage.get_grading_session(entry.grading_session_id).await {
            Ok(Some(session)) if session.status == GradingStatus::Completed => session,
            Ok(_) => {
                skipped.push(entry.grading_session_id);
                continue;
            }
            Err(e) => return Ok(error_response(&e)),
        };

        let (agreement, compared_criteria) =
            exact_agreement(&session.final_result, &entry.gold_scores);
        if compared_criteria == 0 {
            skipped.push(entry.grading_session_id);
            continue;
        }

        compared.push(SessionAgreement {
            grading_session_id: session.id,
            agreement,
            compared_criteria,
        });
    }

    let average = average_agreement(&compared);

    tracing::info!(
        metric = MetricType::GoldScoreAgreement.as_str(),
        sessions_compared = compared.len(),
        sessions_skipped = skipped.len(),
        average_agreement = average,
        "Gold score comparison"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GoldScoreAgreementResponse {
            average_agreement: average,
            sessions: compared,
            skipped_session_ids: skipped,
        },
        "OK",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grading::entities::CriterionResult;
    use std::collections::BTreeMap;

    fn final_result(pairs: &[(&str, Option<i64>)]) -> CriterionMap {
        pairs
            .iter()
            .map(|(id, score)| {
                (
                    id.to_string(),
                    CriterionResult {
                        score: *score,
                        feedback: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_exact_match_fraction() {
        let finals = final_result(&[("a", Some(3)), ("b", Some(2)), ("c", Some(1))]);
        let gold = BTreeMap::from([
            ("a".to_string(), 3),
            ("b".to_string(), 1),
            ("c".to_string(), 1),
        ]);
        let (agreement, compared) = exact_agreement(&finals, &gold);
        assert_eq!(compared, 3);
        assert!((agreement - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unjoinable_criteria_are_skipped() {
        let finals = final_result(&[("a", Some(3)), ("b", None)]);
        let gold = BTreeMap::from([
            ("a".to_string(), 3),
            ("b".to_string(), 2),
            ("missing".to_string(), 1),
        ]);
        let (agreement, compared) = exact_agreement(&finals, &gold);
        // b 没有最终分数、missing 不在评分结果里，都不参与对照
        assert_eq!(compared, 1);
        assert_eq!(agreement, 1.0);
    }

    #[test]
    fn test_nothing_joinable() {
        let finals = final_result(&[("a", None)]);
        let gold = BTreeMap::from([("a".to_string(), 2)]);
        assert_eq!(exact_agreement(&finals, &gold), (0.0, 0));
    }

    #[test]
    fn test_average_over_compared_sessions() {
        let compared = vec![
            SessionAgreement {
                grading_session_id: 1,
                agreement: 1.0,
                compared_criteria: 3,
            },
            SessionAgreement {
                grading_session_id: 2,
                agreement: 0.5,
                compared_criteria: 2,
            },
        ];
        assert_eq!(average_agreement(&compared), Some(0.75));
    }

    #[test]
    fn test_no_average_without_comparable_sessions() {
        assert_eq!(average_agreement(&[]), None);
    }
}
