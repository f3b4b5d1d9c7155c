//! 评分会话实体
//!
//! AI 结果与最终结果各拆成分数列与反馈列两个 JSON 文本列，
//! 便于研究导出时只取分数而不取反馈全文。

use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;

use crate::models::grading::entities::{CriterionMap, CriterionResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grading_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub grader_id: i64,
    pub student_identifier_hash: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub student_code: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub code_metrics_json: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub ai_scores_json: String,
    #[sea_orm(column_type = "Text")]
    pub ai_feedback_json: String,
    #[sea_orm(column_type = "Text")]
    pub final_scores_json: String,
    #[sea_orm(column_type = "Text")]
    pub final_feedback_json: String,
    pub total_score: Option<f64>,
    pub percentage: Option<f64>,
    pub status: String,
    pub time_started: i64,
    pub time_completed: Option<i64>,
    pub grading_duration_seconds: Option<i64>,
    pub edit_count: i64,
    pub ai_acceptance_rate: Option<f64>,
    pub research_consent: bool,
    /// 每次持久化 +1 的行版本，乐观并发控制的过滤键
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::GraderId",
        to = "super::users::Column::Id"
    )]
    Grader,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 把分数列与反馈列合并回评分项映射
pub fn join_criterion_map(scores_json: &str, feedback_json: &str) -> CriterionMap {
    let scores: BTreeMap<String, Option<i64>> =
        serde_json::from_str(scores_json).unwrap_or_default();
    let feedback: BTreeMap<String, Option<String>> =
        serde_json::from_str(feedback_json).unwrap_or_default();

    let mut map = CriterionMap::new();
    for (id, score) in scores {
        map.insert(
            id,
            CriterionResult {
                score,
                feedback: None,
            },
        );
    }
    for (id, fb) in feedback {
        map.entry(id).or_default().feedback = fb;
    }
    map
}

/// 把评分项映射拆成分数列与反馈列
pub fn split_criterion_map(map: &CriterionMap) -> crate::errors::Result<(String, String)> {
    let scores: BTreeMap<&String, Option<i64>> =
        map.iter().map(|(id, r)| (id, r.score)).collect();
    let feedback: BTreeMap<&String, Option<&String>> =
        map.iter().map(|(id, r)| (id, r.feedback.as_ref())).collect();
    Ok((
        serde_json::to_string(&scores)?,
        serde_json::to_string(&feedback)?,
    ))
}

impl Model {
    pub fn into_grading_session(self) -> crate::models::grading::entities::GradingSession {
        use crate::models::grading::entities::{GradingSession, GradingStatus};
        use chrono::{DateTime, Utc};

        GradingSession {
            id: self.id,
            assignment_id: self.assignment_id,
            grader_id: self.grader_id,
            student_identifier_hash: self.student_identifier_hash,
            student_code: self.student_code,
            code_metrics: self
                .code_metrics_json
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            ai_result: join_criterion_map(&self.ai_scores_json, &self.ai_feedback_json),
            final_result: join_criterion_map(&self.final_scores_json, &self.final_feedback_json),
            total_score: self.total_score,
            percentage: self.percentage,
            status: self
                .status
                .parse::<GradingStatus>()
                .unwrap_or(GradingStatus::Draft),
            time_started: DateTime::<Utc>::from_timestamp(self.time_started, 0)
                .unwrap_or_default(),
            time_completed: self
                .time_completed
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            grading_duration_seconds: self.grading_duration_seconds,
            edit_count: self.edit_count,
            ai_acceptance_rate: self.ai_acceptance_rate,
            research_consent: self.research_consent,
            version: self.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_join_criterion_map() {
        let mut map = CriterionMap::new();
        map.insert(
            "correctness".to_string(),
            CriterionResult {
                score: Some(3),
                feedback: Some("solid".to_string()),
            },
        );
        map.insert(
            "style".to_string(),
            CriterionResult {
                score: Some(1),
                feedback: None,
            },
        );

        let (scores, feedback) = split_criterion_map(&map).unwrap();
        let rebuilt = join_criterion_map(&scores, &feedback);
        assert_eq!(rebuilt, map);
    }

    #[test]
    fn test_join_empty_columns() {
        assert!(join_criterion_map("{}", "{}").is_empty());
    }
}
