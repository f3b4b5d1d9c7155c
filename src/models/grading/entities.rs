//! 评分会话状态机
//!
//! GradingSession 是系统的核心实体：AI 建议与评审员终稿在这里对账，
//! 每次条目级修改计入 edit_count，完成时推导接受率与总分。
//! 状态只沿 {draft→completed, draft→flagged, completed→flagged, flagged→draft}
//! 四条边流转，任何其他转换都是错误。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{GraderError, Result};
use crate::models::assignments::entities::Rubric;

// 评分会话状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingStatus {
    Draft,
    Completed,
    Flagged,
}

impl std::fmt::Display for GradingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradingStatus::Draft => write!(f, "draft"),
            GradingStatus::Completed => write!(f, "completed"),
            GradingStatus::Flagged => write!(f, "flagged"),
        }
    }
}

impl std::str::FromStr for GradingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(GradingStatus::Draft),
            "completed" => Ok(GradingStatus::Completed),
            "flagged" => Ok(GradingStatus::Flagged),
            _ => Err(format!("Invalid grading status: {s}")),
        }
    }
}

/// 单个评分条目的结果记录
///
/// score 为 None 表示条目只有追加的反馈文本（例如知识库插入），
/// 分数在完成时从 AI 建议回填。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

/// criterion id → 结果记录，BTreeMap 保证序列化顺序确定
pub type CriterionMap = BTreeMap<String, CriterionResult>;

/// 自动评分器的输出条目：合约要求每个条目必须带分数
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutomatedCriterion {
    pub score: i64,
    pub feedback: Option<String>,
}

/// 评分会话
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingSession {
    pub id: i64,
    pub assignment_id: i64,
    pub grader_id: i64,
    /// 学生标识的单向哈希，原始标识从不落库
    pub student_identifier_hash: Option<String>,
    #[serde(skip_serializing)]
    pub student_code: String,
    pub code_metrics: Option<serde_json::Value>,
    pub ai_result: CriterionMap,
    pub final_result: CriterionMap,
    pub total_score: Option<f64>,
    pub percentage: Option<f64>,
    pub status: GradingStatus,
    pub time_started: chrono::DateTime<chrono::Utc>,
    pub time_completed: Option<chrono::DateTime<chrono::Utc>>,
    pub grading_duration_seconds: Option<i64>,
    pub edit_count: i64,
    pub ai_acceptance_rate: Option<f64>,
    pub research_consent: bool,
    /// 行版本，每次持久化成功后 +1。edit_count 与 status 都可能在一次
    /// 变更中保持不变（如反馈追加），并发控制只能依赖它。
    pub version: i64,
}

impl GradingSession {
    fn require_draft(&self, operation: &str) -> Result<()> {
        if self.status != GradingStatus::Draft {
            return Err(GraderError::invalid_state(format!(
                "{operation} 仅在 draft 状态下有效，当前状态: {}",
                self.status
            )));
        }
        Ok(())
    }

    fn require_known_criterion(&self, rubric: &Rubric, criterion_id: &str) -> Result<()> {
        if !rubric.contains_criterion(criterion_id) {
            return Err(GraderError::validation(format!(
                "未知的 criterion id: {criterion_id}"
            )));
        }
        Ok(())
    }

    fn require_score_in_scale(&self, rubric: &Rubric, score: i64) -> Result<()> {
        if score < rubric.scale.min || score > rubric.scale.max {
            return Err(GraderError::validation(format!(
                "分数 {score} 超出量表范围 [{}, {}]",
                rubric.scale.min, rubric.scale.max
            )));
        }
        Ok(())
    }

    /// 存入自动评分结果
    ///
    /// 仅在 draft 状态下有效；载荷按 criterion id 校验后原样存储，
    /// 不触碰 final_* 字段。
    pub fn apply_automated(
        &mut self,
        result: BTreeMap<String, AutomatedCriterion>,
        rubric: &Rubric,
    ) -> Result<()> {
        self.require_draft("applyAutomatedResult")?;

        for (id, entry) in &result {
            self.require_known_criterion(rubric, id)?;
            self.require_score_in_scale(rubric, entry.score)?;
        }

        self.ai_result = result
            .into_iter()
            .map(|(id, entry)| {
                (
                    id,
                    CriterionResult {
                        score: Some(entry.score),
                        feedback: entry.feedback,
                    },
                )
            })
            .collect();
        Ok(())
    }

    /// 上一次呈现给评审员的值：已修订过取修订值，否则取 AI 建议
    fn presented(&self, criterion_id: &str) -> Option<&CriterionResult> {
        self.final_result
            .get(criterion_id)
            .or_else(|| self.ai_result.get(criterion_id))
    }

    /// 修订单个条目的最终分数/反馈
    ///
    /// 返回本次修订是否构成一次实质性变更（edit_count 是否 +1）。
    /// 实质性变更以上一次呈现值为基准，不按击键计数。
    pub fn revise_final(
        &mut self,
        criterion_id: &str,
        score: i64,
        feedback: Option<String>,
        rubric: &Rubric,
    ) -> Result<bool> {
        self.require_draft("reviseFinal")?;
        self.require_known_criterion(rubric, criterion_id)?;
        self.require_score_in_scale(rubric, score)?;

        let presented = self.presented(criterion_id).cloned();
        let edited = match &presented {
            None => true,
            Some(prev) => {
                prev.score != Some(score)
                    || feedback
                        .as_ref()
                        .is_some_and(|f| prev.feedback.as_ref() != Some(f))
            }
        };

        let merged_feedback = feedback.or_else(|| presented.and_then(|p| p.feedback));
        self.final_result.insert(
            criterion_id.to_string(),
            CriterionResult {
                score: Some(score),
                feedback: merged_feedback,
            },
        );

        if edited {
            self.edit_count += 1;
        }
        self.recompute_draft_acceptance();
        Ok(edited)
    }

    /// 向条目的最终反馈追加内容（知识库插入）
    pub fn append_feedback(
        &mut self,
        criterion_id: &str,
        content: &str,
        rubric: &Rubric,
    ) -> Result<()> {
        self.require_draft("insertIntoFeedback")?;
        self.require_known_criterion(rubric, criterion_id)?;

        let presented = self.presented(criterion_id).cloned();
        let entry = self
            .final_result
            .entry(criterion_id.to_string())
            .or_insert_with(|| CriterionResult {
                score: presented.as_ref().and_then(|p| p.score),
                feedback: presented.and_then(|p| p.feedback),
            });
        entry.feedback = Some(match entry.feedback.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{content}"),
            _ => content.to_string(),
        });
        Ok(())
    }

    /// 草稿期接受率：以已有 AI 建议的条目为分母；
    /// 未修订的条目视为暂时接受。完成时会按完整量表重新计算。
    fn recompute_draft_acceptance(&mut self) {
        if self.ai_result.is_empty() {
            self.ai_acceptance_rate = None;
            return;
        }
        let total = self.ai_result.len();
        let unchanged = self
            .ai_result
            .iter()
            .filter(|(id, ai)| match self.final_result.get(*id) {
                Some(fin) => fin.score == ai.score,
                None => true,
            })
            .count();
        self.ai_acceptance_rate = Some(unchanged as f64 / total as f64);
    }

    /// 完成评分
    ///
    /// 每个量表条目都必须能解析出最终分数：评审员的修订优先，
    /// 未触碰的条目隐式采纳 AI 建议；两者皆无的条目阻塞完成。
    /// 完成时推导 total_score / percentage / 接受率 / 评分时长。
    pub fn complete(&mut self, rubric: &Rubric, now: chrono::DateTime<chrono::Utc>) -> Result<()> {
        self.require_draft("complete")?;

        let mut missing: Vec<String> = Vec::new();
        let mut resolved: CriterionMap = BTreeMap::new();
        for criterion in &rubric.criteria {
            let final_entry = self.final_result.get(&criterion.id);
            let ai_entry = self.ai_result.get(&criterion.id);
            let score = final_entry
                .and_then(|f| f.score)
                .or_else(|| ai_entry.and_then(|a| a.score));
            match score {
                Some(score) => {
                    let feedback = final_entry
                        .and_then(|f| f.feedback.clone())
                        .or_else(|| ai_entry.and_then(|a| a.feedback.clone()));
                    resolved.insert(
                        criterion.id.clone(),
                        CriterionResult {
                            score: Some(score),
                            feedback,
                        },
                    );
                }
                None => missing.push(criterion.id.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(GraderError::incomplete_rubric(format!(
                "以下条目缺少最终分数: {}",
                missing.join(", ")
            )));
        }

        // 接受率按完整量表条目集计算：最终分数与 AI 建议一致的条目为接受
        let total = rubric.criteria.len();
        let unchanged = rubric
            .criteria
            .iter()
            .filter(|c| {
                let ai = self.ai_result.get(&c.id).and_then(|a| a.score);
                let fin = resolved.get(&c.id).and_then(|f| f.score);
                ai.is_some() && ai == fin
            })
            .count();
        self.ai_acceptance_rate = Some(unchanged as f64 / total as f64);

        let total_score: i64 = resolved.values().filter_map(|r| r.score).sum();
        self.total_score = Some(total_score as f64);
        self.percentage = if rubric.max_total() > 0 {
            Some(total_score as f64 / rubric.max_total() as f64 * 100.0)
        } else {
            None
        };

        self.final_result = resolved;
        self.status = GradingStatus::Completed;
        self.time_completed = Some(now);
        self.grading_duration_seconds =
            Some((now - self.time_started).num_seconds().max(0));
        Ok(())
    }

    /// 标记会话需要复核
    ///
    /// draft 与 completed 均可标记；被标记的会话不参与指标聚合，
    /// 但审计轨迹永久保留。
    pub fn flag(&mut self) -> Result<()> {
        match self.status {
            GradingStatus::Draft | GradingStatus::Completed => {
                self.status = GradingStatus::Flagged;
                Ok(())
            }
            GradingStatus::Flagged => Err(GraderError::invalid_state(
                "会话已处于 flagged 状态".to_string(),
            )),
        }
    }

    /// 解除标记，重新打开为草稿；已有的最终值保留，评审员从原处继续
    pub fn reopen(&mut self) -> Result<()> {
        if self.status != GradingStatus::Flagged {
            return Err(GraderError::invalid_state(format!(
                "reopen 仅对 flagged 状态有效，当前状态: {}",
                self.status
            )));
        }
        self.status = GradingStatus::Draft;
        self.time_completed = None;
        self.grading_duration_seconds = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn rubric() -> Rubric {
        Rubric::parse(&json!({
            "criteria": [
                {"id": "CORR", "title": "Correctness"},
                {"id": "STYLE", "title": "Style"},
                {"id": "TEST", "title": "Testing"}
            ]
        }))
        .unwrap()
    }

    fn session() -> GradingSession {
        GradingSession {
            id: 1,
            assignment_id: 1,
            grader_id: 1,
            student_identifier_hash: None,
            student_code: "fn main() {}".to_string(),
            code_metrics: None,
            ai_result: BTreeMap::new(),
            final_result: BTreeMap::new(),
            total_score: None,
            percentage: None,
            status: GradingStatus::Draft,
            time_started: Utc::now(),
            time_completed: None,
            grading_duration_seconds: None,
            edit_count: 0,
            ai_acceptance_rate: None,
            research_consent: false,
            version: 0,
        }
    }

    fn automated(scores: &[(&str, i64)]) -> BTreeMap<String, AutomatedCriterion> {
        scores
            .iter()
            .map(|(id, score)| {
                (
                    id.to_string(),
                    AutomatedCriterion {
                        score: *score,
                        feedback: Some(format!("AI feedback for {id}")),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_single_revision_derives_totals_and_rate() {
        // 自动评分 {CORR:2, STYLE:1, TEST:3}，评审员将 STYLE 改为 2
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        let edited = s.revise_final("STYLE", 2, None, &r).unwrap();
        assert!(edited);
        s.complete(&r, Utc::now()).unwrap();

        assert_eq!(s.edit_count, 1);
        assert!((s.ai_acceptance_rate.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.total_score, Some(7.0));
        assert!((s.percentage.unwrap() - 7.0 / 9.0 * 100.0).abs() < 1e-9);
        assert_eq!(s.status, GradingStatus::Completed);
        assert!(s.time_completed.is_some());
    }

    #[test]
    fn test_untouched_session_completes_with_full_acceptance() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        s.complete(&r, Utc::now()).unwrap();

        assert_eq!(s.edit_count, 0);
        assert_eq!(s.ai_acceptance_rate, Some(1.0));
        assert_eq!(s.total_score, Some(6.0));
    }

    #[test]
    fn test_revise_same_value_does_not_count_as_edit() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        let edited = s.revise_final("CORR", 2, None, &r).unwrap();
        assert!(!edited);
        assert_eq!(s.edit_count, 0);
    }

    #[test]
    fn test_edit_count_tracks_each_material_transition() {
        // 改掉再改回，相对上一次呈现值都是实质性变更
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        assert!(s.revise_final("STYLE", 3, None, &r).unwrap());
        assert!(s.revise_final("STYLE", 1, None, &r).unwrap());
        assert_eq!(s.edit_count, 2);
    }

    #[test]
    fn test_two_revisions_on_distinct_criteria() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        s.revise_final("CORR", 1, None, &r).unwrap();
        s.revise_final("STYLE", 2, None, &r).unwrap();
        assert_eq!(s.edit_count, 2);
        s.complete(&r, Utc::now()).unwrap();
        assert!((s.ai_acceptance_rate.unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_rubric_blocks_completion() {
        // TEST 条目既无 AI 分数也无最终分数
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1)]), &r)
            .unwrap();
        let err = s.complete(&r, Utc::now()).unwrap_err();
        assert_eq!(err.code(), "E007");
        assert!(err.message().contains("TEST"));
        assert_eq!(s.status, GradingStatus::Draft);

        s.revise_final("TEST", 3, None, &r).unwrap();
        s.complete(&r, Utc::now()).unwrap();
        assert_eq!(s.status, GradingStatus::Completed);
    }

    #[test]
    fn test_acceptance_rate_always_in_unit_interval() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        s.revise_final("CORR", 0, None, &r).unwrap();
        s.revise_final("STYLE", 0, None, &r).unwrap();
        s.revise_final("TEST", 0, None, &r).unwrap();
        s.complete(&r, Utc::now()).unwrap();
        let rate = s.ai_acceptance_rate.unwrap();
        assert!((0.0..=1.0).contains(&rate));
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_legal_transition_edges_only() {
        let r = rubric();

        // draft → completed
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        s.complete(&r, Utc::now()).unwrap();

        // completed → flagged → draft
        s.flag().unwrap();
        assert_eq!(s.status, GradingStatus::Flagged);
        s.reopen().unwrap();
        assert_eq!(s.status, GradingStatus::Draft);

        // draft → flagged
        s.flag().unwrap();
        // flagged → flagged 非法
        assert!(s.flag().is_err());
        // flagged 状态下不允许 complete / revise
        assert_eq!(s.complete(&r, Utc::now()).unwrap_err().code(), "E006");
        assert_eq!(
            s.revise_final("CORR", 1, None, &r).unwrap_err().code(),
            "E006"
        );

        // completed 状态下不允许再次 complete
        let mut done = session();
        done.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        done.complete(&r, Utc::now()).unwrap();
        assert!(done.complete(&r, Utc::now()).is_err());
        // draft 以外不允许 reopen
        assert!(done.reopen().is_err());
    }

    #[test]
    fn test_reopen_preserves_final_values() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        s.revise_final("STYLE", 2, None, &r).unwrap();
        s.complete(&r, Utc::now()).unwrap();
        s.flag().unwrap();
        s.reopen().unwrap();

        assert_eq!(
            s.final_result.get("STYLE").and_then(|c| c.score),
            Some(2)
        );
        assert_eq!(s.edit_count, 1);
        assert!(s.time_completed.is_none());
    }

    #[test]
    fn test_apply_automated_rejects_unknown_criterion() {
        let r = rubric();
        let mut s = session();
        let err = s
            .apply_automated(automated(&[("BOGUS", 2)]), &r)
            .unwrap_err();
        assert_eq!(err.code(), "E014");
    }

    #[test]
    fn test_apply_automated_only_in_draft() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        s.complete(&r, Utc::now()).unwrap();
        let err = s
            .apply_automated(automated(&[("CORR", 1)]), &r)
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[test]
    fn test_score_outside_scale_rejected() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2)]), &r).unwrap();
        assert!(s.revise_final("CORR", 4, None, &r).is_err());
        assert!(s.revise_final("CORR", -1, None, &r).is_err());
    }

    #[test]
    fn test_append_feedback_concatenates() {
        let r = rubric();
        let mut s = session();
        s.apply_automated(automated(&[("CORR", 2)]), &r).unwrap();
        s.append_feedback("CORR", "See style guide §3.", &r).unwrap();
        let feedback = s.final_result.get("CORR").unwrap().feedback.clone().unwrap();
        assert!(feedback.contains("AI feedback for CORR"));
        assert!(feedback.contains("See style guide §3."));
        // 追加反馈保留了 AI 分数，完成时仍视为接受
        s.complete(&rubric_single(), Utc::now()).unwrap();
        assert_eq!(s.ai_acceptance_rate, Some(1.0));
    }

    fn rubric_single() -> Rubric {
        Rubric::parse(&json!({"criteria": [{"id": "CORR"}]})).unwrap()
    }

    #[test]
    fn test_grading_duration_derived_from_timestamps() {
        let r = rubric();
        let mut s = session();
        s.time_started = Utc::now() - Duration::seconds(90);
        s.apply_automated(automated(&[("CORR", 2), ("STYLE", 1), ("TEST", 3)]), &r)
            .unwrap();
        let now = Utc::now();
        s.complete(&r, now).unwrap();
        let duration = s.grading_duration_seconds.unwrap();
        assert!((89..=91).contains(&duration));
    }
}
