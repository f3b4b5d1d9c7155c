use serde::{Deserialize, Serialize};

// 知识库条目类别
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    FeedbackTemplate,
    CommonIssue,
    ImprovementSuggestion,
}

impl std::fmt::Display for KnowledgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeCategory::FeedbackTemplate => write!(f, "feedback_template"),
            KnowledgeCategory::CommonIssue => write!(f, "common_issue"),
            KnowledgeCategory::ImprovementSuggestion => write!(f, "improvement_suggestion"),
        }
    }
}

impl std::str::FromStr for KnowledgeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feedback_template" => Ok(KnowledgeCategory::FeedbackTemplate),
            "common_issue" => Ok(KnowledgeCategory::CommonIssue),
            "improvement_suggestion" => Ok(KnowledgeCategory::ImprovementSuggestion),
            _ => Err(format!("Invalid knowledge category: {s}")),
        }
    }
}

/// 可复用的反馈内容单元
///
/// usage_count 在每次插入评分会话反馈时 +1；
/// effectiveness_rating 按加权滑动平均吸收评审员评分（旧值 0.3，新值 0.7）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseEntry {
    pub id: i64,
    pub category: KnowledgeCategory,
    pub topic: String,
    pub content: String,
    pub usage_count: i64,
    pub effectiveness_rating: Option<f64>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_used: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
}

/// 加权滑动平均：旧值权重 0.3，新评分权重 0.7；首个评分直接采用
pub fn blend_effectiveness(current: Option<f64>, new_rating: f64) -> f64 {
    match current {
        Some(existing) => existing * 0.3 + new_rating * 0.7,
        None => new_rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rating_taken_verbatim() {
        assert_eq!(blend_effectiveness(None, 4.0), 4.0);
    }

    #[test]
    fn test_blend_weights() {
        let blended = blend_effectiveness(Some(2.0), 5.0);
        assert!((blended - (2.0 * 0.3 + 5.0 * 0.7)).abs() < 1e-9);
    }

    #[test]
    fn test_blend_stays_in_rating_range() {
        let mut rating = blend_effectiveness(None, 1.0);
        for _ in 0..10 {
            rating = blend_effectiveness(Some(rating), 5.0);
            assert!((1.0..=5.0).contains(&rating));
        }
        // 反复给满分后收敛到 5 附近
        assert!(rating > 4.9);
    }
}
