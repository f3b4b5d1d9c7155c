use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{GraderError, Result};

/// 评分量表：有界整数刻度加每档描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScale {
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Default for RubricScale {
    fn default() -> Self {
        // 缺省为 0-3 四档
        let mut labels = BTreeMap::new();
        labels.insert("0".to_string(), "Does not meet".to_string());
        labels.insert("1".to_string(), "Approaching".to_string());
        labels.insert("2".to_string(), "Meets".to_string());
        labels.insert("3".to_string(), "Exceeds".to_string());
        Self {
            min: 0,
            max: 3,
            labels,
        }
    }
}

/// 评分标准中的单个条目，以稳定 id 标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// 档位描述，允许缺档
    #[serde(default)]
    pub levels: BTreeMap<String, String>,
}

/// 评分标准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub name: String,
    pub version: String,
    pub scale: RubricScale,
    pub criteria: Vec<RubricCriterion>,
}

impl Rubric {
    /// 从 JSON 解析并规范化评分标准
    ///
    /// 宽松解析：name/version/scale 缺省补默认值，criterion 的 id 缺省取
    /// code 或位置序号，levels 允许部分缺失。criteria 为空视为非法。
    pub fn parse(value: &serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| GraderError::validation("评分标准必须是 JSON 对象"))?;

        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("Custom Rubric")
            .to_string();
        let version = obj
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("1.0")
            .to_string();

        let scale = match obj.get("scale") {
            Some(s) if !s.is_null() => serde_json::from_value(s.clone())
                .map_err(|e| GraderError::validation(format!("评分量表解析失败: {e}")))?,
            _ => RubricScale::default(),
        };

        let raw_criteria = obj
            .get("criteria")
            .and_then(|v| v.as_array())
            .ok_or_else(|| GraderError::validation("评分标准必须包含非空的 criteria 列表"))?;
        if raw_criteria.is_empty() {
            return Err(GraderError::validation(
                "评分标准必须包含非空的 criteria 列表",
            ));
        }

        let mut criteria = Vec::with_capacity(raw_criteria.len());
        for (idx, raw) in raw_criteria.iter().enumerate() {
            let c = raw
                .as_object()
                .ok_or_else(|| GraderError::validation(format!("criteria[{idx}] 不是对象")))?;
            let get_str =
                |key: &str| c.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

            let id = get_str("id")
                .or_else(|| get_str("code"))
                .unwrap_or_else(|| format!("C{}", idx + 1));
            let code = get_str("code").unwrap_or_else(|| id.clone());
            let title = get_str("title").unwrap_or_else(|| format!("Criterion {}", idx + 1));
            let category = get_str("category").unwrap_or_default();
            let description = get_str("description").unwrap_or_default();

            let levels = match c.get("levels").and_then(|v| v.as_object()) {
                Some(map) => map
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect(),
                None => RubricScale::default().labels,
            };

            criteria.push(RubricCriterion {
                id,
                code,
                title,
                category,
                description,
                levels,
            });
        }

        // criterion id 必须唯一，评分载荷以它为键
        let mut seen = BTreeSet::new();
        for c in &criteria {
            if !seen.insert(c.id.clone()) {
                return Err(GraderError::validation(format!(
                    "评分标准包含重复的 criterion id: {}",
                    c.id
                )));
            }
        }

        Ok(Self {
            name,
            version,
            scale,
            criteria,
        })
    }

    /// 全部 criterion id 集合
    pub fn criterion_ids(&self) -> BTreeSet<String> {
        self.criteria.iter().map(|c| c.id.clone()).collect()
    }

    pub fn contains_criterion(&self, id: &str) -> bool {
        self.criteria.iter().any(|c| c.id == id)
    }

    /// 满分 = 条目数 × 刻度上限
    pub fn max_total(&self) -> i64 {
        self.criteria.len() as i64 * self.scale.max
    }
}

/// 评分单元：一次作业及其评分标准
///
/// 一旦有评分会话引用，只允许所有者做管理性修改（目前仅停用）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    pub course_code: String,
    pub prompt: String,
    pub rubric: Rubric,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
    pub assignment_type: Option<String>,
    pub learning_objectives: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_rubric() {
        let rubric = Rubric::parse(&json!({
            "name": "Intro to Programming - Assignment 1",
            "version": "1.0",
            "scale": {"min": 0, "max": 3, "labels": {"0": "Does not meet", "3": "Exceeds"}},
            "criteria": [
                {"id": "CORR", "code": "CORR", "title": "Correctness",
                 "category": "Program Quality",
                 "description": "Program produces correct outputs.",
                 "levels": {"0": "Fails most tests", "3": "Passes all tests"}}
            ]
        }))
        .unwrap();

        assert_eq!(rubric.criteria.len(), 1);
        assert_eq!(rubric.criteria[0].id, "CORR");
        assert_eq!(rubric.scale.max, 3);
        assert_eq!(rubric.max_total(), 3);
    }

    #[test]
    fn test_parse_defaults() {
        // scale 缺省 0-3；id 从 code 回退；levels 缺省补全
        let rubric = Rubric::parse(&json!({
            "criteria": [
                {"code": "STYLE", "title": "Style"},
                {"title": "Tests"}
            ]
        }))
        .unwrap();

        assert_eq!(rubric.name, "Custom Rubric");
        assert_eq!(rubric.scale.min, 0);
        assert_eq!(rubric.scale.max, 3);
        assert_eq!(rubric.criteria[0].id, "STYLE");
        assert_eq!(rubric.criteria[1].id, "C2");
        assert!(!rubric.criteria[1].levels.is_empty());
    }

    #[test]
    fn test_partial_levels_accepted() {
        let rubric = Rubric::parse(&json!({
            "criteria": [
                {"id": "CORR", "levels": {"2": "Meets"}}
            ]
        }))
        .unwrap();
        assert_eq!(rubric.criteria[0].levels.len(), 1);
    }

    #[test]
    fn test_empty_criteria_rejected() {
        assert!(Rubric::parse(&json!({"criteria": []})).is_err());
        assert!(Rubric::parse(&json!({})).is_err());
    }

    #[test]
    fn test_duplicate_criterion_id_rejected() {
        let result = Rubric::parse(&json!({
            "criteria": [{"id": "CORR"}, {"id": "CORR"}]
        }));
        assert!(result.is_err());
    }
}
