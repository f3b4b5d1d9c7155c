//! 作业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub course_code: String,
    #[sea_orm(column_type = "Text")]
    pub prompt: String,
    #[sea_orm(column_type = "Text")]
    pub rubric_json: String,
    pub created_by: i64,
    pub created_at: i64,
    pub due_date: Option<i64>,
    pub is_active: bool,
    pub assignment_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub learning_objectives: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::grading_sessions::Entity")]
    GradingSessions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::grading_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradingSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 评分标准在入库前已校验过，这里解析失败视为存储损坏
    pub fn into_assignment(
        self,
    ) -> crate::errors::Result<crate::models::assignments::entities::Assignment> {
        use crate::models::assignments::entities::{Assignment, Rubric};
        use chrono::{DateTime, Utc};

        let rubric_value: serde_json::Value = serde_json::from_str(&self.rubric_json)?;
        let rubric = Rubric::parse(&rubric_value)?;

        Ok(Assignment {
            id: self.id,
            name: self.name,
            course_code: self.course_code,
            prompt: self.prompt,
            rubric,
            created_by: self.created_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            due_date: self
                .due_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            is_active: self.is_active,
            assignment_type: self.assignment_type,
            learning_objectives: self
                .learning_objectives
                .as_deref()
                .map(|raw| serde_json::from_str(raw).unwrap_or_default())
                .unwrap_or_default(),
        })
    }
}
