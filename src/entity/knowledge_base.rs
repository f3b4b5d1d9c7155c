//! 知识库实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "knowledge_base")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub category: String,
    pub topic: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub usage_count: i64,
    pub effectiveness_rating: Option<f64>,
    pub created_by: i64,
    pub created_at: i64,
    pub last_used: Option<i64>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_entry(self) -> crate::models::knowledge::entities::KnowledgeBaseEntry {
        use crate::models::knowledge::entities::{KnowledgeBaseEntry, KnowledgeCategory};
        use chrono::{DateTime, Utc};

        KnowledgeBaseEntry {
            id: self.id,
            category: self
                .category
                .parse::<KnowledgeCategory>()
                .unwrap_or(KnowledgeCategory::FeedbackTemplate),
            topic: self.topic,
            content: self.content,
            usage_count: self.usage_count,
            effectiveness_rating: self.effectiveness_rating,
            created_by: self.created_by,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            last_used: self
                .last_used
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            is_active: self.is_active,
        }
    }
}
