use super::SeaOrmStorage;
use crate::entity::knowledge_base::{ActiveModel, Column, Entity as KnowledgeBase};
use crate::errors::{GraderError, Result};
use crate::models::{
    PaginationInfo,
    audit::entities::NewAuditEntry,
    knowledge::{
        entities::{KnowledgeBaseEntry, blend_effectiveness},
        requests::{CreateKnowledgeRequest, KnowledgeSearchQuery},
        responses::KnowledgeListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建知识库条目，插入与审计同事务
    pub async fn create_knowledge_entry_impl(
        &self,
        created_by: i64,
        req: CreateKnowledgeRequest,
        audit: NewAuditEntry,
    ) -> Result<KnowledgeBaseEntry> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            category: Set(req.category.to_string()),
            topic: Set(req.topic),
            content: Set(req.content),
            usage_count: Set(0),
            effectiveness_rating: Set(None),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            last_used: Set(None),
            is_active: Set(true),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("创建知识库条目失败: {e}")))?;

        let audit = audit.resource(crate::storage::resource::KNOWLEDGE_ENTRY, inserted.id);
        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(inserted.into_entry())
    }

    /// 通过 ID 获取条目
    pub async fn get_knowledge_entry_impl(&self, id: i64) -> Result<Option<KnowledgeBaseEntry>> {
        let result = KnowledgeBase::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询知识库条目失败: {e}")))?;

        Ok(result.map(|m| m.into_entry()))
    }

    /// 检索条目：按使用次数、效果评分降序
    pub async fn search_knowledge_impl(
        &self,
        query: KnowledgeSearchQuery,
    ) -> Result<KnowledgeListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = KnowledgeBase::find().filter(Column::IsActive.eq(true));

        if let Some(ref category) = query.category {
            select = select.filter(Column::Category.eq(category.to_string()));
        }

        if let Some(ref topic) = query.topic
            && !topic.trim().is_empty()
        {
            // SQLite 没有默认转义字符，LIKE 必须显式带 ESCAPE 子句
            let pattern = format!("%{}%", escape_like_pattern(topic.trim()));
            select = select.filter(Column::Topic.like(LikeExpr::new(pattern).escape('\\')));
        }

        select = select
            .order_by_desc(Column::UsageCount)
            .order_by_desc(Column::EffectivenessRating);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询条目总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询条目页数失败: {e}")))?;

        let entries = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询知识库失败: {e}")))?;

        Ok(KnowledgeListResponse {
            items: entries.into_iter().map(|m| m.into_entry()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 评分：事务内读-算-写，效果评分为 old*0.3 + new*0.7 的加权滑动均值
    pub async fn rate_knowledge_entry_impl(
        &self,
        id: i64,
        rating: f64,
        audit: NewAuditEntry,
    ) -> Result<Option<KnowledgeBaseEntry>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(entry) = KnowledgeBase::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询知识库条目失败: {e}")))?
        else {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        };

        let blended = blend_effectiveness(entry.effectiveness_rating, rating);

        KnowledgeBase::update_many()
            .col_expr(Column::EffectivenessRating, Expr::value(Some(blended)))
            .filter(Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("更新效果评分失败: {e}")))?;

        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_knowledge_entry_impl(id).await
    }
}
