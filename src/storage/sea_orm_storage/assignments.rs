use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{GraderError, Result};
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::{Assignment, Rubric},
        requests::{AssignmentListQuery, CreateAssignmentRequest},
        responses::AssignmentListResponse,
    },
    audit::entities::NewAuditEntry,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业，评分标准先规范化再入库
    pub async fn create_assignment_impl(
        &self,
        created_by: i64,
        req: CreateAssignmentRequest,
        audit: NewAuditEntry,
    ) -> Result<Assignment> {
        let rubric = Rubric::parse(&req.rubric)?;
        let rubric_json = serde_json::to_string(&rubric)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            name: Set(req.name),
            course_code: Set(req.course_code),
            prompt: Set(req.prompt),
            rubric_json: Set(rubric_json),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            is_active: Set(true),
            assignment_type: Set(req.assignment_type),
            learning_objectives: Set(Some(serde_json::to_string(&req.learning_objectives)?)),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("创建作业失败: {e}")))?;

        let audit = audit.resource(crate::storage::resource::ASSIGNMENT, inserted.id);
        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        inserted.into_assignment()
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询作业失败: {e}")))?;

        result.map(|m| m.into_assignment()).transpose()
    }

    /// 分页列出作业，始终限定所有者
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Assignments::find().filter(Column::CreatedBy.eq(query.created_by));

        if let Some(ref course_code) = query.course_code {
            select = select.filter(Column::CourseCode.eq(course_code.as_str()));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询作业总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询作业页数失败: {e}")))?;

        let models = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询作业列表失败: {e}")))?;

        let items = models
            .into_iter()
            .map(|m| m.into_assignment())
            .collect::<Result<Vec<_>>>()?;

        Ok(AssignmentListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 停用作业，与审计同事务
    pub async fn deactivate_assignment_impl(
        &self,
        id: i64,
        audit: NewAuditEntry,
    ) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let result = Assignments::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("停用作业失败: {e}")))?;

        if result.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        }

        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }
}
