use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{GraderError, Result};
use crate::models::{
    PaginationInfo,
    audit::entities::NewAuditEntry,
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, ExprTrait as _, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建用户（password 字段须已是 Argon2 哈希）
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            department: Set(req.department),
            courses: Set(serde_json::to_string(&req.courses)?),
            is_active: Set(true),
            created_at: Set(now.timestamp()),
            api_usage_count: Set(0),
            api_usage_reset_date: Set(now.date_naive().to_string()),
            ..Default::default()
        };

        // 唯一约束冲突由 From<DbErr> 翻译为 DuplicateIdentity
        let result = model.insert(&self.db).await?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = std::cmp::Ord::max(query.page.unwrap_or(1), 1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            // SQLite 没有默认转义字符，LIKE 必须显式带 ESCAPE 子句
            let pattern = format!("%{}%", escape_like_pattern(search.trim()));
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(LikeExpr::new(&pattern).escape('\\')))
                    .add(Column::Email.like(LikeExpr::new(&pattern).escape('\\'))),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户页数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 软停用用户，吊销其全部会话，行更新与审计同事务提交
    pub async fn deactivate_user_impl(&self, id: i64, audit: NewAuditEntry) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let result = Users::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("停用用户失败: {e}")))?;

        if result.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(false);
        }

        use crate::entity::user_sessions::{
            Column as SessionColumn, Entity as UserSessions,
        };
        UserSessions::update_many()
            .col_expr(SessionColumn::IsActive, Expr::value(false))
            .filter(SessionColumn::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("吊销用户会话失败: {e}")))?;

        super::audit_log::insert_audit(&txn, audit).await?;

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| GraderError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }

    /// 配额消耗
    ///
    /// 同一事务内先做惰性按日清零，再以条件自增实现检查与递增的原子性：
    /// 只有递增 amount 后仍不超上限时 UPDATE 才命中，并发请求不会双双通过。
    pub async fn consume_quota_impl(
        &self,
        user_id: i64,
        today: NaiveDate,
        amount: i64,
        daily_limit: i64,
    ) -> Result<i64> {
        if amount < 1 {
            return Err(GraderError::validation(format!(
                "配额消耗量必须为正数: {amount}"
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GraderError::database_operation(format!("开启事务失败: {e}")))?;

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户失败: {e}")))?
            .ok_or_else(|| GraderError::not_found(format!("用户不存在: {user_id}")))?;

        let today_str = today.to_string();

        // 跨日清零
        let stored_date = user
            .api_usage_reset_date
            .parse::<NaiveDate>()
            .unwrap_or(today);
        if stored_date < today {
            Users::update_many()
                .col_expr(Column::ApiUsageCount, Expr::value(0))
                .col_expr(Column::ApiUsageResetDate, Expr::value(today_str.clone()))
                .filter(Column::Id.eq(user_id))
                .exec(&txn)
                .await
                .map_err(|e| {
                    GraderError::database_operation(format!("配额清零失败: {e}"))
                })?;
        }

        // 条件自增：递增后将超上限时不命中任何行
        let update = Users::update_many()
            .col_expr(
                Column::ApiUsageCount,
                Expr::col(Column::ApiUsageCount).add(amount),
            )
            .filter(Column::Id.eq(user_id))
            .filter(Column::ApiUsageCount.lte(daily_limit - amount))
            .exec(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("配额递增失败: {e}")))?;

        if update.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| GraderError::database_operation(format!("回滚事务失败: {e}")))?;
            return Err(GraderError::quota_exceeded(format!(
                "今日配额 {daily_limit} 已用尽"
            )));
        }

        let new_count = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| GraderError::database_operation(format!("查询用户失败: {e}")))?
            .map(|m| m.api_usage_count)
            .unwrap_or_default();

        txn.commit()
            .await
            .map_err(|e| GraderError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(new_count)
    }
}
