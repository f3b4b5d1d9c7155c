use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Department).string().not_null())
                    .col(ColumnDef::new(Users::Courses).text().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(
                        ColumnDef::new(Users::ApiUsageCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::ApiUsageResetDate)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建用户会话表（不透明令牌作为主键）
        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSessions::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserSessions::IpAddress).string().null())
                    .col(ColumnDef::new(UserSessions::UserAgent).string().null())
                    .col(
                        ColumnDef::new(UserSessions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserSessions::Table, UserSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作业表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::Name).string().not_null())
                    .col(ColumnDef::new(Assignments::CourseCode).string().not_null())
                    .col(ColumnDef::new(Assignments::Prompt).text().not_null())
                    .col(ColumnDef::new(Assignments::RubricJson).text().not_null())
                    .col(
                        ColumnDef::new(Assignments::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::DueDate).big_integer().null())
                    .col(
                        ColumnDef::new(Assignments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Assignments::AssignmentType).string().null())
                    .col(
                        ColumnDef::new(Assignments::LearningObjectives)
                            .text()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分会话表
        manager
            .create_table(
                Table::create()
                    .table(GradingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradingSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::GraderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::StudentIdentifierHash)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::StudentCode)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::CodeMetricsJson)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::AiScoresJson)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::AiFeedbackJson)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::FinalScoresJson)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::FinalFeedbackJson)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingSessions::TotalScore).double().null())
                    .col(ColumnDef::new(GradingSessions::Percentage).double().null())
                    .col(ColumnDef::new(GradingSessions::Status).string().not_null())
                    .col(
                        ColumnDef::new(GradingSessions::TimeStarted)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::TimeCompleted)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::GradingDurationSeconds)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::EditCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::AiAcceptanceRate)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::ResearchConsent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GradingSessions::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingSessions::Table, GradingSessions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingSessions::Table, GradingSessions::GraderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建知识库表
        manager
            .create_table(
                Table::create()
                    .table(KnowledgeBase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KnowledgeBase::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(KnowledgeBase::Category).string().not_null())
                    .col(ColumnDef::new(KnowledgeBase::Topic).string().not_null())
                    .col(ColumnDef::new(KnowledgeBase::Content).text().not_null())
                    .col(
                        ColumnDef::new(KnowledgeBase::UsageCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(KnowledgeBase::EffectivenessRating)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(KnowledgeBase::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KnowledgeBase::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(KnowledgeBase::LastUsed).big_integer().null())
                    .col(
                        ColumnDef::new(KnowledgeBase::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(KnowledgeBase::Table, KnowledgeBase::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建审计日志表（只追加，不更新不删除）
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLog::UserId).big_integer().null())
                    .col(ColumnDef::new(AuditLog::SessionId).string().null())
                    .col(ColumnDef::new(AuditLog::Action).string().not_null())
                    .col(ColumnDef::new(AuditLog::ResourceType).string().null())
                    .col(ColumnDef::new(AuditLog::ResourceId).string().null())
                    .col(ColumnDef::new(AuditLog::DetailsJson).text().null())
                    .col(ColumnDef::new(AuditLog::IpAddress).string().null())
                    .col(ColumnDef::new(AuditLog::UserAgent).string().null())
                    .col(ColumnDef::new(AuditLog::Timestamp).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建用户反馈表
        manager
            .create_table(
                Table::create()
                    .table(UserFeedback::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserFeedback::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserFeedback::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserFeedback::FeedbackType).string().not_null())
                    .col(ColumnDef::new(UserFeedback::FeedbackJson).text().not_null())
                    .col(
                        ColumnDef::new(UserFeedback::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建研究指标表（可由审计日志和评分会话重新推导的物化视图）
        manager
            .create_table(
                Table::create()
                    .table(ResearchMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResearchMetrics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResearchMetrics::MetricType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResearchMetrics::MetricValue)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResearchMetrics::ContextJson).text().null())
                    .col(
                        ColumnDef::new(ResearchMetrics::ComputedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResearchMetrics::PeriodStart)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResearchMetrics::PeriodEnd)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 查询索引
        manager
            .create_index(
                Index::create()
                    .name("idx_user_sessions_user_id")
                    .table(UserSessions::Table)
                    .col(UserSessions::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_sessions_expires_at")
                    .table(UserSessions::Table)
                    .col(UserSessions::ExpiresAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_grading_sessions_assignment_id")
                    .table(GradingSessions::Table)
                    .col(GradingSessions::AssignmentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_grading_sessions_grader_id")
                    .table(GradingSessions::Table)
                    .col(GradingSessions::GraderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_grading_sessions_student_hash")
                    .table(GradingSessions::Table)
                    .col(GradingSessions::StudentIdentifierHash)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_log_user_id")
                    .table(AuditLog::Table)
                    .col(AuditLog::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_log_timestamp")
                    .table(AuditLog::Table)
                    .col(AuditLog::Timestamp)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_knowledge_base_category_topic")
                    .table(KnowledgeBase::Table)
                    .col(KnowledgeBase::Category)
                    .col(KnowledgeBase::Topic)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResearchMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserFeedback::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KnowledgeBase::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradingSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Department,
    Courses,
    IsActive,
    LastLogin,
    CreatedAt,
    ApiUsageCount,
    ApiUsageResetDate,
}

#[derive(DeriveIden)]
enum UserSessions {
    Table,
    Id,
    UserId,
    CreatedAt,
    ExpiresAt,
    IpAddress,
    UserAgent,
    IsActive,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
    Name,
    CourseCode,
    Prompt,
    RubricJson,
    CreatedBy,
    CreatedAt,
    DueDate,
    IsActive,
    AssignmentType,
    LearningObjectives,
}

#[derive(DeriveIden)]
enum GradingSessions {
    Table,
    Id,
    AssignmentId,
    GraderId,
    StudentIdentifierHash,
    StudentCode,
    CodeMetricsJson,
    AiScoresJson,
    AiFeedbackJson,
    FinalScoresJson,
    FinalFeedbackJson,
    TotalScore,
    Percentage,
    Status,
    TimeStarted,
    TimeCompleted,
    GradingDurationSeconds,
    EditCount,
    AiAcceptanceRate,
    ResearchConsent,
    Version,
}

#[derive(DeriveIden)]
enum KnowledgeBase {
    Table,
    Id,
    Category,
    Topic,
    Content,
    UsageCount,
    EffectivenessRating,
    CreatedBy,
    CreatedAt,
    LastUsed,
    IsActive,
}

#[derive(DeriveIden)]
enum AuditLog {
    Table,
    Id,
    UserId,
    SessionId,
    Action,
    ResourceType,
    ResourceId,
    DetailsJson,
    IpAddress,
    UserAgent,
    Timestamp,
}

#[derive(DeriveIden)]
enum UserFeedback {
    Table,
    Id,
    UserId,
    FeedbackType,
    FeedbackJson,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ResearchMetrics {
    Table,
    Id,
    MetricType,
    MetricValue,
    ContextJson,
    ComputedAt,
    PeriodStart,
    PeriodEnd,
}
