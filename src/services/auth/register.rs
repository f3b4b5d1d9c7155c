use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::GraderError;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, AuditContext, NewAuditEntry},
    users::requests::CreateUserRequest,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_username};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    mut create_request: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 验证用户名合法性
    if let Err(msg) = validate_username(&create_request.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&create_request.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    // 验证密码策略
    if let Err(msg) = validate_password_simple(&create_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordInvalid, msg)));
    }

    // 哈希密码
    match hash_password(&create_request.password) {
        Ok(password_hash) => {
            create_request.password = password_hash;

            // 创建用户；用户名/邮箱冲突由存储层翻译为 DuplicateIdentity
            match storage.create_user(create_request).await {
                Ok(user) => {
                    let audit = NewAuditEntry::new(
                        AuditContext {
                            user_id: Some(user.id),
                            session_id: None,
                            ip_address: request
                                .connection_info()
                                .realip_remote_addr()
                                .map(|s| s.to_string()),
                            user_agent: None,
                        },
                        AuditAction::UserCreated,
                    )
                    .resource(crate::storage::resource::USER, user.id);
                    if let Err(e) = storage.record_audit(audit).await {
                        tracing::warn!("Failed to record registration audit: {}", e);
                    }

                    Ok(HttpResponse::Created().json(ApiResponse::success(user, "注册成功")))
                }
                Err(GraderError::DuplicateIdentity(msg)) => Ok(HttpResponse::Conflict()
                    .json(ApiResponse::error_empty(ErrorCode::UserAlreadyExists, msg))),
                Err(e) => Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::RegisterFailed,
                        format!("注册失败: {e}"),
                    )),
                ),
            }
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::RegisterFailed,
                format!("密码哈希失败: {e}"),
            )),
        ),
    }
}
