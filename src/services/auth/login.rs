use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, AuditContext, NewAuditEntry},
    auth::{LoginRequest, LoginResponse, entities::Session},
};
use crate::utils::password::verify_password;
use crate::utils::token::generate_session_token;

use super::AuthService;

fn login_audit_context(request: &HttpRequest) -> AuditContext {
    AuditContext {
        user_id: None,
        session_id: None,
        ip_address: request
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string()),
        user_agent: request
            .headers()
            .get(actix_web::http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string()),
    }
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 根据用户名或邮箱获取用户信息
    let user = match storage
        .get_user_by_username_or_email(&login_request.username)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(reject_login(&storage, request, &login_request.username).await);
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Login failed: {e}"),
                )),
            );
        }
    };

    // 2. 验证密码，拒绝停用账户
    if !user.is_active || !verify_password(&login_request.password, &user.password_hash) {
        return Ok(reject_login(&storage, request, &login_request.username).await);
    }

    // 3. 更新最后登录时间
    let _ = storage.update_last_login(user.id).await;

    // 4. 创建不透明会话
    let ttl_hours = if login_request.remember_me {
        config.session.remember_me_ttl_hours
    } else {
        config.session.ttl_hours
    };
    let now = chrono::Utc::now();
    let mut context = login_audit_context(request);
    context.user_id = Some(user.id);

    let session = Session {
        id: generate_session_token(),
        user_id: user.id,
        created_at: now,
        expires_at: now + chrono::Duration::hours(ttl_hours),
        ip_address: context.ip_address.clone(),
        user_agent: context.user_agent.clone(),
        is_active: true,
    };

    let session = match storage.create_session(session).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to create session",
                )),
            );
        }
    };

    context.session_id = Some(session.id.clone());
    let audit = NewAuditEntry::new(context, AuditAction::LoginSuccess)
        .resource(crate::storage::resource::USER, user.id);
    if let Err(e) = storage.record_audit(audit).await {
        tracing::warn!("Failed to record login audit: {}", e);
    }

    tracing::info!("User {} logged in successfully", user.username);

    let response = LoginResponse {
        session_token: session.id,
        expires_at: session.expires_at,
        user,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
}

// 失败路径统一：同样的 401 文案，不泄露账户是否存在
async fn reject_login(
    storage: &std::sync::Arc<dyn crate::storage::Storage>,
    request: &HttpRequest,
    identifier: &str,
) -> HttpResponse {
    let audit = NewAuditEntry::new(login_audit_context(request), AuditAction::LoginFailed)
        .details(serde_json::json!({ "identifier": identifier }));
    if let Err(e) = storage.record_audit(audit).await {
        tracing::warn!("Failed to record failed login audit: {}", e);
    }

    HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}
