/*!
 * 会话认证中间件
 *
 * 校验 Authorization 头中的不透明会话令牌，令牌直接对照存储层逐次验证，
 * 过期与被吊销都对外返回 401，但区别会写入审计明细。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App, HttpServer};
 * use crate::middlewares::require_session::RequireSession;
 *
 * HttpServer::new(|| {
 *     App::new()
 *         .service(
 *             web::scope("/api")
 *                 .wrap(RequireSession)
 *                 .route("/protected", web::get().to(protected_handler))
 *         )
 * })
 * ```
 *
 * 处理程序中通过 `RequireSession::extract_user(&req)` 取当前用户，
 * 通过 `RequireSession::audit_context(&req)` 取审计上下文。
 */

use crate::models::users::entities::UserRole;
use crate::models::{
    ApiResponse, ErrorCode,
    audit::entities::{AuditAction, AuditContext, NewAuditEntry},
    auth::entities::{Session, SessionState},
    users::entities,
};
use crate::storage::Storage;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireSession;

fn unauthorized(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::build(StatusCode::UNAUTHORIZED)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()>::error_empty(code, message))
}

fn client_context(req: &ServiceRequest) -> (Option<String>, Option<String>) {
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());
    let ua = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    (ip, ua)
}

// 辅助函数：提取并验证会话令牌
async fn extract_and_validate_session(
    req: &ServiceRequest,
) -> Result<(entities::User, Session), (ErrorCode, String)> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            (
                ErrorCode::Unauthorized,
                "Missing or invalid Authorization header".to_string(),
            )
        })?;

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| {
            (
                ErrorCode::InternalServerError,
                "Storage not found in app data".to_string(),
            )
        })?
        .get_ref()
        .clone();

    let session = storage
        .get_session(token)
        .await
        .map_err(|_| {
            (
                ErrorCode::InternalServerError,
                "Failed to query session".to_string(),
            )
        })?
        .ok_or_else(|| (ErrorCode::Unauthorized, "Unknown session token".to_string()))?;

    let now = chrono::Utc::now();
    let rejection = match session.state_at(now) {
        SessionState::Usable => None,
        SessionState::Expired => Some((ErrorCode::SessionExpired, "expired")),
        SessionState::Revoked => Some((ErrorCode::SessionRevoked, "revoked")),
    };

    if let Some((code, reason)) = rejection {
        // 401 对外不区分，区别进审计明细
        let (ip, ua) = client_context(req);
        let entry = NewAuditEntry::new(
            AuditContext {
                user_id: Some(session.user_id),
                session_id: Some(session.id.clone()),
                ip_address: ip,
                user_agent: ua,
            },
            AuditAction::SessionRejected,
        )
        .details(serde_json::json!({ "reason": reason }));
        if let Err(e) = storage.record_audit(entry).await {
            info!("Failed to record session rejection audit: {}", e);
        }
        return Err((code, "Session is no longer valid".to_string()));
    }

    let user = storage
        .get_user_by_id(session.user_id)
        .await
        .map_err(|_| {
            (
                ErrorCode::InternalServerError,
                "Failed to retrieve user from storage".to_string(),
            )
        })?
        .ok_or_else(|| (ErrorCode::Unauthorized, "User not found".to_string()))?;

    if !user.is_active {
        return Err((ErrorCode::Unauthorized, "User is not active".to_string()));
    }

    Ok((user, session))
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    HttpResponse::NoContent().finish().map_into_right_body(),
                ));
            }

            match extract_and_validate_session(&req).await {
                Ok((user, session)) => {
                    debug!("Session authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    req.extensions_mut().insert(session);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err((code, err)) => {
                    info!(
                        "Session authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        unauthorized(code, &format!("Unauthorized: {err}")).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取会话信息
impl RequireSession {
    /// 从请求扩展中提取当前用户
    pub fn extract_user(req: &actix_web::HttpRequest) -> Option<entities::User> {
        req.extensions().get::<entities::User>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<entities::User>().map(|user| user.id)
    }

    /// 从请求扩展中提取用户角色
    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<UserRole> {
        req.extensions()
            .get::<entities::User>()
            .map(|user| user.role.clone())
    }

    /// 从请求扩展中提取会话
    pub fn extract_session(req: &actix_web::HttpRequest) -> Option<Session> {
        req.extensions().get::<Session>().cloned()
    }

    /// 组装审计上下文：当前用户、会话与客户端来源
    pub fn audit_context(req: &actix_web::HttpRequest) -> AuditContext {
        AuditContext {
            user_id: Self::extract_user_id(req),
            session_id: Self::extract_session(req).map(|s| s.id),
            ip_address: req
                .connection_info()
                .realip_remote_addr()
                .map(|s| s.to_string()),
            user_agent: req
                .headers()
                .get(actix_web::http::header::USER_AGENT)
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string()),
        }
    }
}
