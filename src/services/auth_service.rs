use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    dto::auth::{
        AdminLoginResponse, LoginRequest, LoginResponse, RenewAccessRequest, RenewAccessResponse,
    },
    error::{AppError, AppResult},
    middleware::auth::STATUS_ACTIVE,
    models::{AdminUser, Permission, Role, User},
    password::check_password,
    state::AppState,
    store::{CreateSessionRow, ErrorKind, StoreError},
    token::TokenKind,
};

/// Request metadata recorded on each session.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub user_agent: String,
    pub client_ip: String,
}

impl ClientMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let forwarded = text("x-forwarded-for");
        let client_ip = forwarded
            .split(',')
            .next()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| text("x-real-ip"));
        Self {
            user_agent: text(header::USER_AGENT.as_str()),
            client_ip,
        }
    }
}

struct IssuedTokens {
    session_id: Uuid,
    access_token: String,
    access_token_expires_at: DateTime<Utc>,
    refresh_token: String,
    refresh_token_expires_at: DateTime<Utc>,
}

async fn issue_tokens(
    state: &AppState,
    account: &str,
    kind: TokenKind,
    meta: ClientMeta,
) -> AppResult<IssuedTokens> {
    let maker = &state.token_maker;
    let (access_token, access) =
        maker.create_token(account, kind, state.config.access_token_duration)?;
    let (refresh_token, refresh) =
        maker.create_token(account, kind, state.config.refresh_token_duration)?;

    let session = state
        .store
        .queries()
        .create_session(CreateSessionRow {
            id: refresh.sid,
            account: account.to_string(),
            is_admin: kind == TokenKind::Admin,
            refresh_token: refresh_token.clone(),
            user_agent: meta.user_agent,
            client_ip: meta.client_ip,
            expires_at: refresh.expires_at(),
        })
        .await?;

    Ok(IssuedTokens {
        session_id: session.id,
        access_token,
        access_token_expires_at: access.expires_at(),
        refresh_token,
        refresh_token_expires_at: refresh.expires_at(),
    })
}

fn not_found_as(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| match err.kind() {
        ErrorKind::NotFound => AppError::NotFound(message.into()),
        _ => AppError::from(err),
    }
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
    meta: ClientMeta,
) -> AppResult<LoginResponse> {
    let user = state
        .store
        .queries()
        .get_user_by_account(&payload.account)
        .await
        .map_err(not_found_as("user not found"))?;

    if user.status != STATUS_ACTIVE {
        return Err(AppError::Unauthorized("user is disabled".into()));
    }
    if !check_password(&payload.password, &user.hashed_password)? {
        return Err(AppError::Unauthorized("incorrect password".into()));
    }

    let tokens = issue_tokens(state, &user.account, TokenKind::User, meta).await?;
    tracing::info!(account = %user.account, "user logged in");

    Ok(LoginResponse {
        session_id: tokens.session_id,
        access_token: tokens.access_token,
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token: tokens.refresh_token,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
        user: User::from(user),
    })
}

pub async fn login_admin(
    state: &AppState,
    payload: LoginRequest,
    meta: ClientMeta,
) -> AppResult<AdminLoginResponse> {
    let admin_user = state
        .store
        .queries()
        .get_admin_user_by_account(&payload.account)
        .await
        .map_err(not_found_as("admin user not found"))?;

    if admin_user.status != STATUS_ACTIVE {
        return Err(AppError::Unauthorized("admin user is disabled".into()));
    }
    if !check_password(&payload.password, &admin_user.hashed_password)? {
        return Err(AppError::Unauthorized("incorrect password".into()));
    }

    let detail = state.store.get_admin_user_detail(admin_user.id).await?;
    let tokens = issue_tokens(state, &admin_user.account, TokenKind::Admin, meta).await?;
    tracing::info!(account = %admin_user.account, "admin user logged in");

    Ok(AdminLoginResponse {
        session_id: tokens.session_id,
        access_token: tokens.access_token,
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token: tokens.refresh_token,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
        admin_user: AdminUser::from(detail.admin_user),
        role_list: detail.roles.into_iter().map(Role::from).collect(),
        permission_list: detail.permissions.into_iter().map(Permission::from).collect(),
    })
}

pub async fn renew_access_token(
    state: &AppState,
    payload: RenewAccessRequest,
) -> AppResult<RenewAccessResponse> {
    let claims = state.token_maker.verify_token(&payload.refresh_token)?;

    let session = state
        .store
        .queries()
        .get_session(claims.sid)
        .await
        .map_err(not_found_as("session not found"))?;

    if session.is_blocked {
        return Err(AppError::Unauthorized("blocked session".into()));
    }
    if session.account != claims.sub || session.is_admin != (claims.kind == TokenKind::Admin) {
        return Err(AppError::Unauthorized("incorrect session user".into()));
    }
    if session.refresh_token != payload.refresh_token {
        return Err(AppError::Unauthorized("mismatched session token".into()));
    }
    if session.expires_at < Utc::now().fixed_offset() {
        return Err(AppError::Unauthorized("expired session".into()));
    }

    let (access_token, access) = state.token_maker.create_token(
        &claims.sub,
        claims.kind,
        state.config.access_token_duration,
    )?;

    Ok(RenewAccessResponse {
        access_token,
        access_token_expires_at: access.expires_at(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn client_meta_prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));

        let meta = ClientMeta::from_headers(&headers);
        assert_eq!(meta.user_agent, "curl/8.0");
        assert_eq!(meta.client_ip, "10.0.0.1");
    }

    #[test]
    fn client_meta_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(ClientMeta::from_headers(&headers).client_ip, "10.0.0.9");
        assert_eq!(ClientMeta::from_headers(&HeaderMap::new()).client_ip, "");
    }
}
