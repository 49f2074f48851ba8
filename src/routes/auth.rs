use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};

use crate::{
    dto::auth::{
        AdminLoginResponse, LoginRequest, LoginResponse, RenewAccessRequest, RenewAccessResponse,
    },
    error::AppResult,
    extractors::ValidatedJson,
    services::auth_service::{self, ClientMeta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/tokens/renew_access", post(renew_access))
}

/// Mounted under `/admin`, outside the permission gate.
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/login", post(admin_login))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Disabled user or wrong password"),
        (status = 404, description = "Unknown account")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let resp = auth_service::login_user(&state, payload, ClientMeta::from_headers(&headers)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AdminLoginResponse),
        (status = 401, description = "Disabled admin user or wrong password"),
        (status = 404, description = "Unknown account")
    ),
    tag = "Auth"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AdminLoginResponse>> {
    let resp = auth_service::login_admin(&state, payload, ClientMeta::from_headers(&headers)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/tokens/renew_access",
    request_body = RenewAccessRequest,
    responses(
        (status = 200, description = "New access token", body = RenewAccessResponse),
        (status = 401, description = "Refresh token rejected")
    ),
    tag = "Auth"
)]
pub async fn renew_access(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RenewAccessRequest>,
) -> AppResult<Json<RenewAccessResponse>> {
    let resp = auth_service::renew_access_token(&state, payload).await?;
    Ok(Json(resp))
}
