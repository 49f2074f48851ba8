use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::users::{CreateUserRequest, VerifyEmailQuery, VerifyEmailResponse},
    error::AppResult,
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::auth::AuthUser,
    models::User,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user).get(current_user))
        .route("/user/verifyEmail", get(verify_email))
}

#[utoipa::path(
    post,
    path = "/user",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User registered, verification email scheduled", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Account already exists")
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Json<User>> {
    let user = user_service::create_user(&state, payload).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Signed-in user", body = User),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<User>> {
    let user = user_service::get_current_user(&state, &user).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/user/verifyEmail",
    params(VerifyEmailQuery),
    responses(
        (status = 200, description = "Email verified", body = VerifyEmailResponse),
        (status = 404, description = "Unknown, used or expired code")
    ),
    tag = "Users"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<VerifyEmailQuery>,
) -> AppResult<Json<VerifyEmailResponse>> {
    let resp = user_service::verify_email(&state, query).await?;
    Ok(Json(resp))
}
