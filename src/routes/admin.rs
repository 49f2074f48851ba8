use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::admin::{AdminUserResponse, CreateAdminUserRequest, UpdateAdminUserRequest},
    error::AppResult,
    extractors::ValidatedJson,
    response::MessageResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin_user", post(create_admin_user))
        .route(
            "/admin_user/{id}",
            get(get_admin_user)
                .patch(update_admin_user)
                .delete(delete_admin_user),
        )
}

#[utoipa::path(
    post,
    path = "/admin/admin_user",
    request_body = CreateAdminUserRequest,
    responses(
        (status = 200, description = "Admin user with roles and effective permissions", body = AdminUserResponse),
        (status = 400, description = "Invalid input or empty role set"),
        (status = 403, description = "Permission denied or account already exists"),
        (status = 409, description = "Unknown role")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Users"
)]
pub async fn create_admin_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateAdminUserRequest>,
) -> AppResult<Json<AdminUserResponse>> {
    let resp = admin_service::create_admin_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/admin_user/{id}",
    params(("id" = i64, Path, description = "Admin user id")),
    responses(
        (status = 200, description = "Admin user", body = AdminUserResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Users"
)]
pub async fn get_admin_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AdminUserResponse>> {
    let resp = admin_service::get_admin_user(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/admin/admin_user/{id}",
    params(("id" = i64, Path, description = "Admin user id")),
    request_body = UpdateAdminUserRequest,
    responses(
        (status = 200, description = "Updated admin user", body = AdminUserResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Users"
)]
pub async fn update_admin_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateAdminUserRequest>,
) -> AppResult<Json<AdminUserResponse>> {
    let resp = admin_service::update_admin_user(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/admin/admin_user/{id}",
    params(("id" = i64, Path, description = "Admin user id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Users"
)]
pub async fn delete_admin_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let resp = admin_service::delete_admin_user(&state, id).await?;
    Ok(Json(resp))
}
