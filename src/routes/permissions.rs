use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::admin::CreatePermissionRequest,
    error::AppResult,
    extractors::{ValidatedJson, ValidatedQuery},
    models::Permission,
    routes::params::PageIdQuery,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/permission", post(create_permission))
        .route("/permission/{id}", get(get_permission))
        .route("/permissions", get(list_permissions))
}

#[utoipa::path(
    post,
    path = "/admin/permission",
    request_body = CreatePermissionRequest,
    responses(
        (status = 200, description = "Created permission", body = Permission),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn create_permission(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePermissionRequest>,
) -> AppResult<Json<Permission>> {
    let resp = admin_service::create_permission(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/permission/{id}",
    params(("id" = i64, Path, description = "Permission id")),
    responses(
        (status = 200, description = "Permission", body = Permission),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Permission>> {
    let resp = admin_service::get_permission(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/permissions",
    params(PageIdQuery),
    responses(
        (status = 200, description = "Permissions", body = Vec<Permission>),
        (status = 400, description = "pageSize outside 5..=10")
    ),
    security(("bearer_auth" = [])),
    tag = "Permissions"
)]
pub async fn list_permissions(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PageIdQuery>,
) -> AppResult<Json<Vec<Permission>>> {
    let resp = admin_service::list_permissions(&state, query).await?;
    Ok(Json(resp))
}
