use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::admin::{CreateRoleRequest, RoleResponse, UpdateRoleRequest},
    error::AppResult,
    extractors::{ValidatedJson, ValidatedQuery},
    models::Role,
    response::{MessageResponse, Paginated},
    routes::params::Pagination,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/role", post(create_role))
        .route(
            "/role/{id}",
            get(get_role).patch(update_role).delete(delete_role),
        )
        .route("/roles", get(list_roles))
}

#[utoipa::path(
    post,
    path = "/admin/role",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role with its permissions", body = RoleResponse),
        (status = 400, description = "Invalid input or empty permission set"),
        (status = 409, description = "Duplicate name or unknown permission")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRoleRequest>,
) -> AppResult<Json<RoleResponse>> {
    let resp = admin_service::create_role(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/role/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role", body = RoleResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoleResponse>> {
    let resp = admin_service::get_role(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/roles",
    params(Pagination),
    responses(
        (status = 200, description = "Roles", body = Paginated<Role>)
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<Pagination>,
) -> AppResult<Json<Paginated<Role>>> {
    let resp = admin_service::list_roles(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/admin/role/{id}",
    params(("id" = i64, Path, description = "Role id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated role", body = RoleResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<RoleResponse>> {
    let resp = admin_service::update_role(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/admin/role/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Role still assigned to an admin user")
    ),
    security(("bearer_auth" = [])),
    tag = "Roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let resp = admin_service::delete_role(&state, id).await?;
    Ok(Json(resp))
}
