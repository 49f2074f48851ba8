use chrono::Utc;

use crate::{
    dto::admin::{
        AdminUserResponse, CreateAdminUserRequest, CreatePermissionRequest, CreateRoleRequest,
        RoleResponse, UpdateAdminUserRequest, UpdateRoleRequest,
    },
    error::{AppError, AppResult},
    models::{Permission, Role},
    password::hash_password,
    response::{MessageResponse, Paginated},
    routes::params::{PageIdQuery, Pagination},
    state::AppState,
    store::{
        CreateAdminUserTxParams, CreateRoleTxParams, ErrorKind, PasswordChange,
        UpdateAdminUserTxParams, UpdateRoleTxParams,
    },
};

pub async fn create_admin_user(
    state: &AppState,
    payload: CreateAdminUserRequest,
) -> AppResult<AdminUserResponse> {
    let hashed_password = hash_password(&payload.password)?;
    let result = state
        .store
        .create_admin_user_tx(CreateAdminUserTxParams {
            account: payload.account,
            full_name: payload.full_name,
            hashed_password,
            status: payload.status,
            roles_id: payload.roles_id,
        })
        .await
        .map_err(|err| match err.kind() {
            // Duplicate admin accounts have always been answered with 403.
            ErrorKind::UniqueViolation => AppError::Forbidden("admin account already exists".into()),
            _ => AppError::from(err),
        })?;

    tracing::info!(
        admin_user_id = result.admin_user.id,
        roles = result.roles.len(),
        "admin user created"
    );
    Ok(result.into())
}

pub async fn get_admin_user(state: &AppState, id: i64) -> AppResult<AdminUserResponse> {
    Ok(state.store.get_admin_user_detail(id).await?.into())
}

pub async fn update_admin_user(
    state: &AppState,
    id: i64,
    payload: UpdateAdminUserRequest,
) -> AppResult<AdminUserResponse> {
    let password = match payload.password {
        Some(password) => Some(PasswordChange {
            hashed_password: hash_password(&password)?,
            changed_at: Utc::now(),
        }),
        None => None,
    };

    let result = state
        .store
        .update_admin_user_tx(UpdateAdminUserTxParams {
            id,
            full_name: payload.full_name,
            password,
            status: payload.status,
            roles_id: payload.roles_id,
        })
        .await?;
    Ok(result.into())
}

pub async fn delete_admin_user(state: &AppState, id: i64) -> AppResult<MessageResponse> {
    state.store.delete_admin_user_tx(id).await?;
    Ok(MessageResponse::new("admin user deleted"))
}

pub async fn create_role(state: &AppState, payload: CreateRoleRequest) -> AppResult<RoleResponse> {
    let result = state
        .store
        .create_role_tx(CreateRoleTxParams {
            name: payload.name,
            permissions_id: payload.permissions_id,
        })
        .await?;
    Ok(result.into())
}

pub async fn get_role(state: &AppState, id: i64) -> AppResult<RoleResponse> {
    Ok(state.store.get_role_detail(id).await?.into())
}

pub async fn list_roles(state: &AppState, query: Pagination) -> AppResult<Paginated<Role>> {
    let (limit, offset) = query.normalize();
    let q = state.store.queries();
    let count = q.count_roles().await?;
    let roles = q.list_roles(limit, offset).await?;
    Ok(Paginated::new(count, roles.into_iter().map(Role::from).collect()))
}

pub async fn update_role(
    state: &AppState,
    id: i64,
    payload: UpdateRoleRequest,
) -> AppResult<RoleResponse> {
    let result = state
        .store
        .update_role_tx(UpdateRoleTxParams {
            id,
            name: payload.name,
            permissions_id: payload.permissions_id,
        })
        .await?;
    Ok(result.into())
}

pub async fn delete_role(state: &AppState, id: i64) -> AppResult<MessageResponse> {
    state.store.delete_role_tx(id).await?;
    Ok(MessageResponse::new("role deleted"))
}

pub async fn create_permission(
    state: &AppState,
    payload: CreatePermissionRequest,
) -> AppResult<Permission> {
    let permission = state.store.queries().create_permission(payload.name).await?;
    Ok(permission.into())
}

pub async fn get_permission(state: &AppState, id: i64) -> AppResult<Permission> {
    Ok(state.store.queries().get_permission(id).await?.into())
}

pub async fn list_permissions(state: &AppState, query: PageIdQuery) -> AppResult<Vec<Permission>> {
    let (limit, offset) = query.limit_offset();
    let permissions = state.store.queries().list_permissions(limit, offset).await?;
    Ok(permissions.into_iter().map(Permission::from).collect())
}
