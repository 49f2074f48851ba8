use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::validate_account;
use crate::models::{AdminUser, Permission, Role};
use crate::store::{AdminUserTxResult, RoleTxResult};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminUserRequest {
    #[validate(
        length(min = 8, message = "account must be at least 8 characters"),
        custom(function = "validate_account")
    )]
    pub account: String,
    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(range(min = 0, max = 1, message = "status must be 0 or 1"))]
    pub status: i16,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles_id: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminUserRequest {
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(range(min = 0, max = 1, message = "status must be 0 or 1"))]
    pub status: Option<i16>,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles_id: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub admin_user: AdminUser,
    pub role_list: Vec<Role>,
    pub permission_list: Vec<Permission>,
}

impl From<AdminUserTxResult> for AdminUserResponse {
    fn from(result: AdminUserTxResult) -> Self {
        Self {
            admin_user: result.admin_user.into(),
            role_list: result.roles.into_iter().map(Role::from).collect(),
            permission_list: result.permissions.into_iter().map(Permission::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "at least one permission is required"))]
    pub permissions_id: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "at least one permission is required"))]
    pub permissions_id: Option<Vec<i64>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub role: Role,
    pub permission_list: Vec<Permission>,
}

impl From<RoleTxResult> for RoleResponse {
    fn from(result: RoleTxResult) -> Self {
        Self {
            role: result.role.into(),
            permission_list: result.permissions.into_iter().map(Permission::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}
