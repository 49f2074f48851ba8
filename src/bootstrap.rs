//! Start-up provisioning of a development administrator.

use crate::{
    middleware::auth::STATUS_ACTIVE,
    password::hash_password,
    state::AppState,
    store::{CreateAdminUserTxParams, CreateRoleTxParams, ErrorKind, StoreError},
};

pub const SUPER_ADMIN_ROLE: &str = "super admin";

/// Creates `TEST_ADMIN_ACCOUNT` holding every known permission when both
/// `TEST_ADMIN_ACCOUNT` and `TEST_ADMIN_PASSWORD` are set and the account does
/// not exist yet. Returns whether an account was created.
pub async fn ensure_test_admin(state: &AppState) -> anyhow::Result<bool> {
    let (Some(account), Some(password)) = (
        state.config.test_admin_account.clone(),
        state.config.test_admin_password.clone(),
    ) else {
        return Ok(false);
    };

    let queries = state.store.queries();
    match queries.get_admin_user_by_account(&account).await {
        Ok(_) => {
            tracing::debug!(%account, "test admin already present");
            return Ok(false);
        }
        Err(StoreError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }

    let role_id = match queries.get_role_by_name(SUPER_ADMIN_ROLE).await {
        Ok(role) => role.id,
        Err(StoreError::NotFound) => {
            let permissions_id = queries
                .list_all_permissions()
                .await?
                .into_iter()
                .map(|permission| permission.id)
                .collect();
            let created = state
                .store
                .create_role_tx(CreateRoleTxParams {
                    name: SUPER_ADMIN_ROLE.to_string(),
                    permissions_id,
                })
                .await?;
            created.role.id
        }
        Err(err) => return Err(err.into()),
    };

    let hashed_password = hash_password(&password)?;
    let result = state
        .store
        .create_admin_user_tx(CreateAdminUserTxParams {
            account: account.clone(),
            full_name: account.clone(),
            hashed_password,
            status: STATUS_ACTIVE,
            roles_id: vec![role_id],
        })
        .await;

    match result {
        Ok(created) => {
            tracing::info!(account = %created.admin_user.account, "test admin created");
            Ok(true)
        }
        // Another instance won the race.
        Err(err) if err.kind() == ErrorKind::UniqueViolation => Ok(false),
        Err(err) => Err(err.into()),
    }
}
