use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;

use super::{Queries, Store, StoreError, StoreResult, unique_ids};
use crate::entity::{admin_users, permissions, roles};

#[derive(Debug, Clone)]
pub struct CreateAdminUserTxParams {
    pub account: String,
    pub full_name: String,
    pub hashed_password: String,
    pub status: i16,
    pub roles_id: Vec<i64>,
}

/// A new password hash together with the instant it takes effect.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub hashed_password: String,
    pub changed_at: DateTime<Utc>,
}

/// Partial update of an admin user. `None` leaves the field untouched;
/// `roles_id: Some(..)` replaces the whole role set.
#[derive(Debug, Clone, Default)]
pub struct UpdateAdminUserTxParams {
    pub id: i64,
    pub full_name: Option<String>,
    pub password: Option<PasswordChange>,
    pub status: Option<i16>,
    pub roles_id: Option<Vec<i64>>,
}

#[derive(Debug, Clone)]
pub struct AdminUserTxResult {
    pub admin_user: admin_users::Model,
    pub roles: Vec<roles::Model>,
    /// Distinct permissions granted by all roles, ordered by id.
    pub permissions: Vec<permissions::Model>,
}

fn require_roles(roles_id: &[i64]) -> StoreResult<Vec<i64>> {
    if roles_id.is_empty() {
        return Err(StoreError::invalid("at least one role is required"));
    }
    Ok(unique_ids(roles_id))
}

pub(super) async fn load_admin_user_view<C: ConnectionTrait>(
    q: &Queries<'_, C>,
    admin_user: admin_users::Model,
) -> StoreResult<AdminUserTxResult> {
    let roles = q.list_roles_for_admin_user(admin_user.id).await?;
    let permissions = q.list_permissions_for_admin_user(admin_user.id).await?;
    Ok(AdminUserTxResult {
        admin_user,
        roles,
        permissions,
    })
}

impl Store {
    pub async fn create_admin_user_tx(
        &self,
        params: CreateAdminUserTxParams,
    ) -> StoreResult<AdminUserTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let roles_id = require_roles(&params.roles_id)?;

                let admin_user = q
                    .create_admin_user(
                        params.account,
                        params.full_name,
                        params.hashed_password,
                        params.status,
                    )
                    .await?;
                for role_id in roles_id {
                    q.create_admin_user_role(admin_user.id, role_id).await?;
                }

                load_admin_user_view(q, admin_user).await
            })
        })
        .await
    }

    pub async fn update_admin_user_tx(
        &self,
        params: UpdateAdminUserTxParams,
    ) -> StoreResult<AdminUserTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let roles_id = params.roles_id.as_deref().map(require_roles).transpose()?;

                let password = params
                    .password
                    .map(|change| (change.hashed_password, change.changed_at));
                let admin_user = q
                    .update_admin_user(params.id, params.full_name, password, params.status)
                    .await?;

                if let Some(roles_id) = roles_id {
                    q.delete_admin_user_roles(admin_user.id).await?;
                    for role_id in roles_id {
                        q.create_admin_user_role(admin_user.id, role_id).await?;
                    }
                }

                load_admin_user_view(q, admin_user).await
            })
        })
        .await
    }

    pub async fn delete_admin_user_tx(&self, id: i64) -> StoreResult<()> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                q.delete_admin_user_roles(id).await?;
                if q.delete_admin_user(id).await? == 0 {
                    return Err(StoreError::NotFound);
                }
                Ok(())
            })
        })
        .await
    }

    pub async fn get_admin_user_detail(&self, id: i64) -> StoreResult<AdminUserTxResult> {
        let q = self.queries();
        let admin_user = q.get_admin_user(id).await?;
        load_admin_user_view(&q, admin_user).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::store::ErrorKind;

    fn store() -> Store {
        Store::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[tokio::test]
    async fn create_with_no_roles_is_rejected_before_any_write() {
        let err = store()
            .create_admin_user_tx(CreateAdminUserTxParams {
                account: "alice001".into(),
                full_name: "Alice".into(),
                hashed_password: "h".into(),
                status: 1,
                roles_id: vec![],
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CheckViolation);
        assert_eq!(err.to_string(), "at least one role is required");
    }

    #[tokio::test]
    async fn update_with_empty_role_set_is_rejected() {
        let err = store()
            .update_admin_user_tx(UpdateAdminUserTxParams {
                id: 1,
                roles_id: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CheckViolation);
    }
}
