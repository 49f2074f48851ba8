use sea_orm::ConnectionTrait;

use super::{Queries, Store, StoreError, StoreResult, unique_ids};
use crate::entity::{permissions, roles};

#[derive(Debug, Clone)]
pub struct CreateRoleTxParams {
    pub name: String,
    pub permissions_id: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRoleTxParams {
    pub id: i64,
    pub name: Option<String>,
    pub permissions_id: Option<Vec<i64>>,
}

#[derive(Debug, Clone)]
pub struct RoleTxResult {
    pub role: roles::Model,
    pub permissions: Vec<permissions::Model>,
}

fn require_permissions(permissions_id: &[i64]) -> StoreResult<Vec<i64>> {
    if permissions_id.is_empty() {
        return Err(StoreError::invalid("at least one permission is required"));
    }
    Ok(unique_ids(permissions_id))
}

async fn load_role_view<C: ConnectionTrait>(
    q: &Queries<'_, C>,
    role: roles::Model,
) -> StoreResult<RoleTxResult> {
    let permissions = q.list_permissions_for_role(role.id).await?;
    Ok(RoleTxResult { role, permissions })
}

impl Store {
    pub async fn create_role_tx(&self, params: CreateRoleTxParams) -> StoreResult<RoleTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let permissions_id = require_permissions(&params.permissions_id)?;

                let role = q.create_role(params.name).await?;
                for permission_id in permissions_id {
                    q.create_role_permission(role.id, permission_id).await?;
                }

                load_role_view(q, role).await
            })
        })
        .await
    }

    /// Renames the role and/or replaces its permission set wholesale.
    pub async fn update_role_tx(&self, params: UpdateRoleTxParams) -> StoreResult<RoleTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let permissions_id = params
                    .permissions_id
                    .as_deref()
                    .map(require_permissions)
                    .transpose()?;

                let role = match params.name {
                    Some(name) => q.update_role_name(params.id, name).await?,
                    None => q.get_role(params.id).await?,
                };

                if let Some(permissions_id) = permissions_id {
                    q.delete_role_permissions(role.id).await?;
                    for permission_id in permissions_id {
                        q.create_role_permission(role.id, permission_id).await?;
                    }
                }

                load_role_view(q, role).await
            })
        })
        .await
    }

    /// Fails with a foreign-key violation while any admin user still holds
    /// the role; nothing is removed in that case.
    pub async fn delete_role_tx(&self, id: i64) -> StoreResult<()> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                q.delete_role_permissions(id).await?;
                if q.delete_role(id).await? == 0 {
                    return Err(StoreError::NotFound);
                }
                Ok(())
            })
        })
        .await
    }

    pub async fn get_role_detail(&self, id: i64) -> StoreResult<RoleTxResult> {
        let q = self.queries();
        let role = q.get_role(id).await?;
        load_role_view(&q, role).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::store::ErrorKind;

    #[tokio::test]
    async fn role_needs_a_permission() {
        let store = Store::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = store
            .create_role_tx(CreateRoleTxParams {
                name: "auditor".into(),
                permissions_id: vec![],
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CheckViolation);
        assert_eq!(err.to_string(), "at least one permission is required");
    }
}
