use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement,
};

use super::Queries;
use crate::entity::{
    AdminUserRoles, AdminUsers, Permissions, RolePermissions, Roles, admin_user_roles,
    admin_users, permissions, role_permissions, roles,
};
use crate::store::{StoreError, StoreResult};

const LIST_ADMIN_USER_PERMISSIONS: &str = r#"
    SELECT DISTINCT p.id, p.name, p.created_at
    FROM permissions p
    JOIN role_permissions rp ON rp.permission_id = p.id
    JOIN admin_user_roles aur ON aur.role_id = rp.role_id
    WHERE aur.admin_user_id = $1
    ORDER BY p.id
"#;

impl<C: ConnectionTrait> Queries<'_, C> {
    pub async fn create_admin_user(
        &self,
        account: String,
        full_name: String,
        hashed_password: String,
        status: i16,
    ) -> StoreResult<admin_users::Model> {
        let admin_user = admin_users::ActiveModel {
            id: NotSet,
            account: Set(account),
            full_name: Set(full_name),
            hashed_password: Set(hashed_password),
            status: Set(status),
            password_changed_at: NotSet,
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(admin_user)
    }

    pub async fn get_admin_user(&self, id: i64) -> StoreResult<admin_users::Model> {
        AdminUsers::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn get_admin_user_by_account(&self, account: &str) -> StoreResult<admin_users::Model> {
        AdminUsers::find()
            .filter(admin_users::Column::Account.eq(account))
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Updates the columns that are `Some`; a missing row is `NotFound`.
    pub async fn update_admin_user(
        &self,
        id: i64,
        full_name: Option<String>,
        password: Option<(String, DateTime<Utc>)>,
        status: Option<i16>,
    ) -> StoreResult<admin_users::Model> {
        if full_name.is_none() && password.is_none() && status.is_none() {
            return self.get_admin_user(id).await;
        }

        let mut active = admin_users::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(full_name) = full_name {
            active.full_name = Set(full_name);
        }
        if let Some((hashed_password, changed_at)) = password {
            active.hashed_password = Set(hashed_password);
            active.password_changed_at = Set(changed_at.into());
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        Ok(active.update(self.conn).await?)
    }

    pub async fn delete_admin_user(&self, id: i64) -> StoreResult<u64> {
        let result = AdminUsers::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn create_admin_user_role(&self, admin_user_id: i64, role_id: i64) -> StoreResult<()> {
        admin_user_roles::ActiveModel {
            admin_user_id: Set(admin_user_id),
            role_id: Set(role_id),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete_admin_user_roles(&self, admin_user_id: i64) -> StoreResult<u64> {
        let result = AdminUserRoles::delete_many()
            .filter(admin_user_roles::Column::AdminUserId.eq(admin_user_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_roles_for_admin_user(&self, admin_user_id: i64) -> StoreResult<Vec<roles::Model>> {
        let roles = Roles::find()
            .inner_join(AdminUserRoles)
            .filter(admin_user_roles::Column::AdminUserId.eq(admin_user_id))
            .order_by_asc(roles::Column::Id)
            .all(self.conn)
            .await?;
        Ok(roles)
    }

    /// Distinct permissions granted through every role of the admin user,
    /// ordered by permission id.
    pub async fn list_permissions_for_admin_user(
        &self,
        admin_user_id: i64,
    ) -> StoreResult<Vec<permissions::Model>> {
        let stmt = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            LIST_ADMIN_USER_PERMISSIONS,
            [admin_user_id.into()],
        );
        let permissions = Permissions::find().from_raw_sql(stmt).all(self.conn).await?;
        Ok(permissions)
    }

    pub async fn create_role(&self, name: String) -> StoreResult<roles::Model> {
        let role = roles::ActiveModel {
            id: NotSet,
            name: Set(name),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(role)
    }

    pub async fn get_role(&self, id: i64) -> StoreResult<roles::Model> {
        Roles::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn get_role_by_name(&self, name: &str) -> StoreResult<roles::Model> {
        Roles::find()
            .filter(roles::Column::Name.eq(name))
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn update_role_name(&self, id: i64, name: String) -> StoreResult<roles::Model> {
        let role = roles::ActiveModel {
            id: Unchanged(id),
            name: Set(name),
            created_at: NotSet,
        }
        .update(self.conn)
        .await?;
        Ok(role)
    }

    pub async fn delete_role(&self, id: i64) -> StoreResult<u64> {
        let result = Roles::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn list_roles(&self, limit: u64, offset: u64) -> StoreResult<Vec<roles::Model>> {
        let roles = Roles::find()
            .order_by_asc(roles::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await?;
        Ok(roles)
    }

    pub async fn count_roles(&self) -> StoreResult<u64> {
        Ok(Roles::find().count(self.conn).await?)
    }

    pub async fn create_role_permission(&self, role_id: i64, permission_id: i64) -> StoreResult<()> {
        role_permissions::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(permission_id),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete_role_permissions(&self, role_id: i64) -> StoreResult<u64> {
        let result = RolePermissions::delete_many()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_permissions_for_role(&self, role_id: i64) -> StoreResult<Vec<permissions::Model>> {
        let permissions = Permissions::find()
            .inner_join(RolePermissions)
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .order_by_asc(permissions::Column::Id)
            .all(self.conn)
            .await?;
        Ok(permissions)
    }

    pub async fn create_permission(&self, name: String) -> StoreResult<permissions::Model> {
        let permission = permissions::ActiveModel {
            id: NotSet,
            name: Set(name),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(permission)
    }

    pub async fn get_permission(&self, id: i64) -> StoreResult<permissions::Model> {
        Permissions::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn list_permissions(&self, limit: u64, offset: u64) -> StoreResult<Vec<permissions::Model>> {
        let permissions = Permissions::find()
            .order_by_asc(permissions::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await?;
        Ok(permissions)
    }

    pub async fn list_all_permissions(&self) -> StoreResult<Vec<permissions::Model>> {
        let permissions = Permissions::find()
            .order_by_asc(permissions::Column::Id)
            .all(self.conn)
            .await?;
        Ok(permissions)
    }
}
