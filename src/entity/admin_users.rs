use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub account: String,
    pub full_name: String,
    pub hashed_password: String,
    pub status: i16,
    pub password_changed_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::admin_user_roles::Entity")]
    AdminUserRoles,
}

impl Related<super::admin_user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminUserRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
