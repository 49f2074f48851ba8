use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub account: String,
    pub email: String,
    pub full_name: String,
    pub gender_id: i16,
    pub phone: String,
    pub address: String,
    pub shipping_address: String,
    pub post_code: String,
    pub hashed_password: String,
    pub avatar_url: String,
    pub status: i16,
    pub is_email_verified: bool,
    pub password_changed_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_users::Entity")]
    OrderUsers,
    #[sea_orm(has_many = "super::verify_emails::Entity")]
    VerifyEmails,
}

impl Related<super::order_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderUsers.def()
    }
}

impl Related<super::verify_emails::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerifyEmails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
