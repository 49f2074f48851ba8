use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub code: String,
    pub percent: i32,
    pub created_by: String,
    pub start_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether `now` falls inside `[start_at, expires_at]`.
    pub fn is_active_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.start_at <= now && now <= self.expires_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
