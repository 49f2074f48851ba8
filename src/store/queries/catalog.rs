use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use super::Queries;
use crate::entity::{
    Coupons, OrderStatus, PayMethods, Products, coupons, order_status, pay_methods, products,
};
use crate::store::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct CreateProductRow {
    pub title: String,
    pub category: String,
    pub description: String,
    pub content: String,
    pub origin_price: i64,
    pub price: i64,
    pub unit: String,
    pub status: i16,
    pub image_url: String,
    pub images_url: Vec<String>,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub struct CreateCouponRow {
    pub title: String,
    pub code: String,
    pub percent: i32,
    pub created_by: String,
    pub start_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<C: ConnectionTrait> Queries<'_, C> {
    pub async fn create_product(&self, row: CreateProductRow) -> StoreResult<products::Model> {
        let product = products::ActiveModel {
            id: NotSet,
            title: Set(row.title),
            category: Set(row.category),
            description: Set(row.description),
            content: Set(row.content),
            origin_price: Set(row.origin_price),
            price: Set(row.price),
            unit: Set(row.unit),
            status: Set(row.status),
            image_url: Set(row.image_url),
            images_url: Set(row.images_url),
            created_by: Set(row.created_by),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(product)
    }

    pub async fn get_product(&self, id: i64) -> StoreResult<products::Model> {
        Products::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn list_products(&self, limit: u64, offset: u64) -> StoreResult<Vec<products::Model>> {
        let products = Products::find()
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await?;
        Ok(products)
    }

    pub async fn count_products(&self) -> StoreResult<u64> {
        Ok(Products::find().count(self.conn).await?)
    }

    pub async fn create_coupon(&self, row: CreateCouponRow) -> StoreResult<coupons::Model> {
        let coupon = coupons::ActiveModel {
            id: NotSet,
            title: Set(row.title),
            code: Set(row.code),
            percent: Set(row.percent),
            created_by: Set(row.created_by),
            start_at: Set(row.start_at.into()),
            expires_at: Set(row.expires_at.into()),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(coupon)
    }

    pub async fn get_coupon(&self, id: i64) -> StoreResult<coupons::Model> {
        Coupons::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn get_coupon_by_code(&self, code: &str) -> StoreResult<coupons::Model> {
        Coupons::find()
            .filter(coupons::Column::Code.eq(code))
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn list_coupons(&self, limit: u64, offset: u64) -> StoreResult<Vec<coupons::Model>> {
        let coupons = Coupons::find()
            .order_by_desc(coupons::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await?;
        Ok(coupons)
    }

    pub async fn count_coupons(&self) -> StoreResult<u64> {
        Ok(Coupons::find().count(self.conn).await?)
    }

    pub async fn get_pay_method(&self, id: i64) -> StoreResult<pay_methods::Model> {
        PayMethods::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn list_pay_methods(&self) -> StoreResult<Vec<pay_methods::Model>> {
        let methods = PayMethods::find()
            .order_by_asc(pay_methods::Column::Id)
            .all(self.conn)
            .await?;
        Ok(methods)
    }

    pub async fn get_order_status(&self, id: i64) -> StoreResult<order_status::Model> {
        OrderStatus::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
