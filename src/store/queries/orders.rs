use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use super::{ProductLine, Queries};
use crate::entity::{
    Coupons, OrderCoupons, OrderProducts, OrderUsers, Orders, Products, coupons, order_coupons,
    order_products, order_users, orders,
};
use crate::store::{StoreError, StoreResult};

impl<C: ConnectionTrait> Queries<'_, C> {
    pub async fn create_order(&self, order: orders::ActiveModel) -> StoreResult<orders::Model> {
        Ok(order.insert(self.conn).await?)
    }

    pub async fn get_order(&self, id: i64) -> StoreResult<orders::Model> {
        Orders::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Writes the `Set` columns of `order`; a missing row is `NotFound`.
    pub async fn update_order(&self, order: orders::ActiveModel) -> StoreResult<orders::Model> {
        Ok(order.update(self.conn).await?)
    }

    pub async fn delete_order(&self, id: i64) -> StoreResult<u64> {
        let result = Orders::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn list_orders(&self, limit: u64, offset: u64) -> StoreResult<Vec<orders::Model>> {
        let orders = Orders::find()
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await?;
        Ok(orders)
    }

    pub async fn count_orders(&self) -> StoreResult<u64> {
        Ok(Orders::find().count(self.conn).await?)
    }

    pub async fn create_order_user(&self, order_id: i64, user_id: i64) -> StoreResult<()> {
        order_users::ActiveModel {
            order_id: Set(order_id),
            user_id: Set(user_id),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete_order_users(&self, order_id: i64) -> StoreResult<u64> {
        let result = OrderUsers::delete_many()
            .filter(order_users::Column::OrderId.eq(order_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn get_order_user_id(&self, order_id: i64) -> StoreResult<Option<i64>> {
        let owner = OrderUsers::find()
            .filter(order_users::Column::OrderId.eq(order_id))
            .one(self.conn)
            .await?;
        Ok(owner.map(|row| row.user_id))
    }

    pub async fn create_order_product(&self, order_id: i64, product_id: i64, num: i32) -> StoreResult<()> {
        order_products::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(product_id),
            num: Set(num),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete_order_products(&self, order_id: i64) -> StoreResult<u64> {
        let result = OrderProducts::delete_many()
            .filter(order_products::Column::OrderId.eq(order_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_order_lines(&self, order_id: i64) -> StoreResult<Vec<ProductLine>> {
        let rows = OrderProducts::find()
            .filter(order_products::Column::OrderId.eq(order_id))
            .order_by_asc(order_products::Column::ProductId)
            .find_also_related(Products)
            .all(self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(line, product)| product.map(|product| ProductLine { product, num: line.num }))
            .collect())
    }

    pub async fn create_order_coupon(&self, order_id: i64, coupon_id: i64) -> StoreResult<()> {
        order_coupons::ActiveModel {
            order_id: Set(order_id),
            coupon_id: Set(coupon_id),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn delete_order_coupons(&self, order_id: i64) -> StoreResult<u64> {
        let result = OrderCoupons::delete_many()
            .filter(order_coupons::Column::OrderId.eq(order_id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn get_order_coupon(&self, order_id: i64) -> StoreResult<Option<coupons::Model>> {
        let row = OrderCoupons::find()
            .filter(order_coupons::Column::OrderId.eq(order_id))
            .find_also_related(Coupons)
            .one(self.conn)
            .await?;
        Ok(row.and_then(|(_, coupon)| coupon))
    }
}
