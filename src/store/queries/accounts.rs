use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Statement,
};
use uuid::Uuid;

use super::{ProductLine, Queries};
use crate::entity::{
    CartCoupons, CartProducts, Carts, Coupons, Products, Sessions, Users, VerifyEmails,
    cart_coupons, cart_products, carts, coupons, sessions, users, verify_emails,
};
use crate::store::pricing::Totals;
use crate::store::{StoreError, StoreResult};

const CONSUME_VERIFY_EMAIL: &str = r#"
    UPDATE verify_emails
    SET is_used = TRUE
    WHERE id = $1
      AND secret_code = $2
      AND is_used = FALSE
      AND expires_at > now()
    RETURNING *
"#;

#[derive(Debug, Clone)]
pub struct CreateUserRow {
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
}

#[derive(Debug, Clone)]
pub struct CreateVerifyEmailRow {
    pub user_id: i64,
    pub email: String,
    pub secret_code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSessionRow {
    pub id: Uuid,
    pub account: String,
    pub is_admin: bool,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub expires_at: DateTime<Utc>,
}

impl<C: ConnectionTrait> Queries<'_, C> {
    pub async fn create_user(&self, row: CreateUserRow) -> StoreResult<users::Model> {
        let user = users::ActiveModel {
            id: NotSet,
            account: Set(row.account),
            email: Set(row.email),
            full_name: Set(row.full_name),
            gender_id: Set(row.gender_id),
            phone: Set(row.phone),
            address: Set(row.address),
            shipping_address: Set(row.shipping_address),
            post_code: Set(row.post_code),
            hashed_password: Set(row.hashed_password),
            avatar_url: Set(row.avatar_url),
            status: NotSet,
            is_email_verified: NotSet,
            password_changed_at: NotSet,
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(user)
    }

    pub async fn get_user_by_account(&self, account: &str) -> StoreResult<users::Model> {
        Users::find()
            .filter(users::Column::Account.eq(account))
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn mark_user_email_verified(&self, id: i64) -> StoreResult<users::Model> {
        let user = users::ActiveModel {
            id: Unchanged(id),
            is_email_verified: Set(true),
            ..Default::default()
        }
        .update(self.conn)
        .await?;
        Ok(user)
    }

    pub async fn create_cart(&self, owner: String) -> StoreResult<carts::Model> {
        let cart = carts::ActiveModel {
            id: NotSet,
            owner: Set(owner),
            total_price: Set(0),
            final_price: Set(0),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(cart)
    }

    pub async fn get_cart_by_owner(&self, owner: &str) -> StoreResult<carts::Model> {
        Carts::find()
            .filter(carts::Column::Owner.eq(owner))
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn update_cart_prices(&self, id: i64, totals: Totals) -> StoreResult<carts::Model> {
        let cart = carts::ActiveModel {
            id: Unchanged(id),
            total_price: Set(totals.total_price),
            final_price: Set(totals.final_price),
            ..Default::default()
        }
        .update(self.conn)
        .await?;
        Ok(cart)
    }

    pub async fn get_cart_product(
        &self,
        cart_id: i64,
        product_id: i64,
    ) -> StoreResult<Option<cart_products::Model>> {
        let line = CartProducts::find_by_id((cart_id, product_id))
            .one(self.conn)
            .await?;
        Ok(line)
    }

    pub async fn create_cart_product(&self, cart_id: i64, product_id: i64, num: i32) -> StoreResult<()> {
        cart_products::ActiveModel {
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            num: Set(num),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn update_cart_product_num(&self, cart_id: i64, product_id: i64, num: i32) -> StoreResult<()> {
        cart_products::ActiveModel {
            cart_id: Unchanged(cart_id),
            product_id: Unchanged(product_id),
            num: Set(num),
        }
        .update(self.conn)
        .await?;
        Ok(())
    }

    pub async fn list_cart_lines(&self, cart_id: i64) -> StoreResult<Vec<ProductLine>> {
        let rows = CartProducts::find()
            .filter(cart_products::Column::CartId.eq(cart_id))
            .order_by_asc(cart_products::Column::ProductId)
            .find_also_related(Products)
            .all(self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(line, product)| product.map(|product| ProductLine { product, num: line.num }))
            .collect())
    }

    pub async fn delete_cart_coupon(&self, cart_id: i64) -> StoreResult<u64> {
        let result = CartCoupons::delete_by_id(cart_id).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn create_cart_coupon(&self, cart_id: i64, coupon_id: i64) -> StoreResult<()> {
        cart_coupons::ActiveModel {
            cart_id: Set(cart_id),
            coupon_id: Set(coupon_id),
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    pub async fn get_cart_coupon(&self, cart_id: i64) -> StoreResult<Option<coupons::Model>> {
        let row = CartCoupons::find_by_id(cart_id)
            .find_also_related(Coupons)
            .one(self.conn)
            .await?;
        Ok(row.and_then(|(_, coupon)| coupon))
    }

    pub async fn create_verify_email(&self, row: CreateVerifyEmailRow) -> StoreResult<verify_emails::Model> {
        let verify_email = verify_emails::ActiveModel {
            id: NotSet,
            user_id: Set(row.user_id),
            email: Set(row.email),
            secret_code: Set(row.secret_code),
            is_used: Set(false),
            expires_at: Set(row.expires_at.into()),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(verify_email)
    }

    /// Atomically flips `is_used` on a matching, unused and unexpired row.
    /// Returns `None` when no row qualifies.
    pub async fn consume_verify_email(
        &self,
        id: i64,
        secret_code: &str,
    ) -> StoreResult<Option<verify_emails::Model>> {
        let stmt = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            CONSUME_VERIFY_EMAIL,
            [id.into(), secret_code.into()],
        );
        let row = VerifyEmails::find().from_raw_sql(stmt).one(self.conn).await?;
        Ok(row)
    }

    pub async fn create_session(&self, row: CreateSessionRow) -> StoreResult<sessions::Model> {
        let session = sessions::ActiveModel {
            id: Set(row.id),
            account: Set(row.account),
            is_admin: Set(row.is_admin),
            refresh_token: Set(row.refresh_token),
            user_agent: Set(row.user_agent),
            client_ip: Set(row.client_ip),
            is_blocked: Set(false),
            expires_at: Set(row.expires_at.into()),
            created_at: NotSet,
        }
        .insert(self.conn)
        .await?;
        Ok(session)
    }

    pub async fn get_session(&self, id: Uuid) -> StoreResult<sessions::Model> {
        Sessions::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
