//! JSON views of persisted rows. Secrets such as password hashes never
//! leave the service.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    admin_users, carts, coupons, order_status, orders, pay_methods, permissions, products, roles,
    users,
};
use crate::store::ProductLine;

fn utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub account: String,
    pub email: String,
    pub full_name: String,
    pub gender_id: i16,
    pub phone: String,
    pub address: String,
    pub shipping_address: String,
    pub post_code: String,
    pub avatar_url: String,
    pub status: i16,
    pub is_email_verified: bool,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            account: m.account,
            email: m.email,
            full_name: m.full_name,
            gender_id: m.gender_id,
            phone: m.phone,
            address: m.address,
            shipping_address: m.shipping_address,
            post_code: m.post_code,
            avatar_url: m.avatar_url,
            status: m.status,
            is_email_verified: m.is_email_verified,
            password_changed_at: utc(m.password_changed_at),
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i64,
    pub account: String,
    pub full_name: String,
    pub status: i16,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<admin_users::Model> for AdminUser {
    fn from(m: admin_users::Model) -> Self {
        Self {
            id: m.id,
            account: m.account,
            full_name: m.full_name,
            status: m.status,
            password_changed_at: utc(m.password_changed_at),
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<roles::Model> for Role {
    fn from(m: roles::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<permissions::Model> for Permission {
    fn from(m: permissions::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(m: products::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            category: m.category,
            description: m.description,
            content: m.content,
            origin_price: m.origin_price,
            price: m.price,
            unit: m.unit,
            status: m.status,
            image_url: m.image_url,
            images_url: m.images_url,
            created_by: m.created_by,
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithNum {
    pub product: Product,
    pub num: i32,
}

impl From<ProductLine> for ProductWithNum {
    fn from(line: ProductLine) -> Self {
        Self {
            product: line.product.into(),
            num: line.num,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: i64,
    pub title: String,
    pub code: String,
    pub percent: i32,
    pub created_by: String,
    pub start_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<coupons::Model> for Coupon {
    fn from(m: coupons::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            code: m.code,
            percent: m.percent,
            created_by: m.created_by,
            start_at: utc(m.start_at),
            expires_at: utc(m.expires_at),
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayMethod {
    pub id: i64,
    pub name: String,
}

impl From<pay_methods::Model> for PayMethod {
    fn from(m: pay_methods::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderStatus {
    pub id: i64,
    pub name: String,
}

impl From<order_status::Model> for OrderStatus {
    fn from(m: order_status::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub shipping_address: String,
    pub message: String,
    pub is_paid: bool,
    pub total_price: i64,
    pub final_price: i64,
    pub pay_method_id: i64,
    pub status_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(m: orders::Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            email: m.email,
            shipping_address: m.shipping_address,
            message: m.message,
            is_paid: m.is_paid,
            total_price: m.total_price,
            final_price: m.final_price,
            pay_method_id: m.pay_method_id,
            status_id: m.status_id,
            created_at: utc(m.created_at),
            updated_at: utc(m.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub owner: String,
    pub total_price: i64,
    pub final_price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<carts::Model> for Cart {
    fn from(m: carts::Model) -> Self {
        Self {
            id: m.id,
            owner: m.owner,
            total_price: m.total_price,
            final_price: m.final_price,
            created_at: utc(m.created_at),
        }
    }
}
