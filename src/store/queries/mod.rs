//! Single-statement persistence primitives.
//!
//! Every method runs exactly one statement (or one joined read) against the
//! bound connection, which is either the pool or an open transaction.

use sea_orm::ConnectionTrait;

use crate::entity::products;

mod accounts;
mod admin;
mod catalog;
mod orders;

pub use accounts::{CreateSessionRow, CreateUserRow, CreateVerifyEmailRow};
pub use catalog::{CreateCouponRow, CreateProductRow};

pub struct Queries<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> Queries<'a, C> {
    pub(crate) fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

/// A product together with the quantity held by an order or a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    pub product: products::Model,
    pub num: i32,
}
