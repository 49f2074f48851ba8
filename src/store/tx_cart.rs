use chrono::Utc;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::pricing::{self, PricedLine};
use super::{ProductLine, Queries, Store, StoreError, StoreResult};
use crate::entity::{carts, coupons};

/// How the requested quantity is combined with what the cart already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CartUpdateType {
    /// Adds to the current quantity.
    Add,
    /// Replaces the current quantity.
    Update,
}

#[derive(Debug, Clone)]
pub struct UpdateCartTxParams {
    pub account: String,
    pub update_type: CartUpdateType,
    pub product_id: i64,
    pub num: i32,
    /// Replaces the cart coupon when non-empty.
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CartTxResult {
    pub cart: carts::Model,
    pub product_list: Vec<ProductLine>,
    pub coupon: Option<coupons::Model>,
}

async fn load_cart_view<C: ConnectionTrait>(
    q: &Queries<'_, C>,
    cart: carts::Model,
) -> StoreResult<CartTxResult> {
    let product_list = q.list_cart_lines(cart.id).await?;
    let coupon = q.get_cart_coupon(cart.id).await?;
    Ok(CartTxResult {
        cart,
        product_list,
        coupon,
    })
}

impl Store {
    pub async fn update_cart_tx(&self, params: UpdateCartTxParams) -> StoreResult<CartTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                if params.num <= 0 {
                    return Err(StoreError::invalid("quantity must be greater than 0"));
                }

                let cart = q.get_cart_by_owner(&params.account).await?;
                let product = q.get_product(params.product_id).await?;

                match q.get_cart_product(cart.id, product.id).await? {
                    Some(existing) => {
                        let num = match params.update_type {
                            CartUpdateType::Add => existing
                                .num
                                .checked_add(params.num)
                                .ok_or_else(|| StoreError::invalid("quantity is too large"))?,
                            CartUpdateType::Update => params.num,
                        };
                        q.update_cart_product_num(cart.id, product.id, num).await?;
                    }
                    None => q.create_cart_product(cart.id, product.id, params.num).await?,
                }

                let coupon = match params.coupon_code.as_deref().filter(|code| !code.is_empty()) {
                    Some(code) => {
                        let coupon = q.get_coupon_by_code(code).await?;
                        if !coupon.is_active_at(Utc::now().fixed_offset()) {
                            return Err(StoreError::invalid(format!(
                                "coupon {} is not active",
                                coupon.code
                            )));
                        }
                        q.delete_cart_coupon(cart.id).await?;
                        q.create_cart_coupon(cart.id, coupon.id).await?;
                        Some(coupon)
                    }
                    None => q.get_cart_coupon(cart.id).await?,
                };

                let product_list = q.list_cart_lines(cart.id).await?;
                let totals = pricing::sum_lines(product_list.iter().map(|line| PricedLine {
                    num: line.num,
                    origin_price: line.product.origin_price,
                    price: line.product.price,
                }))?;
                let totals =
                    pricing::totals_with_coupon(totals, coupon.as_ref().map(|coupon| coupon.percent));
                let cart = q.update_cart_prices(cart.id, totals).await?;

                Ok(CartTxResult {
                    cart,
                    product_list,
                    coupon,
                })
            })
        })
        .await
    }

    pub async fn get_cart(&self, account: &str) -> StoreResult<CartTxResult> {
        let q = self.queries();
        let cart = q.get_cart_by_owner(account).await?;
        load_cart_view(&q, cart).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::store::ErrorKind;

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let store = Store::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = store
            .update_cart_tx(UpdateCartTxParams {
                account: "carol0001".into(),
                update_type: CartUpdateType::Add,
                product_id: 1,
                num: 0,
                coupon_code: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CheckViolation);
    }

    #[tokio::test]
    async fn missing_cart_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<carts::Model>::new()])
            .into_connection();
        let err = Store::new(db)
            .update_cart_tx(UpdateCartTxParams {
                account: "nobody001".into(),
                update_type: CartUpdateType::Update,
                product_id: 1,
                num: 2,
                coupon_code: Some(String::new()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn update_type_uses_lowercase_names() {
        let add: CartUpdateType = serde_json::from_str("\"add\"").unwrap();
        assert_eq!(add, CartUpdateType::Add);
        assert_eq!(serde_json::to_string(&CartUpdateType::Update).unwrap(), "\"update\"");
    }
}
