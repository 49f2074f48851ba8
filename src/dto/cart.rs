use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Cart, Coupon, ProductWithNum};
use crate::store::{CartTxResult, CartUpdateType};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    #[serde(rename = "type")]
    pub update_type: CartUpdateType,
    #[validate(range(min = 1, message = "productId is required"))]
    pub product_id: i64,
    #[validate(range(min = 1, message = "num must be greater than 0"))]
    pub num: i32,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart: Cart,
    pub product_list: Vec<ProductWithNum>,
    pub coupon: Option<Coupon>,
}

impl From<CartTxResult> for CartResponse {
    fn from(result: CartTxResult) -> Self {
        Self {
            cart: result.cart.into(),
            product_list: result.product_list.into_iter().map(ProductWithNum::from).collect(),
            coupon: result.coupon.map(Coupon::from),
        }
    }
}
