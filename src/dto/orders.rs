use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Coupon, Order, OrderStatus, PayMethod, ProductWithNum};
use crate::store::OrderTxResult;
use crate::store::pricing::LineItem;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderProductInput {
    pub product_id: i64,
    #[validate(range(min = 1, message = "num must be greater than 0"))]
    pub num: i32,
}

impl From<OrderProductInput> for LineItem {
    fn from(input: OrderProductInput) -> Self {
        LineItem {
            product_id: input.product_id,
            num: input.num,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Customer that owns the order.
    #[validate(range(min = 1, message = "userId is required"))]
    pub user_id: i64,
    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "shippingAddress is required"))]
    pub shipping_address: String,
    #[serde(default)]
    pub message: String,
    #[validate(range(min = 1, message = "payMethodId is required"))]
    pub pay_method_id: i64,
    /// Defaults to pending.
    pub status_id: Option<i64>,
    #[validate(length(min = 1, message = "at least one order product is required"), nested)]
    pub order_products: Vec<OrderProductInput>,
    pub coupon_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: Option<String>,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "shippingAddress must not be empty"))]
    pub shipping_address: Option<String>,
    pub message: Option<String>,
    pub is_paid: Option<bool>,
    pub pay_method_id: Option<i64>,
    pub status_id: Option<i64>,
    #[validate(length(min = 1, message = "at least one order product is required"), nested)]
    pub order_products: Option<Vec<OrderProductInput>>,
    /// `0` removes the coupon.
    pub coupon_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order: Order,
    pub order_status: OrderStatus,
    pub product_list: Vec<ProductWithNum>,
    pub pay_method: PayMethod,
    pub coupon: Option<Coupon>,
    pub user_id: Option<i64>,
}

impl From<OrderTxResult> for OrderResponse {
    fn from(result: OrderTxResult) -> Self {
        Self {
            order: result.order.into(),
            order_status: result.order_status.into(),
            product_list: result.product_list.into_iter().map(ProductWithNum::from).collect(),
            pay_method: result.pay_method.into(),
            coupon: result.coupon.map(Coupon::from),
            user_id: result.user_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayMethodsResponse {
    pub pay_methods: Vec<PayMethod>,
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;
    use crate::extractors::format_validation_errors;

    #[test]
    fn zero_quantity_fails_validation() {
        let req: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "userId": 1,
            "fullName": "Bob",
            "email": "bob@example.com",
            "shippingAddress": "1 Main St",
            "payMethodId": 1,
            "orderProducts": [{ "productId": 1, "num": 0 }]
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert_eq!(format_validation_errors(&errors), "num must be greater than 0");
    }

    #[test]
    fn empty_line_items_fail_validation() {
        let req: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "userId": 1,
            "fullName": "Bob",
            "email": "bob@example.com",
            "shippingAddress": "1 Main St",
            "payMethodId": 1,
            "orderProducts": []
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }
}
