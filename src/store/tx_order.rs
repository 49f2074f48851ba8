use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::ConnectionTrait;

use super::pricing::{self, LineItem, PricedLine, Totals};
use super::{ProductLine, Queries, Store, StoreError, StoreResult};
use crate::entity::{coupons, order_status, orders, pay_methods};

/// Status assigned to orders created without an explicit one.
pub const PENDING_STATUS_ID: i64 = 1;

#[derive(Debug, Clone)]
pub struct CreateOrderTxParams {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub shipping_address: String,
    pub message: String,
    pub pay_method_id: i64,
    pub status_id: i64,
    pub order_products: Vec<LineItem>,
    /// `None` and `Some(0)` both mean no coupon.
    pub coupon_id: Option<i64>,
}

/// Partial update of an order. Line items and coupon, when present, replace
/// the current ones and trigger a recomputation of the totals. A `coupon_id`
/// of `0` removes the coupon.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderTxParams {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub shipping_address: Option<String>,
    pub message: Option<String>,
    pub is_paid: Option<bool>,
    pub pay_method_id: Option<i64>,
    pub status_id: Option<i64>,
    pub order_products: Option<Vec<LineItem>>,
    pub coupon_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct OrderTxResult {
    pub order: orders::Model,
    pub order_status: order_status::Model,
    pub product_list: Vec<ProductLine>,
    pub pay_method: pay_methods::Model,
    pub coupon: Option<coupons::Model>,
    pub user_id: Option<i64>,
}

fn priced(lines: &[ProductLine]) -> impl Iterator<Item = PricedLine> + '_ {
    lines.iter().map(|line| PricedLine {
        num: line.num,
        origin_price: line.product.origin_price,
        price: line.product.price,
    })
}

/// Validates and merges requested line items, then reads every product.
async fn resolve_lines<C: ConnectionTrait>(
    q: &Queries<'_, C>,
    items: &[LineItem],
) -> StoreResult<Vec<ProductLine>> {
    if items.is_empty() {
        return Err(StoreError::invalid("at least one order product is required"));
    }
    let mut lines = Vec::with_capacity(items.len());
    for item in pricing::merge_line_items(items)? {
        let product = q.get_product(item.product_id).await?;
        lines.push(ProductLine {
            product,
            num: item.num,
        });
    }
    Ok(lines)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CouponRequest {
    Keep,
    Clear,
    Apply(i64),
}

/// `None` keeps whatever is attached, `Some(0)` detaches the coupon.
fn coupon_request(coupon_id: Option<i64>) -> CouponRequest {
    match coupon_id {
        None => CouponRequest::Keep,
        Some(0) => CouponRequest::Clear,
        Some(id) => CouponRequest::Apply(id),
    }
}

/// Reads a coupon that must be valid right now.
async fn active_coupon<C: ConnectionTrait>(
    q: &Queries<'_, C>,
    coupon_id: i64,
) -> StoreResult<coupons::Model> {
    let coupon = q.get_coupon(coupon_id).await?;
    if !coupon.is_active_at(Utc::now().fixed_offset()) {
        return Err(StoreError::invalid(format!(
            "coupon {} is not active",
            coupon.code
        )));
    }
    Ok(coupon)
}

fn order_totals(lines: &[ProductLine], coupon: Option<&coupons::Model>) -> StoreResult<Totals> {
    let totals = pricing::sum_lines(priced(lines))?;
    Ok(pricing::totals_with_coupon(
        totals,
        coupon.map(|coupon| coupon.percent),
    ))
}

pub(super) async fn load_order_view<C: ConnectionTrait>(
    q: &Queries<'_, C>,
    order: orders::Model,
) -> StoreResult<OrderTxResult> {
    let order_status = q.get_order_status(order.status_id).await?;
    let pay_method = q.get_pay_method(order.pay_method_id).await?;
    let product_list = q.list_order_lines(order.id).await?;
    let coupon = q.get_order_coupon(order.id).await?;
    let user_id = q.get_order_user_id(order.id).await?;
    Ok(OrderTxResult {
        order,
        order_status,
        product_list,
        pay_method,
        coupon,
        user_id,
    })
}

impl Store {
    pub async fn create_order_tx(&self, params: CreateOrderTxParams) -> StoreResult<OrderTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let lines = resolve_lines(q, &params.order_products).await?;

                let coupon = match coupon_request(params.coupon_id) {
                    CouponRequest::Apply(coupon_id) => Some(active_coupon(q, coupon_id).await?),
                    CouponRequest::Keep | CouponRequest::Clear => None,
                };
                let totals = order_totals(&lines, coupon.as_ref())?;

                let order_status = q.get_order_status(params.status_id).await?;
                let pay_method = q.get_pay_method(params.pay_method_id).await?;

                let order = q
                    .create_order(orders::ActiveModel {
                        id: NotSet,
                        full_name: Set(params.full_name),
                        email: Set(params.email),
                        shipping_address: Set(params.shipping_address),
                        message: Set(params.message),
                        is_paid: Set(false),
                        total_price: Set(totals.total_price),
                        final_price: Set(totals.final_price),
                        pay_method_id: Set(pay_method.id),
                        status_id: Set(order_status.id),
                        created_at: NotSet,
                        updated_at: NotSet,
                    })
                    .await?;

                q.create_order_user(order.id, params.user_id).await?;
                for line in &lines {
                    q.create_order_product(order.id, line.product.id, line.num)
                        .await?;
                }
                if let Some(coupon) = &coupon {
                    q.create_order_coupon(order.id, coupon.id).await?;
                }

                Ok(OrderTxResult {
                    order,
                    order_status,
                    product_list: lines,
                    pay_method,
                    coupon,
                    user_id: Some(params.user_id),
                })
            })
        })
        .await
    }

    pub async fn update_order_tx(&self, params: UpdateOrderTxParams) -> StoreResult<OrderTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let current = q.get_order(params.id).await?;

                let mut active = orders::ActiveModel {
                    id: Unchanged(current.id),
                    updated_at: Set(Utc::now().fixed_offset()),
                    ..Default::default()
                };
                if let Some(full_name) = params.full_name {
                    active.full_name = Set(full_name);
                }
                if let Some(email) = params.email {
                    active.email = Set(email);
                }
                if let Some(shipping_address) = params.shipping_address {
                    active.shipping_address = Set(shipping_address);
                }
                if let Some(message) = params.message {
                    active.message = Set(message);
                }
                if let Some(is_paid) = params.is_paid {
                    active.is_paid = Set(is_paid);
                }
                if let Some(pay_method_id) = params.pay_method_id {
                    active.pay_method_id = Set(q.get_pay_method(pay_method_id).await?.id);
                }
                if let Some(status_id) = params.status_id {
                    active.status_id = Set(q.get_order_status(status_id).await?.id);
                }

                let new_lines = match &params.order_products {
                    Some(items) => Some(resolve_lines(q, items).await?),
                    None => None,
                };
                // Outer `None` keeps the current coupon, `Some(None)` clears it.
                let coupon_change = match coupon_request(params.coupon_id) {
                    CouponRequest::Keep => None,
                    CouponRequest::Clear => Some(None),
                    CouponRequest::Apply(coupon_id) => Some(Some(active_coupon(q, coupon_id).await?)),
                };

                if let Some(lines) = &new_lines {
                    q.delete_order_products(current.id).await?;
                    for line in lines {
                        q.create_order_product(current.id, line.product.id, line.num)
                            .await?;
                    }
                }
                if let Some(coupon) = &coupon_change {
                    q.delete_order_coupons(current.id).await?;
                    if let Some(coupon) = coupon {
                        q.create_order_coupon(current.id, coupon.id).await?;
                    }
                }

                if new_lines.is_some() || coupon_change.is_some() {
                    let lines = match new_lines {
                        Some(lines) => lines,
                        None => q.list_order_lines(current.id).await?,
                    };
                    let coupon = match coupon_change {
                        Some(coupon) => coupon,
                        None => q.get_order_coupon(current.id).await?,
                    };
                    let totals = order_totals(&lines, coupon.as_ref())?;
                    active.total_price = Set(totals.total_price);
                    active.final_price = Set(totals.final_price);
                }

                let order = q.update_order(active).await?;
                load_order_view(q, order).await
            })
        })
        .await
    }

    /// Removes the owner, line items and coupon rows, then the order itself.
    pub async fn delete_order_tx(&self, id: i64) -> StoreResult<()> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                q.delete_order_users(id).await?;
                q.delete_order_products(id).await?;
                q.delete_order_coupons(id).await?;
                if q.delete_order(id).await? == 0 {
                    return Err(StoreError::NotFound);
                }
                Ok(())
            })
        })
        .await
    }

    pub async fn get_order_detail(&self, id: i64) -> StoreResult<OrderTxResult> {
        let q = self.queries();
        let order = q.get_order(id).await?;
        load_order_view(&q, order).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entity::products;
    use crate::store::ErrorKind;

    fn product(id: i64, origin_price: i64, price: i64) -> products::Model {
        let now = Utc::now().fixed_offset();
        products::Model {
            id,
            title: format!("product {id}"),
            category: "tea".into(),
            description: String::new(),
            content: String::new(),
            origin_price,
            price,
            unit: "box".into(),
            status: 1,
            image_url: String::new(),
            images_url: vec![],
            created_by: "admin".into(),
            created_at: now,
        }
    }

    fn coupon(percent: i32, start_offset_days: i64) -> coupons::Model {
        let now = Utc::now().fixed_offset();
        coupons::Model {
            id: 7,
            title: "autumn".into(),
            code: "AUTUMN10".into(),
            percent,
            created_by: "admin".into(),
            start_at: now + Duration::days(start_offset_days),
            expires_at: now + Duration::days(start_offset_days + 30),
            created_at: now,
        }
    }

    fn create_params(order_products: Vec<LineItem>) -> CreateOrderTxParams {
        CreateOrderTxParams {
            user_id: 1,
            full_name: "Bob".into(),
            email: "bob@example.com".into(),
            shipping_address: "1 Main St".into(),
            message: String::new(),
            pay_method_id: 1,
            status_id: PENDING_STATUS_ID,
            order_products,
            coupon_id: None,
        }
    }

    #[test]
    fn totals_follow_line_items_and_coupon() {
        let lines = vec![
            ProductLine {
                product: product(1, 100, 90),
                num: 2,
            },
            ProductLine {
                product: product(2, 50, 40),
                num: 3,
            },
        ];
        let totals = order_totals(&lines, Some(&coupon(10, -1))).unwrap();
        assert_eq!(totals.total_price, 350);
        assert_eq!(totals.final_price, 270);

        let without = order_totals(&lines[..1], None).unwrap();
        assert_eq!(without.total_price, 200);
        assert_eq!(without.final_price, 180);
    }

    #[test]
    fn zero_coupon_id_clears_and_absent_keeps() {
        assert_eq!(coupon_request(None), CouponRequest::Keep);
        assert_eq!(coupon_request(Some(0)), CouponRequest::Clear);
        assert_eq!(coupon_request(Some(7)), CouponRequest::Apply(7));
    }

    #[tokio::test]
    async fn empty_line_items_are_rejected() {
        let store = Store::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = store.create_order_tx(create_params(vec![])).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CheckViolation);
        assert_eq!(err.to_string(), "at least one order product is required");
    }

    #[tokio::test]
    async fn coupon_outside_its_window_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product(1, 100, 90)]])
            .append_query_results([vec![coupon(10, 3)]])
            .into_connection();
        let store = Store::new(db);

        let mut params = create_params(vec![LineItem {
            product_id: 1,
            num: 1,
        }]);
        params.coupon_id = Some(7);
        let err = store.create_order_tx(params).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CheckViolation);
        assert!(err.to_string().contains("AUTUMN10"));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<products::Model>::new()])
            .into_connection();
        let store = Store::new(db);

        let err = store
            .create_order_tx(create_params(vec![LineItem {
                product_id: 99,
                num: 1,
            }]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
