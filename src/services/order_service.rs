use crate::{
    dto::orders::{CreateOrderRequest, OrderResponse, PayMethodsResponse, UpdateOrderRequest},
    error::AppResult,
    models::{Order, PayMethod},
    response::{MessageResponse, Paginated},
    routes::params::Pagination,
    state::AppState,
    store::{CreateOrderTxParams, PENDING_STATUS_ID, UpdateOrderTxParams, pricing::LineItem},
};

pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<OrderResponse> {
    let result = state
        .store
        .create_order_tx(CreateOrderTxParams {
            user_id: payload.user_id,
            full_name: payload.full_name,
            email: payload.email,
            shipping_address: payload.shipping_address,
            message: payload.message,
            pay_method_id: payload.pay_method_id,
            status_id: payload.status_id.unwrap_or(PENDING_STATUS_ID),
            order_products: payload.order_products.into_iter().map(LineItem::from).collect(),
            coupon_id: payload.coupon_id,
        })
        .await?;

    tracing::info!(
        order_id = result.order.id,
        total_price = result.order.total_price,
        final_price = result.order.final_price,
        "order created"
    );
    Ok(result.into())
}

pub async fn get_order(state: &AppState, id: i64) -> AppResult<OrderResponse> {
    Ok(state.store.get_order_detail(id).await?.into())
}

pub async fn list_orders(state: &AppState, query: Pagination) -> AppResult<Paginated<Order>> {
    let (limit, offset) = query.normalize();
    let q = state.store.queries();
    let count = q.count_orders().await?;
    let orders = q.list_orders(limit, offset).await?;
    Ok(Paginated::new(count, orders.into_iter().map(Order::from).collect()))
}

pub async fn update_order(
    state: &AppState,
    id: i64,
    payload: UpdateOrderRequest,
) -> AppResult<OrderResponse> {
    let result = state
        .store
        .update_order_tx(UpdateOrderTxParams {
            id,
            full_name: payload.full_name,
            email: payload.email,
            shipping_address: payload.shipping_address,
            message: payload.message,
            is_paid: payload.is_paid,
            pay_method_id: payload.pay_method_id,
            status_id: payload.status_id,
            order_products: payload
                .order_products
                .map(|items| items.into_iter().map(LineItem::from).collect()),
            coupon_id: payload.coupon_id,
        })
        .await?;
    Ok(result.into())
}

pub async fn delete_order(state: &AppState, id: i64) -> AppResult<MessageResponse> {
    state.store.delete_order_tx(id).await?;
    Ok(MessageResponse::new("order deleted"))
}

pub async fn list_pay_methods(state: &AppState) -> AppResult<PayMethodsResponse> {
    let methods = state.store.queries().list_pay_methods().await?;
    Ok(PayMethodsResponse {
        pay_methods: methods.into_iter().map(PayMethod::from).collect(),
    })
}
