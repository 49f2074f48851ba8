use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::orders::{CreateOrderRequest, OrderResponse, PayMethodsResponse, UpdateOrderRequest},
    error::AppResult,
    extractors::{ValidatedJson, ValidatedQuery},
    models::Order,
    response::{MessageResponse, Paginated},
    routes::params::Pagination,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order", post(create_order))
        .route(
            "/order/{id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/order/pay_methods/option", get(list_pay_methods))
        .route("/orders", get(list_orders))
}

#[utoipa::path(
    post,
    path = "/admin/order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order with status, lines and payment method", body = OrderResponse),
        (status = 400, description = "No line items, bad quantity or inactive coupon"),
        (status = 404, description = "Unknown product, coupon, status or payment method")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    let resp = order_service::create_order(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/order/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderResponse>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    params(Pagination),
    responses(
        (status = 200, description = "Orders, newest first", body = Paginated<Order>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<Pagination>,
) -> AppResult<Json<Paginated<Order>>> {
    let resp = order_service::list_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/admin/order/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    let resp = order_service::update_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/admin/order/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let resp = order_service::delete_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/order/pay_methods/option",
    responses(
        (status = 200, description = "Payment methods", body = PayMethodsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_pay_methods(State(state): State<AppState>) -> AppResult<Json<PayMethodsResponse>> {
    let resp = order_service::list_pay_methods(&state).await?;
    Ok(Json(resp))
}
