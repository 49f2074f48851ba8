use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::cart::{CartResponse, UpdateCartRequest},
    error::AppResult,
    extractors::ValidatedJson,
    middleware::auth::AuthUser,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/cart", get(get_cart).patch(update_cart))
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart of the signed-in user", body = CartResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<CartResponse>> {
    let resp = cart_service::get_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/cart",
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Cart after the change", body = CartResponse),
        (status = 400, description = "Invalid input or inactive coupon"),
        (status = 404, description = "Unknown product or coupon code")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateCartRequest>,
) -> AppResult<Json<CartResponse>> {
    let resp = cart_service::update_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}
