use crate::{
    dto::cart::{CartResponse, UpdateCartRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    state::AppState,
    store::UpdateCartTxParams,
};

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<CartResponse> {
    Ok(state.store.get_cart(&user.account).await?.into())
}

pub async fn update_cart(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateCartRequest,
) -> AppResult<CartResponse> {
    let result = state
        .store
        .update_cart_tx(UpdateCartTxParams {
            account: user.account.clone(),
            update_type: payload.update_type,
            product_id: payload.product_id,
            num: payload.num,
            coupon_code: payload.coupon_code,
        })
        .await?;
    Ok(result.into())
}
