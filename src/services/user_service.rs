use crate::{
    dto::users::{CreateUserRequest, VerifyEmailQuery, VerifyEmailResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    password::hash_password,
    state::AppState,
    store::{CreateUserRow, VerifyEmailTxParams},
    worker::{PayloadSendVerifyEmail, TaskOptions},
};

/// Registers a customer and schedules the verification email.
///
/// The task is enqueued from inside the registration transaction with a
/// delayed first attempt, so a failed enqueue leaves no user behind and the
/// worker only runs once the user row is visible.
pub async fn create_user(state: &AppState, payload: CreateUserRequest) -> AppResult<User> {
    let hashed_password = hash_password(&payload.password)?;
    let row = CreateUserRow {
        account: payload.account,
        email: payload.email,
        full_name: payload.full_name,
        gender_id: payload.gender_id,
        phone: payload.phone,
        address: payload.address,
        shipping_address: payload.shipping_address,
        post_code: payload.post_code,
        hashed_password,
        avatar_url: payload.avatar_url,
    };

    let distributor = state.distributor.clone();
    let result = state
        .store
        .create_user_tx(row, move |user| async move {
            let payload = PayloadSendVerifyEmail {
                account: user.account,
            };
            distributor
                .distribute_task_send_verify_email(&payload, TaskOptions::critical())
                .await
        })
        .await?;

    tracing::info!(account = %result.user.account, cart_id = result.cart.id, "user registered");
    Ok(result.user.into())
}

pub async fn verify_email(state: &AppState, query: VerifyEmailQuery) -> AppResult<VerifyEmailResponse> {
    let result = state
        .store
        .verify_email_tx(VerifyEmailTxParams {
            email_id: query.email_id,
            secret_code: query.secret_code,
        })
        .await?;

    Ok(VerifyEmailResponse {
        is_verified: result.user.is_email_verified,
    })
}

pub async fn get_current_user(state: &AppState, user: &AuthUser) -> AppResult<User> {
    let user = state.store.queries().get_user_by_account(&user.account).await?;
    Ok(user.into())
}
