use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::coupons::CreateCouponRequest,
    error::AppResult,
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::auth::AuthAdmin,
    models::Coupon,
    response::Paginated,
    routes::params::Pagination,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupon", post(create_coupon))
        .route("/coupon/{id}", get(get_coupon))
        .route("/coupons", get(list_coupons))
}

#[utoipa::path(
    post,
    path = "/admin/coupon",
    request_body = CreateCouponRequest,
    responses(
        (status = 200, description = "Created coupon", body = Coupon),
        (status = 400, description = "Invalid percent or validity window"),
        (status = 409, description = "Duplicate code")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    admin: AuthAdmin,
    ValidatedJson(payload): ValidatedJson<CreateCouponRequest>,
) -> AppResult<Json<Coupon>> {
    let resp = catalog_service::create_coupon(&state, &admin, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/coupon/{id}",
    params(("id" = i64, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon", body = Coupon),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn get_coupon(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Coupon>> {
    let resp = catalog_service::get_coupon(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/coupons",
    params(Pagination),
    responses(
        (status = 200, description = "Coupons", body = Paginated<Coupon>)
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<Pagination>,
) -> AppResult<Json<Paginated<Coupon>>> {
    let resp = catalog_service::list_coupons(&state, query).await?;
    Ok(Json(resp))
}
