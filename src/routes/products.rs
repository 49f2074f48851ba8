use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::products::CreateProductRequest,
    error::AppResult,
    extractors::{ValidatedJson, ValidatedQuery},
    middleware::auth::AuthAdmin,
    models::Product,
    response::Paginated,
    routes::params::Pagination,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", post(create_product))
        .route("/product/{id}", get(get_product))
        .route("/products", get(list_products))
}

#[utoipa::path(
    post,
    path = "/admin/product",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Created product", body = Product),
        (status = 400, description = "Invalid input")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    admin: AuthAdmin,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<Json<Product>> {
    let resp = catalog_service::create_product(&state, &admin, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/product/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let resp = catalog_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/products",
    params(Pagination),
    responses(
        (status = 200, description = "Products, newest first", body = Paginated<Product>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<Pagination>,
) -> AppResult<Json<Paginated<Product>>> {
    let resp = catalog_service::list_products(&state, query).await?;
    Ok(Json(resp))
}
