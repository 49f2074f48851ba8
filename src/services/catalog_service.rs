use chrono::Utc;

use crate::{
    dto::{coupons::CreateCouponRequest, products::CreateProductRequest},
    error::AppResult,
    middleware::auth::AuthAdmin,
    models::{Coupon, Product},
    response::Paginated,
    routes::params::Pagination,
    state::AppState,
    store::{CreateCouponRow, CreateProductRow},
};

pub async fn create_product(
    state: &AppState,
    admin: &AuthAdmin,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    let product = state
        .store
        .queries()
        .create_product(CreateProductRow {
            title: payload.title,
            category: payload.category,
            description: payload.description,
            content: payload.content,
            origin_price: payload.origin_price,
            price: payload.price,
            unit: payload.unit,
            status: payload.status,
            image_url: payload.image_url,
            images_url: payload.images_url,
            created_by: admin.account.clone(),
        })
        .await?;
    Ok(product.into())
}

pub async fn get_product(state: &AppState, id: i64) -> AppResult<Product> {
    Ok(state.store.queries().get_product(id).await?.into())
}

pub async fn list_products(state: &AppState, query: Pagination) -> AppResult<Paginated<Product>> {
    let (limit, offset) = query.normalize();
    let q = state.store.queries();
    let count = q.count_products().await?;
    let products = q.list_products(limit, offset).await?;
    Ok(Paginated::new(
        count,
        products.into_iter().map(Product::from).collect(),
    ))
}

pub async fn create_coupon(
    state: &AppState,
    admin: &AuthAdmin,
    payload: CreateCouponRequest,
) -> AppResult<Coupon> {
    let coupon = state
        .store
        .queries()
        .create_coupon(CreateCouponRow {
            title: payload.title,
            code: payload.code,
            percent: payload.percent,
            created_by: admin.account.clone(),
            start_at: payload.start_at.unwrap_or_else(Utc::now),
            expires_at: payload.expires_at,
        })
        .await?;
    Ok(coupon.into())
}

pub async fn get_coupon(state: &AppState, id: i64) -> AppResult<Coupon> {
    Ok(state.store.queries().get_coupon(id).await?.into())
}

pub async fn list_coupons(state: &AppState, query: Pagination) -> AppResult<Paginated<Coupon>> {
    let (limit, offset) = query.normalize();
    let q = state.store.queries();
    let count = q.count_coupons().await?;
    let coupons = q.list_coupons(limit, offset).await?;
    Ok(Paginated::new(count, coupons.into_iter().map(Coupon::from).collect()))
}
