use axum::{Router, middleware::from_fn_with_state};

use crate::{
    middleware::auth::{PermissionCategory, PermissionGate, require_permission},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod cart;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod permissions;
pub mod products;
pub mod roles;
pub mod users;

fn gated(state: &AppState, category: PermissionCategory, router: Router<AppState>) -> Router<AppState> {
    let gate = PermissionGate {
        state: state.clone(),
        category,
    };
    router.route_layer(from_fn_with_state(gate, require_permission))
}

/// Every API route. Admin route groups declare the permission category they
/// require when they are registered.
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .merge(auth::admin_router())
        .merge(gated(
            state,
            PermissionCategory::UsersRoles,
            admin::router()
                .merge(roles::router())
                .merge(permissions::router()),
        ))
        .merge(gated(state, PermissionCategory::Products, products::router()))
        .merge(gated(state, PermissionCategory::Coupons, coupons::router()))
        .merge(gated(state, PermissionCategory::Orders, orders::router()));

    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(cart::router())
        .nest("/admin", admin)
}
