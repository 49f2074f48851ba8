use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{
            AdminUserResponse, CreateAdminUserRequest, CreatePermissionRequest, CreateRoleRequest,
            RoleResponse, UpdateAdminUserRequest, UpdateRoleRequest,
        },
        auth::{AdminLoginResponse, LoginRequest, LoginResponse, RenewAccessRequest, RenewAccessResponse},
        cart::{CartResponse, UpdateCartRequest},
        coupons::CreateCouponRequest,
        orders::{CreateOrderRequest, OrderProductInput, OrderResponse, PayMethodsResponse, UpdateOrderRequest},
        products::CreateProductRequest,
        users::{CreateUserRequest, VerifyEmailResponse},
    },
    models::{
        AdminUser, Cart, Coupon, Order, OrderStatus, PayMethod, Permission, Product, ProductWithNum,
        Role, User,
    },
    response::{ErrorBody, MessageResponse, Paginated},
    routes::{
        admin, auth, cart, coupons, health, orders, permissions, products, roles, users,
    },
    store::CartUpdateType,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::admin_login,
        auth::renew_access,
        users::create_user,
        users::current_user,
        users::verify_email,
        cart::get_cart,
        cart::update_cart,
        admin::create_admin_user,
        admin::get_admin_user,
        admin::update_admin_user,
        admin::delete_admin_user,
        roles::create_role,
        roles::get_role,
        roles::list_roles,
        roles::update_role,
        roles::delete_role,
        permissions::create_permission,
        permissions::get_permission,
        permissions::list_permissions,
        products::create_product,
        products::get_product,
        products::list_products,
        coupons::create_coupon,
        coupons::get_coupon,
        coupons::list_coupons,
        orders::create_order,
        orders::get_order,
        orders::list_orders,
        orders::update_order,
        orders::delete_order,
        orders::list_pay_methods
    ),
    components(
        schemas(
            User,
            AdminUser,
            Role,
            Permission,
            Product,
            ProductWithNum,
            Coupon,
            PayMethod,
            OrderStatus,
            Order,
            Cart,
            CartUpdateType,
            LoginRequest,
            LoginResponse,
            AdminLoginResponse,
            RenewAccessRequest,
            RenewAccessResponse,
            CreateUserRequest,
            VerifyEmailResponse,
            UpdateCartRequest,
            CartResponse,
            CreateAdminUserRequest,
            UpdateAdminUserRequest,
            AdminUserResponse,
            CreateRoleRequest,
            UpdateRoleRequest,
            RoleResponse,
            CreatePermissionRequest,
            CreateProductRequest,
            CreateCouponRequest,
            OrderProductInput,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderResponse,
            PayMethodsResponse,
            MessageResponse,
            ErrorBody,
            health::HealthData,
            Paginated<Role>,
            Paginated<Product>,
            Paginated<Coupon>,
            Paginated<Order>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login and token renewal"),
        (name = "Users", description = "Shopper accounts and email verification"),
        (name = "Cart", description = "Shopper cart"),
        (name = "Admin Users", description = "Back-office accounts"),
        (name = "Roles", description = "Roles and their permission sets"),
        (name = "Permissions", description = "Permission catalogue"),
        (name = "Products", description = "Product catalogue"),
        (name = "Coupons", description = "Discount coupons"),
        (name = "Orders", description = "Order management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn every_admin_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/admin/login",
            "/admin/admin_user/{id}",
            "/admin/roles",
            "/admin/permissions",
            "/admin/product",
            "/admin/coupons",
            "/admin/order/pay_methods/option",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
