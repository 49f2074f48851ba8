pub mod admin_user_roles;
pub mod admin_users;
pub mod cart_coupons;
pub mod cart_products;
pub mod carts;
pub mod coupons;
pub mod order_coupons;
pub mod order_products;
pub mod order_status;
pub mod order_users;
pub mod orders;
pub mod pay_methods;
pub mod permissions;
pub mod products;
pub mod role_permissions;
pub mod roles;
pub mod sessions;
pub mod users;
pub mod verify_emails;

pub use admin_user_roles::Entity as AdminUserRoles;
pub use admin_users::Entity as AdminUsers;
pub use cart_coupons::Entity as CartCoupons;
pub use cart_products::Entity as CartProducts;
pub use carts::Entity as Carts;
pub use coupons::Entity as Coupons;
pub use order_coupons::Entity as OrderCoupons;
pub use order_products::Entity as OrderProducts;
pub use order_status::Entity as OrderStatus;
pub use order_users::Entity as OrderUsers;
pub use orders::Entity as Orders;
pub use pay_methods::Entity as PayMethods;
pub use permissions::Entity as Permissions;
pub use products::Entity as Products;
pub use role_permissions::Entity as RolePermissions;
pub use roles::Entity as Roles;
pub use sessions::Entity as Sessions;
pub use users::Entity as Users;
pub use verify_emails::Entity as VerifyEmails;
