//! Request and response bodies.

use validator::ValidationError;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod users;

/// Lowercase ASCII letters and digits only.
pub fn validate_account(account: &str) -> Result<(), ValidationError> {
    if account
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(ValidationError::new("account")
            .with_message("account must contain only lowercase letters and digits".into()))
    }
}
