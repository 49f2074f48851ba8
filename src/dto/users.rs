use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validate_account;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        length(min = 8, message = "account must be at least 8 characters"),
        custom(function = "validate_account")
    )]
    pub account: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,
    #[validate(range(min = 0, max = 2, message = "genderId must be 0, 1 or 2"))]
    pub gender_id: i16,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub post_code: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VerifyEmailQuery {
    #[validate(range(min = 1, message = "emailId must be positive"))]
    pub email_id: i64,
    #[validate(length(min = 32, max = 128, message = "secretCode must be 32 to 128 characters"))]
    pub secret_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    pub is_verified: bool,
}
