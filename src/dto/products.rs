use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[validate(range(min = 0, message = "originPrice must not be negative"))]
    pub origin_price: i64,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,
    #[validate(length(min = 1, message = "unit is required"))]
    pub unit: String,
    #[validate(range(min = 0, max = 1, message = "status must be 0 or 1"))]
    pub status: i16,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images_url: Vec<String>,
}
