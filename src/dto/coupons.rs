use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_window"))]
pub struct CreateCouponRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 64, message = "code must be 1 to 64 characters"))]
    pub code: String,
    #[validate(range(min = 1, max = 100, message = "percent must be between 1 and 100"))]
    pub percent: i32,
    /// Defaults to the time of creation.
    pub start_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

fn validate_window(req: &CreateCouponRequest) -> Result<(), ValidationError> {
    if let Some(start_at) = req.start_at {
        if req.expires_at < start_at {
            return Err(ValidationError::new("window")
                .with_message("expiresAt must not be earlier than startAt".into()));
        }
    }
    Ok(())
}
