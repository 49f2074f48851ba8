use serde::Serialize;
use utoipa::ToSchema;

/// One page of results plus the total number of rows.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub count: u64,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(count: u64, data: Vec<T>) -> Self {
        Self { count, data }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
