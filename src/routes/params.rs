use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

/// `?page=&page_size=`, 1-based.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<u64>,
}

impl Pagination {
    /// `(limit, offset)`, defaulting to the first page of 10.
    pub fn normalize(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(10).clamp(1, 100);
        (page_size, (page - 1).saturating_mul(page_size))
    }
}

/// `?pageId=&pageSize=` with a page size of 5 to 10.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageIdQuery {
    #[validate(range(min = 1, message = "pageId must be at least 1"))]
    pub page_id: u64,
    #[validate(range(min = 5, max = 10, message = "pageSize must be between 5 and 10"))]
    pub page_size: u64,
}

impl PageIdQuery {
    pub fn limit_offset(&self) -> (u64, u64) {
        (
            self.page_size,
            self.page_id.saturating_sub(1).saturating_mul(self.page_size),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_to_first_page() {
        assert_eq!(Pagination::default().normalize(), (10, 0));
        let third = Pagination {
            page: Some(3),
            page_size: Some(20),
        };
        assert_eq!(third.normalize(), (20, 40));
    }

    #[test]
    fn page_size_outside_five_to_ten_is_rejected() {
        let query = PageIdQuery {
            page_id: 1,
            page_size: 4,
        };
        assert!(query.validate().is_err());

        let query = PageIdQuery {
            page_id: 2,
            page_size: 5,
        };
        assert!(query.validate().is_ok());
        assert_eq!(query.limit_offset(), (5, 5));
    }
}
