use serde::Deserialize;
use utoipa::IntoParams;

/// Common query parameters for list endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl PaginationParams {
    /// Clamp into sane bounds: page >= 1, 1 <= per_page <= 100.
    pub fn clamped(&self) -> (u64, u64) {
        (self.page.max(1), self.per_page.clamp(1, 100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let params = PaginationParams {
            page: 0,
            per_page: 1000,
            search: None,
        };
        assert_eq!(params.clamped(), (1, 100));

        let params = PaginationParams {
            page: 3,
            per_page: 25,
            search: None,
        };
        assert_eq!(params.clamped(), (3, 25));
    }
}
