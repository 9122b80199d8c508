//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::EscrowError;

/// Request body carrying a single amount (contributions, deposits,
/// repayments and credits).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AmountRequest {
    /// Units, as a decimal string.
    #[schema(example = "9")]
    pub amount: String,
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Slices one page out of `items` and builds the matching metadata.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let params = self.clamped();
        let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let total_pages = total.div_ceil(params.per_page);
        let start = (params.page - 1).saturating_mul(params.per_page) as usize;
        let page = items
            .into_iter()
            .skip(start)
            .take(params.per_page as usize)
            .collect();
        (
            page,
            PaginationMeta {
                page: params.page,
                per_page: params.per_page,
                total,
                total_pages,
            },
        )
    }
}

/// Parses a decimal amount string.
///
/// # Errors
///
/// Returns [`EscrowError::InvalidAmount`] if `raw` is not a non-negative
/// integer that fits in `u128`.
pub fn parse_amount(field: &str, raw: &str) -> Result<u128, EscrowError> {
    raw.trim()
        .parse::<u128>()
        .map_err(|e| EscrowError::InvalidAmount(format!("{field} '{raw}': {e}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_large_values() {
        let max = u128::MAX.to_string();
        assert_eq!(parse_amount("amount", &max).ok(), Some(u128::MAX));
        assert_eq!(parse_amount("amount", " 7 ").ok(), Some(7));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        for raw in ["", "-1", "1.5", "ten"] {
            assert!(matches!(
                parse_amount("amount", raw),
                Err(EscrowError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn paginate_slices_and_counts() {
        let params = PaginationParams {
            page: 2,
            per_page: 2,
        };
        let (page, meta) = params.paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(page, [3, 4]);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn paginate_empty_has_no_pages() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        };
        let (page, meta) = params.paginate(Vec::<u8>::new());
        assert!(page.is_empty());
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 100);
        assert_eq!(meta.total_pages, 0);
    }
}
