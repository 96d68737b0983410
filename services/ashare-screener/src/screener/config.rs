//! Screen filter configuration.
//!
//! One `ScreenFilter` is built per request from the query string; the
//! serde defaults double as the documented parameter defaults.

use serde::{Deserialize, Serialize};

// ============================================================================
// Screen Filter
// ============================================================================

/// Filter configuration for a single screening request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenFilter {
    /// Maximum P/E ratio (inclusive). Rows with missing P/E are NOT
    /// excluded by this bound; see the engine for the full policy.
    #[serde(default = "default_pe_max")]
    pub pe_max: f64,

    /// Minimum price (inclusive)
    #[serde(default = "default_price_min")]
    pub price_min: f64,

    /// Maximum price (inclusive)
    #[serde(default = "default_price_max")]
    pub price_max: f64,

    /// Minimum change percent (inclusive)
    #[serde(default = "default_change_min")]
    pub change_min: f64,

    /// Output field to sort descending by. A name that matches no output
    /// field skips sorting and keeps provider order. Missing values sort
    /// after present ones.
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

impl Default for ScreenFilter {
    fn default() -> Self {
        Self {
            pe_max: default_pe_max(),
            price_min: default_price_min(),
            price_max: default_price_max(),
            change_min: default_change_min(),
            sort_by: default_sort_by(),
        }
    }
}

fn default_pe_max() -> f64 {
    50.0
}

fn default_price_min() -> f64 {
    0.0
}

fn default_price_max() -> f64 {
    200.0
}

fn default_change_min() -> f64 {
    -10.0
}

fn default_sort_by() -> String {
    "change_pct".to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = ScreenFilter::default();
        assert!((filter.pe_max - 50.0).abs() < 0.001);
        assert!((filter.price_min - 0.0).abs() < 0.001);
        assert!((filter.price_max - 200.0).abs() < 0.001);
        assert!((filter.change_min - (-10.0)).abs() < 0.001);
        assert_eq!(filter.sort_by, "change_pct");
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let filter: ScreenFilter = serde_json::from_str(r#"{"pe_max": 20.0}"#).unwrap();
        assert!((filter.pe_max - 20.0).abs() < 0.001);
        assert!((filter.price_max - 200.0).abs() < 0.001);
        assert_eq!(filter.sort_by, "change_pct");
    }

    #[test]
    fn test_inverted_price_range_is_not_rejected() {
        // The range is caller responsibility; an inverted range simply
        // matches nothing at the predicate stage.
        let filter: ScreenFilter =
            serde_json::from_str(r#"{"price_min": 100.0, "price_max": 10.0}"#).unwrap();
        assert!(filter.price_min > filter.price_max);
    }
}
