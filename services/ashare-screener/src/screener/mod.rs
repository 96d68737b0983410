//! Screening core: reconciliation, coercion, filtering, ranking.

mod config;
mod engine;
mod schema;

pub use config::ScreenFilter;
pub use engine::{MarketRow, ScreenEngine, ScreenOutcome, MAX_RESULTS};
pub use schema::{reconcile, CanonicalField, ColumnMap, MissingFieldError};

use thiserror::Error;

use crate::data::ProviderError;

/// Errors a screening request can fail with.
///
/// Both variants are recovered at the handler boundary and serialized into
/// the response body; neither is fatal to the service.
#[derive(Error, Debug)]
pub enum ScreenError {
    /// The provider snapshot fetch failed
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// A required canonical field could not be reconciled
    #[error("{0}")]
    MissingField(#[from] MissingFieldError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_error_from_provider() {
        let err: ScreenError = ProviderError::Network("timeout".into()).into();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_screen_error_from_missing_field() {
        let err: ScreenError = MissingFieldError {
            field: "price",
            available_columns: vec!["代码".to_string()],
        }
        .into();
        assert!(err.to_string().contains("price"));
    }
}
