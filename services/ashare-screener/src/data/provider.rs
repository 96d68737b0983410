//! Snapshot provider abstraction.
//!
//! Defines the `SnapshotProvider` trait implemented by market-data sources.
//! The service core depends on providers solely through this trait, so tests
//! can substitute a scripted implementation.

use async_trait::async_trait;
use std::fmt;

use super::RawSnapshot;

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to snapshot providers.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Network error (connection failed, DNS, transport)
    Network(String),
    /// Upstream returned an error payload (non-zero return code, empty body)
    Upstream(String),
    /// Response could not be decoded into the expected shape
    Decode(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            Self::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

// ============================================================================
// Snapshot Provider Trait
// ============================================================================

/// Trait for market snapshot providers.
///
/// A provider exposes "fetch full A-share spot snapshot" as a single call
/// returning a table keyed by whatever column schema the upstream uses.
/// There is one fetch per inbound request: no caching, no retry, no
/// deduplication of concurrent in-flight fetches.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Get the provider name (e.g., "eastmoney")
    fn name(&self) -> &'static str;

    /// Check if the provider is reachable.
    ///
    /// Should be a lightweight call; used by the health endpoint only,
    /// never on the screening path.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Fetch the full spot snapshot of the A-share market.
    async fn fetch_spot_snapshot(&self) -> Result<RawSnapshot, ProviderError>;
}

// ============================================================================
// Tests
// ============================================================================
