//! Market data module for A-shares.
//!
//! Provides the raw snapshot table type and the provider abstraction used
//! to fetch it. The screening core never talks to an upstream API directly;
//! it consumes a [`RawSnapshot`] whose column labels are whatever the
//! provider published (Chinese headers, abbreviations, alternate English
//! labels) and leaves the mapping to the reconciliation layer.

mod provider;
mod eastmoney;

pub use provider::{ProviderError, SnapshotProvider};
pub use eastmoney::EastmoneyAdapter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Snapshot
// ============================================================================

/// One point-in-time fetch of the full market table, in provider-native form.
///
/// Cells are kept as strings exactly as the provider published them
/// (including placeholder values like `-`); numeric interpretation happens
/// later, per cell, in the screening engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Column labels as published by the provider
    pub columns: Vec<String>,
    /// Row cells, positionally aligned with `columns`
    pub rows: Vec<Vec<String>>,
    /// When the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl RawSnapshot {
    /// Create a snapshot from columns and rows, stamped now.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            rows,
            fetched_at: Utc::now(),
        }
    }

    /// Find the position of a column by its exact label.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Get a cell by row and column index.
    ///
    /// Ragged rows are tolerated: an out-of-range column reads as `None`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Number of rows in the snapshot.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the snapshot has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
