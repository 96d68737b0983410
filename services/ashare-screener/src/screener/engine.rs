//! Screening engine.
//!
//! Turns a raw provider snapshot into a ranked, bounded result set:
//! reconciliation → per-cell coercion → predicate filter → sort → truncate.
//!
//! Missing-value policy (deliberate, inherited from the original contract):
//! price and change_pct exclude rows where the value is missing; the pe cap
//! is permissive and lets missing-pe rows through. The pe cap is applied at
//! all only when at least one row in the snapshot carries a pe value.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::RawSnapshot;

use super::config::ScreenFilter;
use super::schema::{reconcile, ColumnMap, MissingFieldError};

/// Maximum number of rows returned from a screening run.
pub const MAX_RESULTS: usize = 100;

// ============================================================================
// Market Row
// ============================================================================

/// One instrument in canonical form.
///
/// Numeric fields that failed coercion are `None` (missing), never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRow {
    /// Instrument code (e.g., "000001")
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Last price
    pub price: Option<f64>,
    /// Change percent on the day
    pub change_pct: Option<f64>,
    /// Price/earnings ratio
    pub pe: Option<f64>,
    /// Price/book ratio
    pub pb: Option<f64>,
    /// Traded volume
    pub volume: Option<i64>,
}

// ============================================================================
// Coercion
// ============================================================================

/// Placeholder strings the provider uses for not-applicable values.
const PLACEHOLDERS: &[&str] = &["-", "—", "--", "N/A", "n/a"];

/// Parse a provider-native cell into a decimal.
///
/// Trims, treats placeholders and empty cells as missing, strips thousands
/// separators. Unparseable values become missing, never an error.
fn parse_decimal(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() || PLACEHOLDERS.contains(&text) {
        return None;
    }

    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a volume cell into an integer count.
fn parse_volume(cell: Option<&str>) -> Option<i64> {
    parse_decimal(cell).map(|v| v.round() as i64)
}

// ============================================================================
// Screen Outcome
// ============================================================================

/// Result of a screening run.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenOutcome {
    /// Rows that passed, sorted and truncated
    pub rows: Vec<MarketRow>,
    /// Rows materialized from the snapshot before filtering
    pub total_scanned: usize,
}

// ============================================================================
// Screen Engine
// ============================================================================

/// The screening engine: one filter configuration, applied per snapshot.
pub struct ScreenEngine {
    filter: ScreenFilter,
}

impl ScreenEngine {
    /// Create an engine for the given filter configuration.
    pub fn new(filter: ScreenFilter) -> Self {
        Self { filter }
    }

    /// Run the full pipeline against a snapshot.
    pub fn run(&self, snapshot: &RawSnapshot) -> Result<ScreenOutcome, MissingFieldError> {
        let map = reconcile(snapshot)?;

        let rows = materialize(snapshot, &map);
        let total_scanned = rows.len();

        // The pe cap only engages when the snapshot carries pe data at all
        let pe_present = rows.iter().any(|r| r.pe.is_some());

        let mut passed: Vec<MarketRow> = rows
            .into_iter()
            .filter(|row| {
                self.passes_price(row)
                    && self.passes_change(row)
                    && (!pe_present || self.passes_pe(row))
            })
            .collect();

        self.sort(&mut passed);
        passed.truncate(MAX_RESULTS);

        debug!(
            scanned = total_scanned,
            passed = passed.len(),
            pe_cap_active = pe_present,
            "Screen complete"
        );

        Ok(ScreenOutcome {
            rows: passed,
            total_scanned,
        })
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    /// Inclusive price range; missing price excluded.
    fn passes_price(&self, row: &MarketRow) -> bool {
        match row.price {
            Some(p) => p >= self.filter.price_min && p <= self.filter.price_max,
            None => false,
        }
    }

    /// Inclusive change floor; missing change excluded.
    fn passes_change(&self, row: &MarketRow) -> bool {
        match row.change_pct {
            Some(c) => c >= self.filter.change_min,
            None => false,
        }
    }

    /// Inclusive pe cap; missing pe passes ("unknown, don't exclude").
    fn passes_pe(&self, row: &MarketRow) -> bool {
        match row.pe {
            Some(pe) => pe <= self.filter.pe_max,
            None => true,
        }
    }

    // ========================================================================
    // Sort
    // ========================================================================

    /// Stable descending sort by the configured field.
    ///
    /// An unrecognized field name leaves provider order untouched. Missing
    /// values order after present ones.
    fn sort(&self, rows: &mut [MarketRow]) {
        let Some(field) = SortField::resolve(&self.filter.sort_by) else {
            return;
        };

        match field {
            SortField::Price => rows.sort_by(|a, b| desc_option(a.price, b.price)),
            SortField::ChangePct => rows.sort_by(|a, b| desc_option(a.change_pct, b.change_pct)),
            SortField::Pe => rows.sort_by(|a, b| desc_option(a.pe, b.pe)),
            SortField::Pb => rows.sort_by(|a, b| desc_option(a.pb, b.pb)),
            SortField::Volume => rows.sort_by(|a, b| desc_option(a.volume, b.volume)),
            SortField::Symbol => rows.sort_by(|a, b| b.symbol.cmp(&a.symbol)),
            SortField::Name => rows.sort_by(|a, b| b.name.cmp(&a.name)),
        }
    }
}

/// Output fields a result set can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    Price,
    ChangePct,
    Pe,
    Pb,
    Volume,
    Symbol,
    Name,
}

impl SortField {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "price" => Some(Self::Price),
            "change_pct" => Some(Self::ChangePct),
            "pe" => Some(Self::Pe),
            "pb" => Some(Self::Pb),
            "volume" => Some(Self::Volume),
            "symbol" => Some(Self::Symbol),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

/// Descending comparison over optional values, missing last.
fn desc_option<T: PartialOrd>(a: Option<T>, b: Option<T>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Materialize canonical rows from the snapshot.
///
/// Rows with an empty symbol cell are dropped before predicates run.
fn materialize(snapshot: &RawSnapshot, map: &ColumnMap) -> Vec<MarketRow> {
    let mut rows = Vec::with_capacity(snapshot.len());

    for i in 0..snapshot.len() {
        let symbol = snapshot.cell(i, map.symbol).unwrap_or("").trim();
        if symbol.is_empty() {
            continue;
        }

        let optional_cell = |col: Option<usize>| col.and_then(|c| snapshot.cell(i, c));

        rows.push(MarketRow {
            symbol: symbol.to_string(),
            name: snapshot.cell(i, map.name).unwrap_or("").trim().to_string(),
            price: parse_decimal(snapshot.cell(i, map.price)),
            change_pct: parse_decimal(snapshot.cell(i, map.change_pct)),
            pe: parse_decimal(optional_cell(map.pe)),
            pb: parse_decimal(optional_cell(map.pb)),
            volume: parse_volume(optional_cell(map.volume)),
        });
    }

    rows
}

// ============================================================================
// Tests
// ============================================================================
