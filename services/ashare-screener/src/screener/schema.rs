//! Canonical field set and column reconciliation.
//!
//! The external provider labels its columns however it likes; across
//! versions the same table has shipped Chinese headers, abbreviations and
//! alternate English names. Reconciliation maps that moving target onto a
//! fixed canonical field set, once per request, via an ordered alias table.

use serde::Serialize;
use std::fmt;

use crate::data::RawSnapshot;

// ============================================================================
// Canonical Fields
// ============================================================================

/// One of the seven standardized output attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Symbol,
    Name,
    Price,
    ChangePct,
    Pe,
    Pb,
    Volume,
}

impl CanonicalField {
    /// All canonical fields, in output order.
    pub const ALL: [CanonicalField; 7] = [
        Self::Symbol,
        Self::Name,
        Self::Price,
        Self::ChangePct,
        Self::Pe,
        Self::Pb,
        Self::Volume,
    ];

    /// The canonical output name of this field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Name => "name",
            Self::Price => "price",
            Self::ChangePct => "change_pct",
            Self::Pe => "pe",
            Self::Pb => "pb",
            Self::Volume => "volume",
        }
    }

    /// Ordered list of acceptable source-column labels.
    ///
    /// The first label present in the snapshot wins. The canonical name
    /// itself always leads, so an already-normalized table reconciles to
    /// identity.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Symbol => &["symbol", "代码", "股票代码", "code"],
            Self::Name => &["name", "名称", "股票简称", "股票名称"],
            Self::Price => &["price", "最新价", "现价", "latest_price", "close"],
            Self::ChangePct => &["change_pct", "涨跌幅", "pct_chg", "change_percent"],
            Self::Pe => &["pe", "市盈率-动态", "市盈率", "pe_ttm", "pe_dynamic"],
            Self::Pb => &["pb", "市净率"],
            Self::Volume => &["volume", "成交量", "vol"],
        }
    }

    /// Whether reconciliation must find this field for screening to proceed.
    pub fn is_required(self) -> bool {
        matches!(self, Self::Symbol | Self::Name | Self::Price | Self::ChangePct)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Missing Field Error
// ============================================================================

/// A required canonical field could not be reconciled against the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct MissingFieldError {
    /// Canonical name of the field that could not be found
    pub field: &'static str,
    /// Columns actually present in the snapshot, for diagnostics
    pub available_columns: Vec<String>,
}

impl fmt::Display for MissingFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Required field '{}' not found in snapshot (available columns: {})",
            self.field,
            self.available_columns.join(", ")
        )
    }
}

impl std::error::Error for MissingFieldError {}

// ============================================================================
// Column Map
// ============================================================================

/// Positions of the canonical fields inside one snapshot's column set.
///
/// Required fields are always resolved; optional fields may be `None`, in
/// which case every row reads as missing for that field ("no constraint").
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub symbol: usize,
    pub name: usize,
    pub price: usize,
    pub change_pct: usize,
    pub pe: Option<usize>,
    pub pb: Option<usize>,
    pub volume: Option<usize>,
}

/// Reconcile a snapshot's column labels against the canonical field set.
///
/// Fails with [`MissingFieldError`] on the first required field with no
/// matching alias; optional fields degrade to absent.
pub fn reconcile(snapshot: &RawSnapshot) -> Result<ColumnMap, MissingFieldError> {
    let find = |field: CanonicalField| -> Option<usize> {
        field
            .aliases()
            .iter()
            .find_map(|alias| snapshot.column_index(alias))
    };

    let require = |field: CanonicalField| -> Result<usize, MissingFieldError> {
        find(field).ok_or_else(|| MissingFieldError {
            field: field.key(),
            available_columns: snapshot.columns.clone(),
        })
    };

    Ok(ColumnMap {
        symbol: require(CanonicalField::Symbol)?,
        name: require(CanonicalField::Name)?,
        price: require(CanonicalField::Price)?,
        change_pct: require(CanonicalField::ChangePct)?,
        pe: find(CanonicalField::Pe),
        pb: find(CanonicalField::Pb),
        volume: find(CanonicalField::Volume),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(columns: &[&str]) -> RawSnapshot {
        RawSnapshot::new(columns.iter().map(|c| c.to_string()).collect(), vec![])
    }

    #[test]
    fn test_reconcile_chinese_headers() {
        let snap = snapshot_with(&["代码", "名称", "最新价", "涨跌幅", "市盈率-动态", "市净率", "成交量"]);
        let map = reconcile(&snap).unwrap();
        assert_eq!(map.symbol, 0);
        assert_eq!(map.change_pct, 3);
        assert_eq!(map.pe, Some(4));
        assert_eq!(map.volume, Some(6));
    }

    #[test]
    fn test_reconcile_canonical_headers_identity() {
        let snap = snapshot_with(&["symbol", "name", "price", "change_pct", "pe", "pb", "volume"]);
        let map = reconcile(&snap).unwrap();
        assert_eq!(map.symbol, 0);
        assert_eq!(map.pb, Some(5));
    }

    #[test]
    fn test_reconcile_mixed_aliases() {
        // Alternate English labels from an older provider version
        let snap = snapshot_with(&["code", "名称", "latest_price", "pct_chg"]);
        let map = reconcile(&snap).unwrap();
        assert_eq!(map.symbol, 0);
        assert_eq!(map.price, 2);
        assert_eq!(map.change_pct, 3);
        assert_eq!(map.pe, None);
        assert_eq!(map.pb, None);
    }

    #[test]
    fn test_reconcile_alias_order_first_match_wins() {
        // Both the canonical name and a Chinese alias present: canonical
        // leads the alias list, so it wins.
        let snap = snapshot_with(&["涨跌幅", "change_pct", "symbol", "name", "price"]);
        let map = reconcile(&snap).unwrap();
        assert_eq!(map.change_pct, 1);
    }

    #[test]
    fn test_reconcile_missing_required_field() {
        let snap = snapshot_with(&["代码", "名称", "最新价"]);
        let err = reconcile(&snap).unwrap_err();
        assert_eq!(err.field, "change_pct");
        assert_eq!(err.available_columns, vec!["代码", "名称", "最新价"]);
        assert!(err.to_string().contains("change_pct"));
        assert!(err.to_string().contains("最新价"));
    }

    #[test]
    fn test_reconcile_optional_fields_degrade() {
        let snap = snapshot_with(&["代码", "名称", "最新价", "涨跌幅"]);
        let map = reconcile(&snap).unwrap();
        assert_eq!(map.pe, None);
        assert_eq!(map.pb, None);
        assert_eq!(map.volume, None);
    }

    #[test]
    fn test_required_field_set() {
        let required: Vec<&str> = CanonicalField::ALL
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.key())
            .collect();
        assert_eq!(required, vec!["symbol", "name", "price", "change_pct"]);
    }
}
