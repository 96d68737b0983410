//! Eastmoney adapter for the A-share spot snapshot.
//!
//! Fetches the full market list from the eastmoney `clist` API (免费、无限制),
//! the same upstream family used for K-line data elsewhere in the ecosystem.
//!
//! The API keys every quote by opaque field codes (`f2`, `f3`, ...). The
//! adapter maps those codes onto the column labels eastmoney publishes for
//! them and renders every cell into its textual form, placeholders included,
//! so the reconciliation layer sees the table the way the provider shows it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::provider::{ProviderError, SnapshotProvider};
use super::RawSnapshot;

// ============================================================================
// Constants
// ============================================================================

/// Eastmoney market list API base
const EASTMONEY_BASE_URL: &str = "https://push2.eastmoney.com";

/// Market filter selecting all A-share boards (SZ main/ChiNext, SH main/STAR)
const ASHARE_MARKETS: &str = "m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23";

/// Field codes requested from the API, with the column label eastmoney
/// publishes for each. Order here is the column order of the snapshot.
const FIELD_TABLE: &[(&str, &str)] = &[
    ("f12", "代码"),
    ("f14", "名称"),
    ("f2", "最新价"),
    ("f3", "涨跌幅"),
    ("f9", "市盈率-动态"),
    ("f23", "市净率"),
    ("f5", "成交量"),
];

/// Page size covering the whole market in a single request.
const FULL_MARKET_PAGE_SIZE: u32 = 50_000;

// ============================================================================
// Eastmoney Adapter
// ============================================================================

/// Eastmoney adapter for the A-share spot snapshot.
pub struct EastmoneyAdapter {
    /// HTTP client
    client: reqwest::Client,
    /// API base URL (overridable for tests)
    base_url: String,
}

impl EastmoneyAdapter {
    /// Create a new adapter against the production endpoint.
    pub fn new() -> Self {
        Self::with_base_url(EASTMONEY_BASE_URL)
    }

    /// Create an adapter against a custom base URL.
    ///
    /// No request timeout is configured: the screening model issues one
    /// fetch per inbound request and a hanging upstream blocks that request.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn clist_url(&self, page_size: u32) -> String {
        let fields: Vec<&str> = FIELD_TABLE.iter().map(|(code, _)| *code).collect();
        format!(
            "{}/api/qt/clist/get?pn=1&pz={}&po=1&np=1&fltt=2&invt=2&fid=f3&fs={}&fields={}",
            self.base_url,
            page_size,
            ASHARE_MARKETS,
            fields.join(","),
        )
    }

    async fn fetch_clist(&self, page_size: u32) -> Result<Vec<Value>, ProviderError> {
        let url = self.clist_url(page_size);
        debug!(url = %url, "Fetching spot list from eastmoney");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::Network(format!("HTTP {}", status)));
        }

        let body: ClistResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("Failed to parse response: {}", e)))?;

        if body.rc != 0 {
            return Err(ProviderError::Upstream(format!(
                "Eastmoney API error: rc={}",
                body.rc
            )));
        }

        let quotes = body.data.and_then(|d| d.diff).unwrap_or_default();
        if quotes.is_empty() {
            return Err(ProviderError::Upstream("Empty spot list".into()));
        }

        Ok(quotes)
    }
}

impl Default for EastmoneyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a JSON cell value into the textual form the table carries.
///
/// Numbers pass through verbatim; placeholder strings like `-` are kept so
/// the coercion layer can classify them as missing.
fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Convert raw quote objects into a positional snapshot table.
fn quotes_to_snapshot(quotes: &[Value]) -> RawSnapshot {
    let columns: Vec<String> = FIELD_TABLE
        .iter()
        .map(|(_, label)| (*label).to_string())
        .collect();

    let mut rows = Vec::with_capacity(quotes.len());
    for quote in quotes {
        let Some(obj) = quote.as_object() else {
            warn!("Skipping non-object quote entry");
            continue;
        };
        let row: Vec<String> = FIELD_TABLE
            .iter()
            .map(|(code, _)| obj.get(*code).map(render_cell).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    RawSnapshot::new(columns, rows)
}

// ============================================================================
// SnapshotProvider Implementation
// ============================================================================

#[async_trait]
impl SnapshotProvider for EastmoneyAdapter {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        // A one-row page is enough to prove the endpoint is alive
        self.fetch_clist(1).await.map(|_| ())
    }

    async fn fetch_spot_snapshot(&self) -> Result<RawSnapshot, ProviderError> {
        let quotes = self.fetch_clist(FULL_MARKET_PAGE_SIZE).await?;
        let snapshot = quotes_to_snapshot(&quotes);

        debug!(
            rows = snapshot.len(),
            columns = snapshot.columns.len(),
            "Spot snapshot fetched"
        );

        Ok(snapshot)
    }
}

// ============================================================================
// Eastmoney API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClistResponse {
    /// Return code (0 = success)
    rc: i32,
    /// Data
    data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
struct ClistData {
    /// Total instruments in the market
    #[allow(dead_code)]
    total: Option<i64>,
    /// Quote objects keyed by field code
    diff: Option<Vec<Value>>,
}

// ============================================================================
// Tests
// ============================================================================
