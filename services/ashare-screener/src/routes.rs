//! HTTP routes for the screening service.
//!
//! Error contract: every logical failure (provider fetch, reconciliation,
//! anything unexpected) is reported as HTTP 200 with `success: false` in
//! the body. Existing callers switch on the `success` flag and never see
//! transport-level status codes.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::screener::{MarketRow, ScreenEngine, ScreenError, ScreenFilter};
use crate::ScreenerState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub usage: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Echo of the numeric filters applied to a successful screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersApplied {
    pub pe_max: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub change_min: f64,
}

impl From<&ScreenFilter> for FiltersApplied {
    fn from(filter: &ScreenFilter) -> Self {
        Self {
            pe_max: filter.pe_max,
            price_min: filter.price_min,
            price_max: filter.price_max,
            change_min: filter.change_min,
        }
    }
}

/// Wire envelope for `/api/screen`.
#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<MarketRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters_applied: Option<FiltersApplied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_columns: Option<Vec<String>>,
}

impl ScreenResponse {
    fn ok(rows: Vec<MarketRow>, filters: FiltersApplied) -> Self {
        Self {
            success: true,
            count: Some(rows.len()),
            data: Some(rows),
            filters_applied: Some(filters),
            error: None,
            available_columns: None,
        }
    }

    fn failure(err: ScreenError) -> Self {
        let available_columns = match &err {
            ScreenError::MissingField(e) => Some(e.available_columns.clone()),
            ScreenError::Provider(_) => None,
        };

        Self {
            success: false,
            count: None,
            data: None,
            filters_applied: None,
            error: Some(err.to_string()),
            available_columns,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Root info endpoint
pub async fn root() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: "A股筛选器API运行正常",
        usage: "访问 /api/screen 进行筛选",
        service: "ashare-screener",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ashare-screener",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Core screening endpoint.
///
/// Fetches a fresh snapshot, runs the screening pipeline, and serializes
/// either the ranked result set or the failure into the body.
pub async fn screen(
    State(state): State<Arc<ScreenerState>>,
    Query(filter): Query<ScreenFilter>,
) -> Json<ScreenResponse> {
    match run_screen(&state, &filter).await {
        Ok(rows) => {
            tracing::info!(
                count = rows.len(),
                sort_by = %filter.sort_by,
                "Screen request served"
            );
            Json(ScreenResponse::ok(rows, FiltersApplied::from(&filter)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Screen request failed");
            Json(ScreenResponse::failure(e))
        }
    }
}

async fn run_screen(
    state: &ScreenerState,
    filter: &ScreenFilter,
) -> Result<Vec<MarketRow>, ScreenError> {
    let snapshot = state.provider.fetch_spot_snapshot().await?;

    tracing::debug!(
        rows = snapshot.len(),
        provider = state.provider.name(),
        "Snapshot fetched"
    );

    let outcome = ScreenEngine::new(filter.clone()).run(&snapshot)?;
    Ok(outcome.rows)
}

// ============================================================================
// Router Builder
// ============================================================================

/// Build the screening HTTP router.
pub fn build_router(state: Arc<ScreenerState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/screen", get(screen))
        .with_state(state)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::data::{ProviderError, RawSnapshot, SnapshotProvider};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Provider that serves a scripted snapshot or a scripted failure.
    struct ScriptedProvider {
        result: Result<RawSnapshot, ProviderError>,
    }

    #[async_trait]
    impl SnapshotProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn fetch_spot_snapshot(&self) -> Result<RawSnapshot, ProviderError> {
            self.result.clone()
        }
    }

    fn chinese_snapshot() -> RawSnapshot {
        RawSnapshot::new(
            ["代码", "名称", "最新价", "涨跌幅", "市盈率-动态", "市净率", "成交量"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![
                vec!["000001", "平安银行", "10.5", "2.1", "5.2", "0.8", "1234567"],
                vec!["600519", "贵州茅台", "1700.0", "1.0", "30.0", "9.0", "34567"],
                vec!["300750", "宁德时代", "180.0", "12.0", "-", "4.0", "765432"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        )
    }

    fn app_with(result: Result<RawSnapshot, ProviderError>) -> Router {
        let state = Arc::new(ScreenerState::new(
            Settings::default(),
            Arc::new(ScriptedProvider { result }),
        ));
        build_router(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = app_with(Ok(chinese_snapshot()));
        let (status, body) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["usage"].as_str().unwrap().contains("/api/screen"));
        assert_eq!(body["service"], "ashare-screener");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app_with(Ok(chinese_snapshot()));
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_screen_defaults_reconcile_chinese_headers() {
        let app = app_with(Ok(chinese_snapshot()));
        let (status, body) = get_json(app, "/api/screen").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        // 贵州茅台 fails price_max=200; the other two pass
        assert_eq!(body["count"], 2);

        // Output always uses canonical names, not provider labels
        let first = &body["data"][0];
        assert!(first.get("symbol").is_some());
        assert!(first.get("change_pct").is_some());
        assert!(first.get("涨跌幅").is_none());

        // Default sort: change_pct descending
        assert_eq!(body["data"][0]["symbol"], "300750");
        assert_eq!(body["data"][1]["symbol"], "000001");

        let filters = &body["filters_applied"];
        assert_eq!(filters["pe_max"], 50.0);
        assert_eq!(filters["change_min"], -10.0);
    }

    #[tokio::test]
    async fn test_screen_query_params_applied() {
        let app = app_with(Ok(chinese_snapshot()));
        let (status, body) = get_json(app, "/api/screen?price_max=50&sort_by=pe").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["symbol"], "000001");
        assert_eq!(body["filters_applied"]["price_max"], 50.0);
    }

    #[tokio::test]
    async fn test_screen_missing_column_diagnostics() {
        let snapshot = RawSnapshot::new(
            vec!["代码".to_string(), "名称".to_string(), "最新价".to_string()],
            vec![],
        );
        let app = app_with(Ok(snapshot));
        let (status, body) = get_json(app, "/api/screen").await;

        // Logical failure, transport success
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("change_pct"));
        let columns = body["available_columns"].as_array().unwrap();
        assert_eq!(columns.len(), 3);
    }

    #[tokio::test]
    async fn test_screen_provider_failure_in_body() {
        let app = app_with(Err(ProviderError::Network("connection refused".into())));
        let (status, body) = get_json(app, "/api/screen").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
        assert!(body.get("available_columns").is_none());
        assert!(body.get("data").is_none());
    }
}
