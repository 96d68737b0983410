//! A-Share Screener Library
//!
//! A thin screening façade over the eastmoney spot feed: one endpoint
//! fetches a live snapshot of the full A-share market, normalizes the
//! provider's column labels onto a canonical field set, applies numeric
//! filters, and returns the top matches as JSON.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 ashare-screener (Rust Service)               │
//! │                          :8000                               │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌────────────────┐  ┌─────────────────┐  │
//! │  │  Snapshot    │  │  Column        │  │  Screen         │  │
//! │  │  Provider    │→ │  Reconciliation│→ │  Engine         │  │
//! │  └──────────────┘  └────────────────┘  └─────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each request is independent: fetch, screen, serialize, discard. No
//! shared mutable state, no caching, no coordination between requests.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod data;
pub mod logging;
pub mod routes;
pub mod screener;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Settings;
use crate::data::{EastmoneyAdapter, SnapshotProvider};

/// Screening service state.
pub struct ScreenerState {
    /// Configuration
    pub settings: Settings,
    /// Market snapshot provider
    pub provider: Arc<dyn SnapshotProvider>,
}

impl ScreenerState {
    /// Create state with an explicit provider.
    pub fn new(settings: Settings, provider: Arc<dyn SnapshotProvider>) -> Self {
        Self { settings, provider }
    }

    /// Create state with the production eastmoney provider.
    pub fn from_settings(settings: Settings) -> Self {
        let provider: Arc<dyn SnapshotProvider> = match settings.provider_base_url.as_deref() {
            Some(base_url) => Arc::new(EastmoneyAdapter::with_base_url(base_url)),
            None => Arc::new(EastmoneyAdapter::new()),
        };
        Self::new(settings, provider)
    }
}

/// Main screening service.
pub struct ScreenerService {
    state: Arc<ScreenerState>,
}

impl ScreenerService {
    /// Create a new service from settings.
    pub fn new(settings: Settings) -> Self {
        let state = Arc::new(ScreenerState::from_settings(settings));
        Self { state }
    }

    /// Create a service around an existing state (used by tests).
    pub fn with_state(state: Arc<ScreenerState>) -> Self {
        Self { state }
    }

    /// Start the HTTP server. Runs until the process is stopped.
    pub async fn start(self) -> Result<()> {
        let host = self.state.settings.host.clone();
        let port = self.state.settings.port;

        // Browser callers come from arbitrary origins (no-code frontends)
        let app = routes::build_router(self.state.clone()).layer(CorsLayer::permissive());

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        tracing::info!(
            address = %addr,
            provider = self.state.provider.name(),
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
