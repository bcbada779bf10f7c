//! # state
//!
//! The **shared application state** injected into every Axum handler.
//!
//! The quote cache is the only mutable state in the process. It lives here
//! rather than in a module-level static so tests can build a state around a
//! synthetic [`QuoteSource`].

use std::sync::Arc;

use crate::config::AppConfig;
use crate::engine::cache::QuoteCache;
use crate::engine::fetcher::{QuoteFetcher, QuoteSource};

// ─── AppState ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    /// Latest quote set; refreshes lazily once it is 60 s old.
    pub cache: Arc<QuoteCache>,
}

impl AppState {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            cache: Arc::new(QuoteCache::new(source)),
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

/// Wire the live fetcher (one pooled `reqwest::Client` for every source) into
/// a fresh state.
pub fn build_state(config: &AppConfig) -> SharedState {
    let fetcher = QuoteFetcher::new(
        reqwest::Client::new(),
        config.sources.clone(),
        config.fetch_timeout,
    );

    Arc::new(AppState::new(Arc::new(fetcher)))
}
