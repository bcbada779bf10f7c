//! # engine::cache
//!
//! **Quote Cache**: holds the latest [`QuoteSet`] and serves it until it is
//! `ttl` old, then refreshes lazily on the next read.
//!
//! ## Locking
//!
//! * `current` is an `RwLock<Option<QuoteSet>>`: fresh reads only take the
//!   read half and clone an `Arc`, so they never wait on each other.
//! * `refresh_gate` is a `Mutex<()>` held for the whole fetch cycle. The first
//!   caller past expiry takes it and fetches; callers that queued behind it
//!   re-check freshness once they get the gate and reuse the set it stored.
//!   One expiry, one fetch.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::engine::fetcher::QuoteSource;
use crate::models::{Quote, QuoteSet};

/// How long a fetched set stays fresh (60 s).
pub const CACHE_TTL_MS: i64 = 60_000;

/// What a read returned, and whether it had to go to the sources for it.
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub quotes: Arc<Vec<Quote>>,
    pub refreshed: bool,
}

pub struct QuoteCache {
    source: Arc<dyn QuoteSource>,
    ttl: Duration,
    current: RwLock<Option<QuoteSet>>,
    refresh_gate: Mutex<()>,
}

impl QuoteCache {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self::with_ttl(source, Duration::milliseconds(CACHE_TTL_MS))
    }

    pub fn with_ttl(source: Arc<dyn QuoteSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Current quotes, refreshing first if the cached set is missing or stale.
    pub async fn get(&self) -> CacheLookup {
        self.get_at(Utc::now()).await
    }

    /// Same as [`get`](Self::get) with an explicit clock.
    pub async fn get_at(&self, now: DateTime<Utc>) -> CacheLookup {
        if let Some(quotes) = self.fresh(now).await {
            debug!("⚡ Serving from cache");
            return CacheLookup { quotes, refreshed: false };
        }

        let _gate = self.refresh_gate.lock().await;

        // Someone may have refreshed while we queued for the gate.
        if let Some(quotes) = self.fresh(now).await {
            debug!("⚡ Serving set refreshed by a concurrent request");
            return CacheLookup { quotes, refreshed: false };
        }

        info!("🔄 Fetching fresh data...");
        let set = QuoteSet::new(self.source.fetch().await, now);
        let quotes = Arc::clone(&set.quotes);

        *self.current.write().await = Some(set);

        info!(
            sources    = quotes.len(),
            fetched_at = %now.format("%H:%M:%S"),
            "✅ Cache updated"
        );

        CacheLookup { quotes, refreshed: true }
    }

    /// When the stored set was fetched. `None` until the first refresh.
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.as_ref().map(|set| set.fetched_at)
    }

    async fn fresh(&self, now: DateTime<Utc>) -> Option<Arc<Vec<Quote>>> {
        let guard = self.current.read().await;
        guard
            .as_ref()
            .filter(|set| now.signed_duration_since(set.fetched_at) < self.ttl)
            .map(|set| Arc::clone(&set.quotes))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
