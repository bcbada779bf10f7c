//! # engine::fetcher
//!
//! **Quote Fetcher**: walks the configured sources one at a time and turns
//! each into a [`Quote`].
//!
//! ```text
//! for source in sources (fixed order, sequential):
//!     GET url  (timeout 10s)
//!       ├─ network error / timeout / non-2xx ─┐
//!       ├─ adapter finds no valid price ──────┤──▶ mocked quote, "(mocked)" suffix
//!       └─ price > 0 ─────────────────────────────▶ observed quote, sell = buy × 1.01
//! ```
//!
//! A fetch cycle never fails. Every per-source error is logged and absorbed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::adapter::{Payload, PriceSource};
use crate::models::Quote;

// ─── QuoteSource ──────────────────────────────────────────────────────────────

/// Anything that can produce a full list of quotes. The cache only knows
/// about this trait.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch(&self) -> Vec<Quote>;
}

// ─── SourceError ──────────────────────────────────────────────────────────────

/// Why a single source could not be read.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("no valid price in response")]
    NoPrice,
}

// ─── QuoteFetcher ─────────────────────────────────────────────────────────────

pub struct QuoteFetcher {
    client: reqwest::Client,
    sources: Vec<PriceSource>,
    timeout: Duration,
}

impl QuoteFetcher {
    pub fn new(client: reqwest::Client, sources: Vec<PriceSource>, timeout: Duration) -> Self {
        Self {
            client,
            sources,
            timeout,
        }
    }

    /// One full cycle over every source.
    pub async fn fetch_all(&self) -> Vec<Quote> {
        let mut quotes = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match self.fetch_price(source).await {
                Ok(buy_price) => {
                    debug!(source = %source.url, kind = %source.kind, buy_price, "Live quote");
                    quotes.push(Quote::observed(&source.url, buy_price));
                }
                Err(e) => {
                    warn!(source = %source.url, error = %e, "⚠️  Using mock data");
                    quotes.push(mock_quote(&source.url));
                }
            }
        }

        quotes
    }

    /// GET one source and run its adapter over the body.
    async fn fetch_price(&self, source: &PriceSource) -> Result<f64, SourceError> {
        let response = self
            .client
            .get(&source.url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        let body = response.text().await?;

        source
            .kind
            .extract(&Payload::decode(body))
            .ok_or(SourceError::NoPrice)
    }
}

#[async_trait]
impl QuoteSource for QuoteFetcher {
    async fn fetch(&self) -> Vec<Quote> {
        self.fetch_all().await
    }
}

/// Kept out of the async body so the thread-local RNG never lives across an
/// `.await`.
fn mock_quote(url: &str) -> Quote {
    let mut rng = rand::rng();
    Quote::mocked(url, &mut rng)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
