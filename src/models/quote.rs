//! # models::quote
//!
//! Defines [`Quote`], the normalized record every source is reduced to, plus
//! the derived shapes returned by `/average` and `/slippage`.
//!
//! Field names are the wire contract: the front-end reads `buy_price`,
//! `sell_price`, `average_buy_price` etc. straight out of the JSON.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Markup applied to an observed buy price to derive the sell side (1%).
pub const SELL_MARKUP: f64 = 1.01;

/// Mocked buy prices are drawn uniformly from this range.
pub const MOCK_BUY_MIN: f64 = 5.00;
pub const MOCK_BUY_MAX: f64 = 5.20;

/// Fixed spread added to a mocked buy price.
pub const MOCK_SPREAD: f64 = 0.05;

/// Suffix appended to `source` when a quote was fabricated.
pub const MOCK_SUFFIX: &str = " (mocked)";

// ─── Quote ────────────────────────────────────────────────────────────────────

/// One observation of the BRL rate from a single source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Source URL. Ends with `" (mocked)"` when the price is synthetic.
    pub source: String,

    /// Units of quote currency per 1 BRL.
    pub buy_price: f64,

    /// Always above `buy_price` in every generation path.
    pub sell_price: f64,
}

impl Quote {
    /// Quote built from a price actually read off a source.
    pub fn observed(source: &str, buy_price: f64) -> Self {
        Self {
            source: source.to_string(),
            buy_price,
            sell_price: round_dp(buy_price * SELL_MARKUP, 4),
        }
    }

    /// Randomized substitute for a source that could not be read.
    pub fn mocked<R: Rng>(source: &str, rng: &mut R) -> Self {
        let buy_price = round_dp(rng.random_range(MOCK_BUY_MIN..=MOCK_BUY_MAX), 2);

        Self {
            source: format!("{source}{MOCK_SUFFIX}"),
            buy_price,
            sell_price: round_dp(buy_price + MOCK_SPREAD, 2),
        }
    }

    #[inline]
    pub fn is_mocked(&self) -> bool {
        self.source.ends_with(MOCK_SUFFIX)
    }
}

// ─── QuoteSet ─────────────────────────────────────────────────────────────────

/// Result of one full fetch cycle. Replaced wholesale on refresh, never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct QuoteSet {
    pub quotes: Arc<Vec<Quote>>,
    pub fetched_at: DateTime<Utc>,
}

impl QuoteSet {
    pub fn new(quotes: Vec<Quote>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            quotes: Arc::new(quotes),
            fetched_at,
        }
    }
}

// ─── Derived Results ──────────────────────────────────────────────────────────

/// Body of `GET /average`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageResult {
    pub average_buy_price: f64,
    pub average_sell_price: f64,
    pub total_sources: usize,
}

/// Relative deviation of one source from the cross-source mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageEntry {
    pub source: String,
    pub buy_price_slippage: f64,
    pub sell_price_slippage: f64,
}

/// Body of `GET /slippage`. The averages here are deliberately unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageReport {
    pub average_buy: f64,
    pub average_sell: f64,
    pub slippage: Vec<SlippageEntry>,
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Round `value` to `places` decimals, halves away from zero.
#[inline]
pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
