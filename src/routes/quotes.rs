//! # routes::quotes
//!
//! | Method | Path        | Layer        | Body                                   |
//! |--------|-------------|--------------|----------------------------------------|
//! | GET    | `/quotes`   | data source  | `[Quote]`                              |
//! | GET    | `/average`  | aggregation  | `AverageResult`                        |
//! | GET    | `/slippage` | analytical   | `SlippageReport`                       |
//!
//! All three read through the cache, so any of them may trigger a fetch
//! cycle when the cached set is stale.

use axum::{extract::State, Json};
use tracing::debug;

use crate::{
    engine::aggregator,
    error::AppError,
    models::{AverageResult, Quote, SlippageReport},
    state::SharedState,
};

// ─── GET /quotes ──────────────────────────────────────────────────────────────

pub async fn get_quotes(State(state): State<SharedState>) -> Json<Vec<Quote>> {
    let lookup = state.cache.get().await;
    let fetched_at = state.cache.last_refreshed().await;

    debug!(
        count      = lookup.quotes.len(),
        mocked     = lookup.quotes.iter().filter(|q| q.is_mocked()).count(),
        refreshed  = lookup.refreshed,
        fetched_at = ?fetched_at,
        "Quotes served"
    );

    Json(lookup.quotes.as_ref().clone())
}

// ─── GET /average ─────────────────────────────────────────────────────────────

pub async fn get_average(
    State(state): State<SharedState>,
) -> Result<Json<AverageResult>, AppError> {
    let lookup = state.cache.get().await;
    debug!(quotes = ?lookup.quotes, "Quotes fetched for average");

    let result = aggregator::average(&lookup.quotes)
        .map_err(AppError::aggregation("Failed to calculate averages"))?;

    Ok(Json(result))
}

// ─── GET /slippage ────────────────────────────────────────────────────────────

pub async fn get_slippage(
    State(state): State<SharedState>,
) -> Result<Json<SlippageReport>, AppError> {
    let lookup = state.cache.get().await;
    debug!(quotes = ?lookup.quotes, "Quotes fetched for slippage");

    let report = aggregator::slippage(&lookup.quotes)
        .map_err(AppError::aggregation("Failed to calculate slippage"))?;

    Ok(Json(report))
}
