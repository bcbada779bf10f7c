//! HTTP façade: JSON endpoints plus the static front-end.

pub mod quotes;

use std::any::Any;
use std::path::Path;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::error;

use crate::state::SharedState;
use quotes::{get_average, get_quotes, get_slippage};

/// Build the full application router. Anything that isn't a JSON endpoint
/// falls through to `static_dir` (`/` serves its `index.html`).
pub fn build_router(state: SharedState, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        // ── Data / Aggregation / Analytics ───────────────────────────────────
        .route(
            "/quotes",
            get(get_quotes).layer(CatchPanicLayer::custom(panic_json("Failed to fetch quotes"))),
        )
        .route(
            "/average",
            get(get_average).layer(CatchPanicLayer::custom(panic_json("Failed to calculate averages"))),
        )
        .route(
            "/slippage",
            get(get_slippage).layer(CatchPanicLayer::custom(panic_json("Failed to calculate slippage"))),
        )
        // ── Front-end ─────────────────────────────────────────────────────────
        .fallback_service(ServeDir::new(static_dir))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(CatchPanicLayer::custom(panic_json("Internal server error")))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Panic handler answering 500 `{"error": message}`. Each JSON endpoint gets
/// its own message; the router-wide one covers everything else.
fn panic_json(
    message: &'static str,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |err| {
        let detail = err
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| err.downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");

        error!(detail, message, "❌ Request handler panicked");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
