//! # Quotewatch — BRL Exchange Quote Aggregator
//!
//! ```text
//!  ┌─────────────┐  GET /quotes    ┌──────────────────────────┐  stale?  ┌──────────────┐
//!  │  Browser /  │ ──────────────▶ │ AppState                 │ ───────▶ │ QuoteFetcher │──▶ wise.com
//!  │  curl       │  GET /average   │ └─ QuoteCache (TTL 60s)  │          │ (sequential, │──▶ nubank
//!  │             │  GET /slippage  │                          │ ◀─────── │  10s / src)  │──▶ nomad
//!  └─────────────┘                 └──────────────────────────┘  quotes  └──────────────┘
//!         ▲                                    │
//!         └──────── JSON ◀── aggregator ◀──────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable     | Default                             | Description              |
//! |--------------|-------------------------------------|--------------------------|
//! | `PORT`       | `3000`                              | Port Axum listens on     |
//! | `STATIC_DIR` | `public`                            | Front-end asset folder   |
//! | `RUST_LOG`   | `quotewatch=debug,tower_http=info`  | Tracing filter           |

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod models;
mod routes;
mod state;

use config::AppConfig;
use routes::build_router;
use state::build_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("quotewatch=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════╗
  ║        QUOTEWATCH — BRL Quote Aggregator      ║
  ║     Quotes · Average · Slippage  (cache 60s)  ║
  ╚═══════════════════════════════════════════════╝"#);

    // ── 3. Config ─────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().context("Failed to load config")?;

    for source in &config.sources {
        info!(url = %source.url, kind = %source.kind, "Quote source registered");
    }

    // ── 4. Shared state + router ──────────────────────────────────────────────
    let state = build_state(&config);
    let app = build_router(state, &config.static_dir);

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    let addr = config.bind_addr();
    info!(?addr, static_dir = %config.static_dir.display(), "✅ Server starting");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
