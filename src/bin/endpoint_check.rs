//! # endpoint_check — smoke test for a running quotewatch server
//!
//! ```text
//! GET /quotes    → count sources
//! GET /average   → print averages
//! GET /slippage  → count entries
//! ```
//!
//! Exits non-zero on the first endpoint that fails. Point it elsewhere with
//! `CHECK_BASE_URL` (default `http://localhost:3000`).

use std::time::Duration;

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("endpoint_check=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    let base_url = std::env::var("CHECK_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = reqwest::Client::new();

    if let Err(e) = run_checks(&client, base_url.trim_end_matches('/')).await {
        error!(error = %e, "❌ Test failed");
        return Err(e);
    }

    info!("✅ All endpoints working");
    Ok(())
}

async fn run_checks(client: &reqwest::Client, base_url: &str) -> anyhow::Result<()> {
    info!("Testing /quotes...");
    let quotes = get_json(client, base_url, "/quotes").await?;
    let count = quotes
        .as_array()
        .context("/quotes did not return an array")?
        .len();
    info!(sources = count, "✅ /quotes working");

    info!("Testing /average...");
    let average = get_json(client, base_url, "/average").await?;
    info!(
        average_buy_price  = %average["average_buy_price"],
        average_sell_price = %average["average_sell_price"],
        total_sources      = %average["total_sources"],
        "✅ /average working"
    );

    info!("Testing /slippage...");
    let slippage = get_json(client, base_url, "/slippage").await?;
    let entries = slippage["slippage"]
        .as_array()
        .context("/slippage body has no `slippage` array")?
        .len();
    info!(entries, "✅ /slippage working");

    Ok(())
}

async fn get_json(client: &reqwest::Client, base_url: &str, path: &str) -> anyhow::Result<Value> {
    let url = format!("{base_url}{path}");

    let resp = client
        .get(&url)
        // a cold cache walks every source, each allowed 10s
        .timeout(Duration::from_secs(60))
        .send()
        .await
        .with_context(|| format!("{url} unreachable"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("{path} returned HTTP {status}: {body}");
    }

    resp.json()
        .await
        .with_context(|| format!("{path} returned invalid JSON"))
}
