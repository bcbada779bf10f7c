//! # config — Configuration from Environment Variables
//!
//! Only the listening port and the static directory come from the
//! environment. The source list, cache TTL and per-source timeout are fixed.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::engine::adapter::PriceSource;

/// Hard-coded quote sources, fetched in this order.
pub const SOURCE_URLS: &[&str] = &[
    "https://wise.com/es/currency-converter/brl-to-usd-rate",
    "https://nubank.com.br/taxas-conversao/",
    "https://www.nomadglobal.com",
];

/// Per-source request timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PORT` — Axum listens on `0.0.0.0:<port>`
    pub port:          u16,
    /// `STATIC_DIR` — front-end assets served at `/`
    pub static_dir:    PathBuf,
    pub sources:       Vec<PriceSource>,
    pub fetch_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR)),
            ..Self::default()
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port:          DEFAULT_PORT,
            static_dir:    PathBuf::from(DEFAULT_STATIC_DIR),
            sources:       SOURCE_URLS.iter().map(|url| PriceSource::new(*url)).collect(),
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}
