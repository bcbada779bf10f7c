//! # error
//!
//! Centralised application error type.
//!
//! Handlers return `Result<_, AppError>`. The `IntoResponse` impl turns every
//! variant into a `500` with a `{"error": "<message>"}` body: the front-end
//! only looks at the status, and callers never need to tell kinds apart.
//! Detail goes to the server log, not the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::engine::aggregator::AggregateError;

#[derive(Debug, Error)]
pub enum AppError {
    /// The cache handed back an empty quote list.
    #[error("No quotes data available")]
    NoQuotes,

    /// Averaging or slippage blew up; `message` is the endpoint's generic text.
    #[error("{message}")]
    Aggregation {
        message: &'static str,
        #[source]
        source: AggregateError,
    },
}

impl AppError {
    /// Map an aggregation failure, keeping `EmptyQuoteSet` distinct.
    pub fn aggregation(message: &'static str) -> impl FnOnce(AggregateError) -> AppError {
        move |err| match err {
            AggregateError::EmptyQuoteSet => AppError::NoQuotes,
            other => AppError::Aggregation { message, source: other },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NoQuotes => error!("❌ No quotes data available"),
            AppError::Aggregation { message, source } => {
                error!(error = %source, "❌ {message}")
            }
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_maps_to_no_quotes() {
        let err = AppError::aggregation("Failed to calculate averages")(AggregateError::EmptyQuoteSet);
        assert!(matches!(err, AppError::NoQuotes));
        assert_eq!(err.to_string(), "No quotes data available");
    }

    #[test]
    fn test_other_failures_use_generic_message() {
        let err = AppError::aggregation("Failed to calculate slippage")(AggregateError::ZeroMean {
            side: "buy",
        });
        assert_eq!(err.to_string(), "Failed to calculate slippage");
    }

    #[test]
    fn test_response_is_500() {
        let response = AppError::NoQuotes.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
