//! # engine::aggregator
//!
//! Cross-source statistics over one [`Quote`] list.
//!
//! | Output        | Means                   | Per-source values        |
//! |---------------|-------------------------|--------------------------|
//! | `average()`   | rounded to 4 dp         | —                        |
//! | `slippage()`  | unrounded, recomputed   | `(p - mean) / mean`, 4 dp |

use thiserror::Error;

use crate::models::quote::round_dp;
use crate::models::{AverageResult, Quote, SlippageEntry, SlippageReport};

#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("quote set is empty")]
    EmptyQuoteSet,

    /// Slippage is relative to the mean; a zero mean has no answer.
    #[error("mean {side} price is zero")]
    ZeroMean { side: &'static str },

    #[error("non-finite {side} value for {source_url}")]
    NonFinite {
        side: &'static str,
        source_url: String,
    },
}

pub type AggregateResult<T> = Result<T, AggregateError>;

/// Unrounded means of buy and sell.
fn means(quotes: &[Quote]) -> AggregateResult<(f64, f64)> {
    if quotes.is_empty() {
        return Err(AggregateError::EmptyQuoteSet);
    }

    let (total_buy, total_sell) = quotes
        .iter()
        .fold((0.0, 0.0), |(b, s), q| (b + q.buy_price, s + q.sell_price));

    let n = quotes.len() as f64;
    Ok((total_buy / n, total_sell / n))
}

/// Arithmetic mean buy/sell across every source, 4 dp.
pub fn average(quotes: &[Quote]) -> AggregateResult<AverageResult> {
    let (avg_buy, avg_sell) = means(quotes)?;

    Ok(AverageResult {
        average_buy_price: round_dp(avg_buy, 4),
        average_sell_price: round_dp(avg_sell, 4),
        total_sources: quotes.len(),
    })
}

/// Relative deviation of each source from the cross-source mean.
pub fn slippage(quotes: &[Quote]) -> AggregateResult<SlippageReport> {
    let (average_buy, average_sell) = means(quotes)?;

    if average_buy == 0.0 {
        return Err(AggregateError::ZeroMean { side: "buy" });
    }
    if average_sell == 0.0 {
        return Err(AggregateError::ZeroMean { side: "sell" });
    }

    let slippage = quotes
        .iter()
        .map(|q| {
            let buy = finite("buy", &q.source, (q.buy_price - average_buy) / average_buy)?;
            let sell = finite("sell", &q.source, (q.sell_price - average_sell) / average_sell)?;

            Ok(SlippageEntry {
                source: q.source.clone(),
                buy_price_slippage: round_dp(buy, 4),
                sell_price_slippage: round_dp(sell, 4),
            })
        })
        .collect::<AggregateResult<Vec<_>>>()?;

    Ok(SlippageReport {
        average_buy,
        average_sell,
        slippage,
    })
}

fn finite(side: &'static str, source: &str, value: f64) -> AggregateResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AggregateError::NonFinite {
            side,
            source_url: source.to_string(),
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(source: &str, buy: f64, sell: f64) -> Quote {
        Quote {
            source: source.to_string(),
            buy_price: buy,
            sell_price: sell,
        }
    }

    fn mocked_trio() -> Vec<Quote> {
        vec![
            quote("https://wise.com (mocked)", 5.10, 5.15),
            quote("https://nubank.com.br (mocked)", 5.05, 5.10),
            quote("https://www.nomadglobal.com (mocked)", 5.20, 5.25),
        ]
    }

    #[test]
    fn test_average_three_mocked_sources() {
        let result = average(&mocked_trio()).unwrap();
        assert_eq!(result.average_buy_price, 5.1167);
        assert_eq!(result.average_sell_price, 5.1667);
        assert_eq!(result.total_sources, 3);
    }

    #[test]
    fn test_average_single_source_is_identity() {
        let result = average(&[quote("a", 0.1834, 0.1852)]).unwrap();
        assert_eq!(result.average_buy_price, 0.1834);
        assert_eq!(result.average_sell_price, 0.1852);
        assert_eq!(result.total_sources, 1);
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(average(&[]), Err(AggregateError::EmptyQuoteSet));
        assert_eq!(slippage(&[]), Err(AggregateError::EmptyQuoteSet));
    }

    #[test]
    fn test_slippage_means_unrounded() {
        let report = slippage(&mocked_trio()).unwrap();
        let expected_buy = (5.10 + 5.05 + 5.20) / 3.0;
        assert!((report.average_buy - expected_buy).abs() < 1e-12);
        // more precision than the 4 dp /average would give
        assert_ne!(report.average_buy, 5.1167);
    }

    #[test]
    fn test_slippage_entries() {
        let report = slippage(&mocked_trio()).unwrap();
        assert_eq!(report.slippage.len(), 3);

        // (5.05 - 5.116666..) / 5.116666.. = -0.013029..
        let nubank = &report.slippage[1];
        assert_eq!(nubank.source, "https://nubank.com.br (mocked)");
        assert_eq!(nubank.buy_price_slippage, -0.013);

        // (5.20 - 5.116666..) / 5.116666.. = 0.016286..
        assert_eq!(report.slippage[2].buy_price_slippage, 0.0163);
    }

    #[test]
    fn test_slippage_reconstructs_deviations() {
        let quotes = vec![
            quote("a", 0.1834, 0.1852),
            quote("b", 0.1901, 0.1920),
            quote("c", 5.12, 5.17),
            quote("d", 2.5, 2.525),
        ];
        let report = slippage(&quotes).unwrap();
        let n = quotes.len() as f64;

        let rebuilt: f64 = report
            .slippage
            .iter()
            .map(|s| s.buy_price_slippage * report.average_buy)
            .sum();
        let actual: f64 = quotes.iter().map(|q| q.buy_price).sum::<f64>() - n * report.average_buy;

        // each term carries at most 0.5e-4 relative rounding
        assert!((rebuilt - actual).abs() <= n * 0.5e-4 * report.average_buy + 1e-9);
    }

    #[test]
    fn test_identical_quotes_zero_slippage() {
        let quotes = vec![quote("a", 5.0, 5.05), quote("b", 5.0, 5.05)];
        let report = slippage(&quotes).unwrap();
        for entry in &report.slippage {
            assert_eq!(entry.buy_price_slippage, 0.0);
            assert_eq!(entry.sell_price_slippage, 0.0);
        }
    }

    #[test]
    fn test_zero_mean_fails() {
        let quotes = vec![quote("a", 0.0, 0.0), quote("b", 0.0, 0.0)];
        assert_eq!(
            slippage(&quotes),
            Err(AggregateError::ZeroMean { side: "buy" })
        );
    }

    #[test]
    fn test_non_finite_fails() {
        let quotes = vec![quote("a", f64::INFINITY, 5.0), quote("b", 5.0, 5.0)];
        assert!(matches!(
            slippage(&quotes),
            Err(AggregateError::NonFinite { side: "buy", .. })
        ));
    }
}
