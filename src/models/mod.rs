//! Domain models shared across the quote pipeline.

pub mod quote;

pub use quote::{AverageResult, Quote, QuoteSet, SlippageEntry, SlippageReport};
