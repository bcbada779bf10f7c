//! The fetch → cache → aggregate pipeline.

pub mod adapter;
pub mod aggregator;
pub mod cache;
pub mod fetcher;
