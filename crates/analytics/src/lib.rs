//! # Plantwatch Metric Engine
//!
//! This crate turns a raw sensor series into the summary statistics and
//! anomaly flags shown on the utility dashboard.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of charts,
//!   widgets or files. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `MetricEngine` holds no state. Randomness is
//!   only ever drawn from a generator seeded by the caller, so two calls with the
//!   same inputs always agree.
//!
//! ## Public API
//!
//! - `MetricEngine`: The main struct that contains the calculation logic.
//! - `KpiReport`: Everything a trend panel displays about one series.
//! - `MetricError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::MetricEngine;
pub use error::MetricError;
pub use report::KpiReport;
