//! Valorar: Monte Carlo DCF enterprise valuation.
//!
//! Valorar draws growth and discount rates from configurable
//! distributions, projects free cash flows through an explicit horizon,
//! adds a terminal value, and discounts everything back to an
//! enterprise-value distribution. Fixed seeds reproduce runs exactly,
//! sequentially or in parallel.
//!
//! # Quick Start
//!
//! ```
//! use valorar::prelude::*;
//!
//! let params = SimulationParameters::new(93_833_871_360.0)
//!     .with_iterations(1_000)
//!     .with_seed(42);
//!
//! let engine = DcfEngine::new(params).unwrap();
//! let outcome = engine.run().unwrap();
//!
//! assert_eq!(outcome.values.len(), 1_000);
//! assert!(outcome.statistics.p5 <= outcome.statistics.median);
//! assert!(outcome.statistics.median <= outcome.statistics.p95);
//! ```
//!
//! # Modules
//!
//! - [`engine`]: Simulation engine, rate sampling, and configuration
//! - [`model`]: Deterministic DCF arithmetic
//! - [`stats`]: Summary statistics, percentiles, and histograms
//! - [`data`]: Base free-cash-flow acquisition
//! - [`report`]: Table, JSON, and CSV rendering
//! - [`cli`]: Command-line argument parsing
//! - [`error`]: Error types

pub mod cli;
pub mod data;
pub mod engine;
pub mod error;
pub mod model;
pub mod prelude;
pub mod report;
pub mod stats;

pub use error::{Result, ValorarError};
