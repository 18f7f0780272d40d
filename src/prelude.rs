//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use valorar::prelude::*;
//! ```

pub use crate::data::{CashFlowSource, FixedCashFlow, YahooFinance};
pub use crate::engine::{
    DcfEngine, DegeneratePolicy, DegenerateSummary, Distribution, RateSample, Sampler,
    SimulationParameters, TerminalValue, ValuationOutcome,
};
pub use crate::error::{Result, ValorarError};
pub use crate::stats::{percentile, Histogram, SummaryStatistics};
