//! Error types for valuation operations.
//!
//! Toyota Way: Jidoka - Stop and highlight problems immediately.

use thiserror::Error;

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, ValorarError>;

/// Main error type for valuation operations.
///
/// # Examples
///
/// ```
/// use valorar::error::ValorarError;
///
/// let err = ValorarError::configuration("horizon", 0, "between 1 and 100");
/// assert!(err.to_string().contains("horizon"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValorarError {
    /// Invalid run configuration, detected before the first iteration.
    #[error("Invalid configuration: {param} = {value}, expected {constraint}")]
    Configuration {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Upstream fetch failed or returned an unusable base cash flow.
    #[error("Base free cash flow unavailable for {ticker}: {reason}")]
    DataUnavailable {
        /// Ticker the fetch was for
        ticker: String,
        /// What went wrong upstream
        reason: String,
    },

    /// An iteration could not obtain viable rates under the configured policy.
    #[error("Iteration {iteration} drew no viable rates after {attempts} attempt(s)")]
    DegenerateSample {
        /// Zero-based iteration index
        iteration: u64,
        /// Draw attempts consumed before giving up
        attempts: u32,
    },
}

impl ValorarError {
    /// Create a configuration error with descriptive context
    #[must_use]
    pub fn configuration(
        param: impl Into<String>,
        value: impl std::fmt::Display,
        constraint: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            param: param.into(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    /// Create a data-unavailable error for a ticker
    #[must_use]
    pub fn data_unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is fatal before any simulation work starts
    #[must_use]
    pub fn is_pre_run(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::DataUnavailable { .. }
        )
    }
}
