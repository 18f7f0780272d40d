//! Core types for valuation runs
//!
//! Provides the run configuration, rate distributions, terminal-value
//! policies, and the per-iteration rate sample.

use crate::error::{Result, ValorarError};

/// A sampled rate distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    /// Normal distribution with the given mean and standard deviation
    Normal {
        /// Distribution mean
        mean: f64,
        /// Distribution standard deviation
        std_dev: f64,
    },
    /// Uniform distribution over `[low, high)`
    Uniform {
        /// Inclusive lower bound
        low: f64,
        /// Exclusive upper bound
        high: f64,
    },
}

impl Distribution {
    /// Create a normal distribution
    #[must_use]
    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Self::Normal { mean, std_dev }
    }

    /// Create a uniform distribution over `[low, high)`
    #[must_use]
    pub fn uniform(low: f64, high: f64) -> Self {
        Self::Uniform { low, high }
    }

    /// Greatest lower bound of the support, if the support is bounded below
    #[must_use]
    pub fn lower_bound(&self) -> Option<f64> {
        match self {
            Self::Normal { .. } => None,
            Self::Uniform { low, .. } => Some(*low),
        }
    }

    /// Validate the distribution parameters
    pub fn validate(&self, param: &str) -> Result<()> {
        match *self {
            Self::Normal { mean, std_dev } => {
                if !mean.is_finite() {
                    return Err(ValorarError::configuration(
                        format!("{param}.mean"),
                        mean,
                        "a finite value",
                    ));
                }
                if !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(ValorarError::configuration(
                        format!("{param}.std_dev"),
                        std_dev,
                        "a finite value >= 0",
                    ));
                }
            }
            Self::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(ValorarError::configuration(
                        format!("{param}.range"),
                        format!("[{low}, {high})"),
                        "finite bounds with low < high",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// How the value of cash flows beyond the horizon is estimated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalValue {
    /// Perpetuity growth: `TV = FCF_H * (1 + growth) / (r - growth)`
    Gordon {
        /// Perpetual growth rate, must exceed -100% and stay below the
        /// sampled discount rate
        growth: f64,
    },
    /// Exit multiple: `TV = FCF_H * multiple`
    ExitMultiple {
        /// Multiple applied to the horizon-year cash flow
        multiple: f64,
    },
}

impl TerminalValue {
    /// Validate the terminal-value parameters
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Gordon { growth } => {
                if !growth.is_finite() || growth <= -1.0 {
                    return Err(ValorarError::configuration(
                        "terminal_growth",
                        growth,
                        "a finite value > -1.0",
                    ));
                }
            }
            Self::ExitMultiple { multiple } => {
                if !multiple.is_finite() || multiple <= 0.0 {
                    return Err(ValorarError::configuration(
                        "exit_multiple",
                        multiple,
                        "a finite value > 0",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Recovery policy for degenerate rate draws
///
/// A draw is degenerate when growth <= -100%, the discount rate is
/// non-positive, or (under perpetuity growth) the discount rate does not
/// exceed the terminal growth rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegeneratePolicy {
    /// Redraw from the same iteration stream until viable, up to a bound
    Resample {
        /// Attempts allowed per iteration before the run aborts
        max_attempts: u32,
    },
    /// Drop the iteration from the distribution and disclose the count
    Exclude,
    /// Repair the draw by pushing each rate a margin clear of its floor
    Clamp {
        /// Distance the repaired rate keeps from the degenerate boundary
        margin: f64,
    },
    /// Refuse any fallback; only valid when the configured distributions
    /// cannot produce a degenerate draw
    Reject,
}

impl Default for DegeneratePolicy {
    fn default() -> Self {
        Self::Resample {
            max_attempts: SimulationParameters::DEFAULT_RESAMPLE_ATTEMPTS,
        }
    }
}

/// One iteration's sampled rates: a growth draw and a discount draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Sampled annual free-cash-flow growth rate
    pub growth: f64,
    /// Sampled discount rate
    pub discount: f64,
}

impl RateSample {
    /// Create a rate sample
    #[must_use]
    pub fn new(growth: f64, discount: f64) -> Self {
        Self { growth, discount }
    }

    /// Whether the sample can be valued under the given terminal policy
    #[must_use]
    pub fn is_viable(&self, terminal: &TerminalValue) -> bool {
        if !self.growth.is_finite() || !self.discount.is_finite() {
            return false;
        }
        if self.growth <= -1.0 || self.discount <= 0.0 {
            return false;
        }
        match *terminal {
            TerminalValue::Gordon { growth } => self.discount > growth,
            TerminalValue::ExitMultiple { .. } => true,
        }
    }

    /// Repair a degenerate sample by clamping each rate `margin` clear of
    /// its boundary. The result is viable for any margin > 0.
    #[must_use]
    pub fn clamped(&self, terminal: &TerminalValue, margin: f64) -> Self {
        let growth = self.growth.max(margin - 1.0);
        let mut discount = self.discount.max(margin);
        if let TerminalValue::Gordon { growth: terminal_growth } = *terminal {
            discount = discount.max(terminal_growth + margin);
        }
        Self { growth, discount }
    }
}

/// Fixed inputs for one valuation run
///
/// Immutable once handed to the engine. Construct with [`new`] and the
/// `with_*` builders; [`validate`] is called by the engine before any
/// iteration runs.
///
/// [`new`]: SimulationParameters::new
/// [`validate`]: SimulationParameters::validate
#[derive(Debug, Clone)]
pub struct SimulationParameters {
    /// Base free cash flow in USD, the year-zero figure all paths compound
    pub base_fcf: f64,
    /// Projection horizon in years
    pub horizon: u32,
    /// Number of simulation iterations
    pub iterations: usize,
    /// Growth-rate distribution
    pub growth: Distribution,
    /// Discount-rate distribution
    pub discount: Distribution,
    /// Terminal-value policy
    pub terminal: TerminalValue,
    /// Recovery policy for degenerate draws
    pub policy: DegeneratePolicy,
    /// Seed for the random stream
    pub seed: u64,
}

impl SimulationParameters {
    /// Default number of iterations
    pub const DEFAULT_ITERATIONS: usize = 5000;
    /// Default projection horizon in years
    pub const DEFAULT_HORIZON: u32 = 5;
    /// Largest accepted projection horizon
    pub const MAX_HORIZON: u32 = 100;
    /// Default growth-rate mean
    pub const DEFAULT_GROWTH_MEAN: f64 = 0.05;
    /// Default growth-rate standard deviation
    pub const DEFAULT_GROWTH_STD: f64 = 0.02;
    /// Default discount-rate mean
    pub const DEFAULT_DISCOUNT_MEAN: f64 = 0.08;
    /// Default discount-rate standard deviation
    pub const DEFAULT_DISCOUNT_STD: f64 = 0.01;
    /// Default terminal growth rate
    pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.02;
    /// Default random seed
    pub const DEFAULT_SEED: u64 = 42;
    /// Default redraw bound for the resample policy
    pub const DEFAULT_RESAMPLE_ATTEMPTS: u32 = 100;
    /// Default margin for the clamp policy
    pub const DEFAULT_CLAMP_MARGIN: f64 = 0.01;

    /// Create parameters for the given base free cash flow with reference
    /// defaults for everything else
    #[must_use]
    pub fn new(base_fcf: f64) -> Self {
        Self {
            base_fcf,
            horizon: Self::DEFAULT_HORIZON,
            iterations: Self::DEFAULT_ITERATIONS,
            growth: Distribution::normal(Self::DEFAULT_GROWTH_MEAN, Self::DEFAULT_GROWTH_STD),
            discount: Distribution::normal(
                Self::DEFAULT_DISCOUNT_MEAN,
                Self::DEFAULT_DISCOUNT_STD,
            ),
            terminal: TerminalValue::Gordon {
                growth: Self::DEFAULT_TERMINAL_GROWTH,
            },
            policy: DegeneratePolicy::default(),
            seed: Self::DEFAULT_SEED,
        }
    }

    /// Set the projection horizon in years
    #[must_use]
    pub fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the number of iterations
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the growth-rate distribution
    #[must_use]
    pub fn with_growth(mut self, growth: Distribution) -> Self {
        self.growth = growth;
        self
    }

    /// Set the discount-rate distribution
    #[must_use]
    pub fn with_discount(mut self, discount: Distribution) -> Self {
        self.discount = discount;
        self
    }

    /// Set the terminal-value policy
    #[must_use]
    pub fn with_terminal(mut self, terminal: TerminalValue) -> Self {
        self.terminal = terminal;
        self
    }

    /// Set the degenerate-draw recovery policy
    #[must_use]
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the full configuration
    ///
    /// Checks every scalar, both distributions, the terminal policy, and
    /// the recovery policy. `Reject` additionally requires distributions
    /// whose support provably stays clear of degenerate rates.
    pub fn validate(&self) -> Result<()> {
        if !self.base_fcf.is_finite() || self.base_fcf <= 0.0 {
            return Err(ValorarError::configuration(
                "base_fcf",
                self.base_fcf,
                "a finite value > 0",
            ));
        }
        if self.horizon == 0 || self.horizon > Self::MAX_HORIZON {
            return Err(ValorarError::configuration(
                "horizon",
                self.horizon,
                format!("between 1 and {}", Self::MAX_HORIZON),
            ));
        }
        if self.iterations == 0 {
            return Err(ValorarError::configuration(
                "iterations",
                self.iterations,
                "at least 1",
            ));
        }
        self.growth.validate("growth")?;
        self.discount.validate("discount")?;
        self.terminal.validate()?;
        self.validate_policy()
    }

    fn validate_policy(&self) -> Result<()> {
        match self.policy {
            DegeneratePolicy::Resample { max_attempts } => {
                if max_attempts == 0 {
                    return Err(ValorarError::configuration(
                        "policy.max_attempts",
                        max_attempts,
                        "at least 1",
                    ));
                }
            }
            DegeneratePolicy::Clamp { margin } => {
                if !margin.is_finite() || margin <= 0.0 {
                    return Err(ValorarError::configuration(
                        "policy.margin",
                        margin,
                        "a finite value > 0",
                    ));
                }
            }
            DegeneratePolicy::Exclude => {}
            DegeneratePolicy::Reject => self.validate_reject_support()?,
        }
        Ok(())
    }

    // Reject has no fallback, so the distributions themselves must be
    // incapable of producing a degenerate draw.
    fn validate_reject_support(&self) -> Result<()> {
        match self.growth.lower_bound() {
            Some(floor) if floor > -1.0 => {}
            _ => {
                return Err(ValorarError::configuration(
                    "policy",
                    "reject",
                    "a growth distribution bounded above -100%",
                ));
            }
        }
        let discount_floor = match self.discount.lower_bound() {
            Some(floor) => floor,
            None => {
                return Err(ValorarError::configuration(
                    "policy",
                    "reject",
                    "a discount distribution bounded above 0",
                ));
            }
        };
        let required = match self.terminal {
            TerminalValue::Gordon { growth } => growth.max(0.0),
            TerminalValue::ExitMultiple { .. } => 0.0,
        };
        if discount_floor <= required {
            return Err(ValorarError::configuration(
                "policy",
                "reject",
                format!("a discount distribution bounded above {required}"),
            ));
        }
        Ok(())
    }
}
