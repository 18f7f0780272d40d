//! Command-line interface for the valuation tool

use clap::{Parser, ValueEnum};

use crate::engine::{DegeneratePolicy, Distribution, SimulationParameters, TerminalValue};

/// Monte Carlo DCF enterprise valuation
#[derive(Parser, Debug)]
#[command(name = "valorar")]
#[command(about = "Monte Carlo DCF enterprise valuation")]
#[command(version)]
pub struct Cli {
    /// Ticker symbol to value
    #[arg(default_value = "AAPL")]
    pub ticker: String,

    /// Base free cash flow in USD (skips the remote lookup)
    #[arg(long)]
    pub fcf: Option<f64>,

    /// Number of simulation iterations
    #[arg(short = 'n', long, default_value_t = SimulationParameters::DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Projection horizon in years
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_HORIZON)]
    pub horizon: u32,

    /// Mean of the normal growth-rate distribution
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_GROWTH_MEAN)]
    pub growth_mean: f64,

    /// Std dev of the normal growth-rate distribution
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_GROWTH_STD)]
    pub growth_std: f64,

    /// Mean of the normal discount-rate distribution
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_DISCOUNT_MEAN)]
    pub discount_mean: f64,

    /// Std dev of the normal discount-rate distribution
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_DISCOUNT_STD)]
    pub discount_std: f64,

    /// Sample growth uniformly from [LOW, HIGH) instead of a normal
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    pub growth_range: Option<Vec<f64>>,

    /// Sample discount uniformly from [LOW, HIGH) instead of a normal
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    pub discount_range: Option<Vec<f64>>,

    /// Perpetual growth rate for the Gordon terminal value
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_TERMINAL_GROWTH)]
    pub terminal_growth: f64,

    /// Use an exit-multiple terminal value instead of Gordon growth
    #[arg(long)]
    pub exit_multiple: Option<f64>,

    /// How to handle degenerate rate draws
    #[arg(long, value_enum, default_value_t = PolicyArg::Resample)]
    pub policy: PolicyArg,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = SimulationParameters::DEFAULT_SEED)]
    pub seed: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Histogram bins in table output (0 disables the chart)
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Run iterations across all cores
    #[arg(long)]
    pub parallel: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Degenerate-draw policy, CLI spelling
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Redraw until viable, fail after too many attempts
    Resample,
    /// Drop the iteration and disclose the exclusion
    Exclude,
    /// Nudge the rates to the nearest viable values
    Clamp,
    /// Refuse configurations that can draw degenerate rates
    Reject,
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary table
    Table,
    /// Pretty-printed JSON
    Json,
    /// metric,value rows
    Csv,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build simulation parameters from the parsed flags
    ///
    /// Range flags override the normal-distribution flags for the same
    /// rate. Validation happens when the engine is constructed, so an
    /// inconsistent combination surfaces as a configuration error.
    #[must_use]
    pub fn parameters(&self, base_fcf: f64) -> SimulationParameters {
        let growth = distribution_from(
            self.growth_range.as_deref(),
            self.growth_mean,
            self.growth_std,
        );
        let discount = distribution_from(
            self.discount_range.as_deref(),
            self.discount_mean,
            self.discount_std,
        );
        let terminal = match self.exit_multiple {
            Some(multiple) => TerminalValue::ExitMultiple { multiple },
            None => TerminalValue::Gordon {
                growth: self.terminal_growth,
            },
        };
        let policy = match self.policy {
            PolicyArg::Resample => DegeneratePolicy::Resample {
                max_attempts: SimulationParameters::DEFAULT_RESAMPLE_ATTEMPTS,
            },
            PolicyArg::Exclude => DegeneratePolicy::Exclude,
            PolicyArg::Clamp => DegeneratePolicy::Clamp {
                margin: SimulationParameters::DEFAULT_CLAMP_MARGIN,
            },
            PolicyArg::Reject => DegeneratePolicy::Reject,
        };

        SimulationParameters::new(base_fcf)
            .with_iterations(self.iterations)
            .with_horizon(self.horizon)
            .with_growth(growth)
            .with_discount(discount)
            .with_terminal(terminal)
            .with_policy(policy)
            .with_seed(self.seed)
    }
}

fn distribution_from(range: Option<&[f64]>, mean: f64, std_dev: f64) -> Distribution {
    match range {
        Some([low, high]) => Distribution::uniform(*low, *high),
        _ => Distribution::normal(mean, std_dev),
    }
}
