//! Monte Carlo DCF simulation engine
//!
//! Draws growth and discount rates per iteration, values each draw with
//! the DCF model, and aggregates the resulting enterprise-value
//! distribution. Iterations share nothing but the read-only
//! configuration, so the sequential and parallel paths produce
//! bit-identical output.

pub mod sampler;
pub mod types;

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{Result, ValorarError};
use crate::model;
use crate::stats::SummaryStatistics;

pub use sampler::Sampler;
pub use types::{
    DegeneratePolicy, Distribution, RateSample, SimulationParameters, TerminalValue,
};

/// Degenerate-draw accounting for one run
///
/// Disclosed with every output; the distribution never shrinks silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegenerateSummary {
    /// Degenerate draws encountered, redraw attempts included
    pub draws: usize,
    /// Iterations whose final sample was repaired by clamping
    pub clamped: usize,
    /// Iterations dropped from the distribution
    pub excluded: usize,
}

impl DegenerateSummary {
    /// Whether any degenerate draw occurred
    #[must_use]
    pub fn any(&self) -> bool {
        self.draws > 0
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: &Self) {
        self.draws += other.draws;
        self.clamped += other.clamped;
        self.excluded += other.excluded;
    }
}

/// Results of one valuation run
#[derive(Debug, Clone)]
pub struct ValuationOutcome {
    /// Simulated enterprise values, one per included iteration
    pub values: Vec<f64>,
    /// Summary statistics over `values`
    pub statistics: SummaryStatistics,
    /// Degenerate-draw accounting
    pub degenerate: DegenerateSummary,
    /// Iterations requested by the configuration
    pub iterations_requested: usize,
    /// Seed the run executed with
    pub seed: u64,
}

impl ValuationOutcome {
    /// Number of enterprise values in the distribution
    #[must_use]
    pub fn n_values(&self) -> usize {
        self.values.len()
    }
}

/// Result of a single iteration
#[derive(Debug, Clone, Copy)]
struct IterationOutcome {
    value: Option<f64>,
    degenerate: DegenerateSummary,
}

/// Monte Carlo DCF valuation engine
///
/// Owns a validated configuration for the duration of a run.
///
/// # Examples
///
/// ```
/// use valorar::engine::{DcfEngine, SimulationParameters};
///
/// let params = SimulationParameters::new(1_000_000.0)
///     .with_iterations(200)
///     .with_seed(7);
/// let outcome = DcfEngine::new(params).unwrap().run().unwrap();
/// assert_eq!(outcome.values.len(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct DcfEngine {
    params: SimulationParameters,
}

impl DcfEngine {
    /// Create an engine from validated parameters
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The configuration this engine runs
    #[must_use]
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Run all iterations sequentially
    pub fn run(&self) -> Result<ValuationOutcome> {
        debug!(
            "running {} iterations sequentially (seed {})",
            self.params.iterations, self.params.seed
        );

        let mut values = Vec::with_capacity(self.params.iterations);
        let mut degenerate = DegenerateSummary::default();
        for index in 0..self.params.iterations as u64 {
            let outcome = self.run_iteration(index)?;
            degenerate.merge(&outcome.degenerate);
            if let Some(value) = outcome.value {
                values.push(value);
            }
        }

        Ok(self.finish(values, degenerate))
    }

    /// Run all iterations across threads
    ///
    /// Each iteration owns an independent stream derived from the run
    /// seed and its index; results merge in iteration order, so the
    /// outcome is bit-identical to [`run`].
    ///
    /// [`run`]: DcfEngine::run
    pub fn run_parallel(&self) -> Result<ValuationOutcome> {
        debug!(
            "running {} iterations in parallel (seed {})",
            self.params.iterations, self.params.seed
        );

        let outcomes = (0..self.params.iterations as u64)
            .into_par_iter()
            .map(|index| self.run_iteration(index))
            .collect::<Result<Vec<IterationOutcome>>>()?;

        let mut values = Vec::with_capacity(outcomes.len());
        let mut degenerate = DegenerateSummary::default();
        for outcome in outcomes {
            degenerate.merge(&outcome.degenerate);
            if let Some(value) = outcome.value {
                values.push(value);
            }
        }

        Ok(self.finish(values, degenerate))
    }

    fn run_iteration(&self, index: u64) -> Result<IterationOutcome> {
        let params = &self.params;
        let mut sampler = Sampler::for_iteration(params.seed, index);
        let mut summary = DegenerateSummary::default();

        let first = self.draw_rates(&mut sampler);
        let rates = if first.is_viable(&params.terminal) {
            Some(first)
        } else {
            self.recover(first, &mut sampler, index, &mut summary)?
        };

        let value = rates.map(|rates| {
            model::enterprise_value(params.base_fcf, &rates, params.horizon, &params.terminal)
        });
        Ok(IterationOutcome {
            value,
            degenerate: summary,
        })
    }

    fn draw_rates(&self, sampler: &mut Sampler) -> RateSample {
        RateSample::new(
            sampler.draw(&self.params.growth),
            sampler.draw(&self.params.discount),
        )
    }

    /// Apply the recovery policy to a degenerate first draw
    fn recover(
        &self,
        first: RateSample,
        sampler: &mut Sampler,
        iteration: u64,
        summary: &mut DegenerateSummary,
    ) -> Result<Option<RateSample>> {
        let params = &self.params;
        summary.draws = 1;

        match params.policy {
            DegeneratePolicy::Resample { max_attempts } => {
                let mut attempts: u32 = 1;
                while attempts < max_attempts {
                    let redraw = self.draw_rates(sampler);
                    attempts += 1;
                    if redraw.is_viable(&params.terminal) {
                        debug!("iteration {iteration}: viable rates after {attempts} draw(s)");
                        return Ok(Some(redraw));
                    }
                    summary.draws += 1;
                }
                Err(ValorarError::DegenerateSample {
                    iteration,
                    attempts,
                })
            }
            DegeneratePolicy::Exclude => {
                summary.excluded = 1;
                debug!("iteration {iteration}: degenerate draw excluded");
                Ok(None)
            }
            DegeneratePolicy::Clamp { margin } => {
                summary.clamped = 1;
                debug!("iteration {iteration}: degenerate draw clamped");
                Ok(Some(first.clamped(&params.terminal, margin)))
            }
            DegeneratePolicy::Reject => Err(ValorarError::DegenerateSample {
                iteration,
                attempts: 1,
            }),
        }
    }

    fn finish(&self, values: Vec<f64>, degenerate: DegenerateSummary) -> ValuationOutcome {
        if degenerate.any() {
            warn!(
                "{} degenerate draw(s) encountered: {} iteration(s) clamped, {} excluded",
                degenerate.draws, degenerate.clamped, degenerate.excluded
            );
        }

        ValuationOutcome {
            statistics: SummaryStatistics::from_values(&values),
            values,
            degenerate,
            iterations_requested: self.params.iterations,
            seed: self.params.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> SimulationParameters {
        SimulationParameters::new(1_000_000.0)
            .with_iterations(200)
            .with_seed(42)
    }

    // Discount rates centered on the terminal growth rate make roughly
    // half the draws degenerate.
    fn degenerate_prone_params() -> SimulationParameters {
        small_params().with_discount(Distribution::normal(0.02, 0.005))
    }

    #[test]
    fn test_new_validates_parameters() {
        let err = DcfEngine::new(SimulationParameters::new(-1.0)).unwrap_err();
        assert!(matches!(err, ValorarError::Configuration { .. }));
    }

    #[test]
    fn test_run_produces_requested_length() {
        let outcome = DcfEngine::new(small_params()).unwrap().run().unwrap();
        assert_eq!(outcome.n_values(), 200);
        assert_eq!(outcome.iterations_requested, 200);
        assert_eq!(outcome.statistics.n, 200);
    }

    #[test]
    fn test_run_is_reproducible() {
        let engine = DcfEngine::new(small_params()).unwrap();
        let first = engine.run().unwrap();
        let second = engine.run().unwrap();

        assert_eq!(first.values, second.values);
        assert_eq!(first.statistics, second.statistics);
    }

    #[test]
    fn test_seeds_change_the_distribution() {
        let a = DcfEngine::new(small_params()).unwrap().run().unwrap();
        let b = DcfEngine::new(small_params().with_seed(43))
            .unwrap()
            .run()
            .unwrap();
        assert_ne!(a.values, b.values);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let engine = DcfEngine::new(small_params()).unwrap();
        let sequential = engine.run().unwrap();
        let parallel = engine.run_parallel().unwrap();

        assert_eq!(sequential.values, parallel.values);
        assert_eq!(sequential.degenerate, parallel.degenerate);
    }

    #[test]
    fn test_values_are_finite_and_positive() {
        let outcome = DcfEngine::new(small_params()).unwrap().run().unwrap();
        for value in &outcome.values {
            assert!(value.is_finite());
            assert!(*value > 0.0);
        }
    }

    #[test]
    fn test_resample_policy_keeps_full_length() {
        let outcome = DcfEngine::new(degenerate_prone_params())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.n_values(), 200);
        assert!(outcome.degenerate.draws > 0);
        assert_eq!(outcome.degenerate.excluded, 0);
        assert_eq!(outcome.degenerate.clamped, 0);
    }

    #[test]
    fn test_exclude_policy_shrinks_and_discloses() {
        let params = degenerate_prone_params().with_policy(DegeneratePolicy::Exclude);
        let outcome = DcfEngine::new(params).unwrap().run().unwrap();

        assert!(outcome.degenerate.excluded > 0);
        assert_eq!(outcome.degenerate.draws, outcome.degenerate.excluded);
        assert_eq!(outcome.n_values(), 200 - outcome.degenerate.excluded);
        assert_eq!(outcome.statistics.n, outcome.n_values());
    }

    #[test]
    fn test_clamp_policy_repairs_and_discloses() {
        let params =
            degenerate_prone_params().with_policy(DegeneratePolicy::Clamp { margin: 0.01 });
        let outcome = DcfEngine::new(params).unwrap().run().unwrap();

        assert_eq!(outcome.n_values(), 200);
        assert!(outcome.degenerate.clamped > 0);
        assert_eq!(outcome.degenerate.draws, outcome.degenerate.clamped);
        for value in &outcome.values {
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_resample_exhaustion_aborts_the_run() {
        // Every draw from this discount distribution is degenerate.
        let params = small_params()
            .with_iterations(10)
            .with_discount(Distribution::uniform(-0.5, -0.1))
            .with_policy(DegeneratePolicy::Resample { max_attempts: 4 });

        let err = DcfEngine::new(params).unwrap().run().unwrap_err();
        match err {
            ValorarError::DegenerateSample { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("expected degenerate sample error, got {other}"),
        }
    }

    #[test]
    fn test_reject_policy_runs_clean_on_safe_support() {
        let params = small_params()
            .with_growth(Distribution::uniform(0.0, 0.1))
            .with_discount(Distribution::uniform(0.05, 0.12))
            .with_policy(DegeneratePolicy::Reject);

        let outcome = DcfEngine::new(params).unwrap().run().unwrap();
        assert_eq!(outcome.n_values(), 200);
        assert!(!outcome.degenerate.any());
    }

    #[test]
    fn test_degenerate_summary_merge() {
        let mut total = DegenerateSummary::default();
        total.merge(&DegenerateSummary {
            draws: 3,
            clamped: 1,
            excluded: 0,
        });
        total.merge(&DegenerateSummary {
            draws: 2,
            clamped: 0,
            excluded: 2,
        });

        assert_eq!(total.draws, 5);
        assert_eq!(total.clamped, 1);
        assert_eq!(total.excluded, 2);
        assert!(total.any());
    }

    #[test]
    fn test_single_iteration_boundary() {
        let params = small_params().with_iterations(1);
        let outcome = DcfEngine::new(params).unwrap().run().unwrap();

        assert_eq!(outcome.n_values(), 1);
        let value = outcome.values[0];
        assert_eq!(outcome.statistics.mean, value);
        assert_eq!(outcome.statistics.median, value);
        assert_eq!(outcome.statistics.p5, value);
        assert_eq!(outcome.statistics.p95, value);
    }

    #[test]
    fn test_exit_multiple_terminal_runs() {
        let params = small_params().with_terminal(TerminalValue::ExitMultiple { multiple: 12.0 });
        let outcome = DcfEngine::new(params).unwrap().run().unwrap();
        assert_eq!(outcome.n_values(), 200);
    }
}
