//! Summary statistics for results distributions
//!
//! Aggregates a simulated enterprise-value distribution into central
//! moments and order statistics, plus a histogram for the reporting sink.
//! Pure functions of the input slice; recomputing is always safe.

/// Summary statistics for a results distribution
///
/// Standard deviation uses the sample convention (divisor n - 1).
/// Percentiles interpolate linearly over the sorted sample (the R-7
/// method of Hyndman & Fan 1996).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStatistics {
    /// Sample mean
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// 5th percentile
    pub p5: f64,
    /// 95th percentile
    pub p95: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Number of samples
    pub n: usize,
}

impl SummaryStatistics {
    /// Calculate statistics from values
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len();
        let n_f = n as f64;

        let mean = values.iter().sum::<f64>() / n_f;
        let variance =
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n_f - 1.0).max(1.0);

        // One sort serves every order statistic.
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Self {
            mean,
            median: percentile_sorted(&sorted, 0.50),
            std_dev: variance.sqrt(),
            p5: percentile_sorted(&sorted, 0.05),
            p95: percentile_sorted(&sorted, 0.95),
            min: sorted[0],
            max: sorted[n - 1],
            n,
        }
    }
}

/// Calculate a percentile from a slice of values
///
/// Uses linear interpolation between data points; `p` is a fraction in
/// `[0, 1]` and is clamped.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    percentile_sorted(&sorted, p)
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let p = p.clamp(0.0, 1.0);
    let n = sorted.len();

    if n == 1 {
        return sorted[0];
    }

    let idx = p * (n - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Equal-width histogram over a results distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// Bin edges, `n_bins + 1` entries
    pub edges: Vec<f64>,
    /// Count of values per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Build a histogram with `n_bins` equal-width bins
    ///
    /// Empty input or a zero bin count yields an empty histogram. When
    /// every value is identical the histogram spans a unit-width range
    /// starting at that value.
    #[must_use]
    pub fn from_values(values: &[f64], n_bins: usize) -> Self {
        if values.is_empty() || n_bins == 0 {
            return Self::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = if max > min {
            (max - min) / n_bins as f64
        } else {
            1.0
        };

        let edges = (0..=n_bins).map(|i| min + width * i as f64).collect();
        let mut counts = vec![0usize; n_bins];
        for &value in values {
            let idx = (((value - min) / width) as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    /// Number of bins
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Largest single-bin count
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Bin index containing `value`, if it falls within the histogram range
    #[must_use]
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        let (first, last) = match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return None,
        };
        if !(value >= first && value <= last) {
            return None;
        }

        let width = (last - first) / self.counts.len() as f64;
        if width <= 0.0 {
            return Some(0);
        }
        Some((((value - first) / width) as usize).min(self.counts.len() - 1))
    }
}
