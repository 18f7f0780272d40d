//! Valuation report rendering
//!
//! Toyota Way: Visualization - Make information visible and clear.
//!
//! Every renderer returns a `String`; callers decide where it goes.
//! The table format is for people, json and csv for machines.

use std::fmt::Write as _;

use crate::engine::ValuationOutcome;
use crate::stats::{Histogram, SummaryStatistics};

const MAX_BAR_WIDTH: usize = 40;

/// Format a dollar amount with thousands separators, e.g. `$1,234.50`
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{amount}");
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}${grouped}.{cents}")
}

/// Format a dollar amount compactly for axis labels, e.g. `$1.89T`
#[must_use]
pub fn format_compact(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{amount}");
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (abs / 1e12, "T")
    } else if abs >= 1e9 {
        (abs / 1e9, "B")
    } else if abs >= 1e6 {
        (abs / 1e6, "M")
    } else if abs >= 1e3 {
        (abs / 1e3, "K")
    } else {
        (abs, "")
    };
    format!("{sign}${scaled:.2}{suffix}")
}

/// Render the human-readable summary table
#[must_use]
pub fn render_summary(outcome: &ValuationOutcome, ticker: &str, base_fcf: f64) -> String {
    let stats = &outcome.statistics;
    let degenerate = &outcome.degenerate;

    let mut out = String::new();
    let _ = writeln!(out, "Enterprise Value Simulation");
    let _ = writeln!(out, "===========================");
    let _ = writeln!(out, "Ticker:              {ticker}");
    let _ = writeln!(
        out,
        "Base Free Cash Flow: {}",
        format_currency(base_fcf)
    );
    if degenerate.excluded > 0 {
        let _ = writeln!(
            out,
            "Iterations:          {} ({} after exclusions)",
            outcome.iterations_requested,
            outcome.n_values()
        );
    } else {
        let _ = writeln!(out, "Iterations:          {}", outcome.iterations_requested);
    }
    let _ = writeln!(out, "Seed:                {}", outcome.seed);
    let _ = writeln!(out);
    let _ = writeln!(out, "Enterprise Value Distribution:");
    let _ = writeln!(out, "  Mean:      {}", format_currency(stats.mean));
    let _ = writeln!(out, "  Median:    {}", format_currency(stats.median));
    let _ = writeln!(out, "  Std Dev:   {}", format_currency(stats.std_dev));
    let _ = writeln!(out, "  5th pct:   {}", format_currency(stats.p5));
    let _ = writeln!(out, "  95th pct:  {}", format_currency(stats.p95));
    let _ = writeln!(out, "  Min:       {}", format_currency(stats.min));
    let _ = writeln!(out, "  Max:       {}", format_currency(stats.max));
    let _ = writeln!(out);

    let mut disclosure = format!("Degenerate draws:    {}", degenerate.draws);
    if degenerate.clamped > 0 {
        let _ = write!(disclosure, ", {} clamped", degenerate.clamped);
    }
    if degenerate.excluded > 0 {
        let _ = write!(disclosure, ", {} excluded", degenerate.excluded);
    }
    let _ = writeln!(out, "{disclosure}");
    out
}

/// Render an ASCII histogram of the enterprise values
///
/// Bars scale to the modal bin; the bins holding the mean and median
/// are marked so the shape reads against the summary table.
#[must_use]
pub fn render_histogram(values: &[f64], statistics: &SummaryStatistics, n_bins: usize) -> String {
    let histogram = Histogram::from_values(values, n_bins);
    if histogram.n_bins() == 0 {
        return String::from("(no samples)\n");
    }

    let max_count = histogram.max_count().max(1);
    let mean_bin = histogram.bin_of(statistics.mean);
    let median_bin = histogram.bin_of(statistics.median);

    let labels: Vec<String> = histogram
        .edges
        .iter()
        .take(histogram.n_bins())
        .map(|&edge| format_compact(edge))
        .collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);
    let count_width = format!("{max_count}").len();
    let bar_width = MAX_BAR_WIDTH;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Distribution ({} .. {}, {} bins)",
        format_compact(statistics.min),
        format_compact(statistics.max),
        histogram.n_bins()
    );
    for (i, &count) in histogram.counts.iter().enumerate() {
        let bar_len = count * MAX_BAR_WIDTH / max_count;
        let marker = match (mean_bin == Some(i), median_bin == Some(i)) {
            (true, true) => "  <- mean, median",
            (true, false) => "  <- mean",
            (false, true) => "  <- median",
            (false, false) => "",
        };
        let _ = writeln!(
            out,
            "  {:>label_width$} | {:<bar_width$} {:>count_width$}{}",
            labels[i],
            "#".repeat(bar_len),
            count,
            marker
        );
    }
    out
}

/// Render the outcome as pretty-printed JSON
#[must_use]
pub fn render_json(outcome: &ValuationOutcome, ticker: &str, base_fcf: f64) -> String {
    let stats = &outcome.statistics;
    let json = serde_json::json!({
        "ticker": ticker,
        "base_fcf": base_fcf,
        "iterations_requested": outcome.iterations_requested,
        "iterations_valued": outcome.n_values(),
        "seed": outcome.seed,
        "statistics": {
            "mean": stats.mean,
            "median": stats.median,
            "std_dev": stats.std_dev,
            "p5": stats.p5,
            "p95": stats.p95,
            "min": stats.min,
            "max": stats.max
        },
        "degenerate": {
            "draws": outcome.degenerate.draws,
            "clamped": outcome.degenerate.clamped,
            "excluded": outcome.degenerate.excluded
        }
    });
    serde_json::to_string_pretty(&json).unwrap_or_default()
}

/// Render the outcome as `metric,value` CSV rows
#[must_use]
pub fn render_csv(outcome: &ValuationOutcome, ticker: &str, base_fcf: f64) -> String {
    let stats = &outcome.statistics;
    let mut out = String::new();
    let _ = writeln!(out, "metric,value");
    let _ = writeln!(out, "ticker,{ticker}");
    let _ = writeln!(out, "base_fcf,{base_fcf}");
    let _ = writeln!(out, "iterations_requested,{}", outcome.iterations_requested);
    let _ = writeln!(out, "iterations_valued,{}", outcome.n_values());
    let _ = writeln!(out, "seed,{}", outcome.seed);
    let _ = writeln!(out, "mean,{:.2}", stats.mean);
    let _ = writeln!(out, "median,{:.2}", stats.median);
    let _ = writeln!(out, "std_dev,{:.2}", stats.std_dev);
    let _ = writeln!(out, "p5,{:.2}", stats.p5);
    let _ = writeln!(out, "p95,{:.2}", stats.p95);
    let _ = writeln!(out, "min,{:.2}", stats.min);
    let _ = writeln!(out, "max,{:.2}", stats.max);
    let _ = writeln!(out, "degenerate_draws,{}", outcome.degenerate.draws);
    let _ = writeln!(out, "degenerate_clamped,{}", outcome.degenerate.clamped);
    let _ = writeln!(out, "degenerate_excluded,{}", outcome.degenerate.excluded);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DegenerateSummary, ValuationOutcome};

    fn sample_outcome() -> ValuationOutcome {
        let values = vec![900.0, 1000.0, 1100.0, 1200.0, 1800.0];
        ValuationOutcome {
            statistics: SummaryStatistics::from_values(&values),
            values,
            degenerate: DegenerateSummary::default(),
            iterations_requested: 5,
            seed: 42,
        }
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(93_833_871_360.0), "$93,833,871,360.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.99), "$999.99");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-1234.5), "-$1,234.50");
    }

    #[test]
    fn test_format_compact_suffixes() {
        assert_eq!(format_compact(1.891e12), "$1.89T");
        assert_eq!(format_compact(93.8e9), "$93.80B");
        assert_eq!(format_compact(2.5e6), "$2.50M");
        assert_eq!(format_compact(1500.0), "$1.50K");
        assert_eq!(format_compact(42.0), "$42.00");
        assert_eq!(format_compact(-3.0e9), "-$3.00B");
    }

    #[test]
    fn test_summary_contains_key_lines() {
        let report = render_summary(&sample_outcome(), "AAPL", 93_833_871_360.0);
        assert!(report.contains("Enterprise Value Simulation"));
        assert!(report.contains("Ticker:              AAPL"));
        assert!(report.contains("Base Free Cash Flow: $93,833,871,360.00"));
        assert!(report.contains("Iterations:          5"));
        assert!(report.contains("Seed:                42"));
        assert!(report.contains("Mean:"));
        assert!(report.contains("95th pct:"));
        assert!(report.contains("Degenerate draws:    0"));
    }

    #[test]
    fn test_summary_discloses_exclusions() {
        let mut outcome = sample_outcome();
        outcome.iterations_requested = 8;
        outcome.degenerate = DegenerateSummary {
            draws: 3,
            clamped: 0,
            excluded: 3,
        };
        let report = render_summary(&outcome, "AAPL", 1.0e9);
        assert!(report.contains("Iterations:          8 (5 after exclusions)"));
        assert!(report.contains("Degenerate draws:    3, 3 excluded"));
    }

    #[test]
    fn test_summary_discloses_clamping() {
        let mut outcome = sample_outcome();
        outcome.degenerate = DegenerateSummary {
            draws: 2,
            clamped: 2,
            excluded: 0,
        };
        let report = render_summary(&outcome, "MSFT", 1.0e9);
        assert!(report.contains("Degenerate draws:    2, 2 clamped"));
        assert!(!report.contains("after exclusions"));
    }

    #[test]
    fn test_histogram_marks_mean_and_median() {
        let outcome = sample_outcome();
        let chart = render_histogram(&outcome.values, &outcome.statistics, 5);
        assert!(chart.contains("5 bins"));
        assert!(chart.contains("<- mean") || chart.contains("<- mean, median"));
        assert!(chart.contains("median"));
        assert!(chart.contains('#'));
    }

    #[test]
    fn test_histogram_empty_input() {
        let stats = SummaryStatistics::default();
        assert_eq!(render_histogram(&[], &stats, 20), "(no samples)\n");
    }

    #[test]
    fn test_histogram_bar_scales_to_modal_bin() {
        let values = vec![1.0, 1.0, 1.0, 1.0, 10.0];
        let stats = SummaryStatistics::from_values(&values);
        let chart = render_histogram(&values, &stats, 2);
        let full_bar = "#".repeat(MAX_BAR_WIDTH);
        assert!(chart.contains(&full_bar));
    }

    #[test]
    fn test_json_round_trips() {
        let outcome = sample_outcome();
        let rendered = render_json(&outcome, "AAPL", 93_833_871_360.0);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["ticker"], "AAPL");
        assert_eq!(parsed["iterations_requested"], 5);
        assert_eq!(parsed["seed"], 42);
        assert!(parsed["statistics"]["mean"].is_f64());
        assert_eq!(parsed["degenerate"]["excluded"], 0);
    }

    #[test]
    fn test_csv_has_header_and_metrics() {
        let rendered = render_csv(&sample_outcome(), "AAPL", 1.0e9);
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("metric,value"));
        assert!(rendered.contains("ticker,AAPL"));
        assert!(rendered.contains("mean,"));
        assert!(rendered.contains("degenerate_excluded,0"));
    }
}
