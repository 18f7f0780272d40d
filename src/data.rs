//! Base cash flow acquisition
//!
//! One upstream call resolves a ticker to its trailing free cash flow.
//! Everything downstream works with a validated positive amount; this
//! module never substitutes a fallback value.

use log::debug;
use serde::Deserialize;

use crate::error::{Result, ValorarError};

/// Yahoo Finance quote-summary endpoint
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const USER_AGENT: &str = "valorar/0.1";
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Source of the base free-cash-flow figure for a ticker
pub trait CashFlowSource {
    /// Resolve a ticker to a positive, finite free cash flow in USD
    fn base_free_cash_flow(&self, ticker: &str) -> Result<f64>;
}

/// Live Yahoo Finance source
pub struct YahooFinance {
    agent: ureq::Agent,
}

impl YahooFinance {
    /// Create a source with a bounded request timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build(),
        }
    }
}

impl Default for YahooFinance {
    fn default() -> Self {
        Self::new()
    }
}

impl CashFlowSource for YahooFinance {
    fn base_free_cash_flow(&self, ticker: &str) -> Result<f64> {
        validate_ticker(ticker)?;
        let url = format!("{QUOTE_SUMMARY_URL}/{ticker}?modules=financialData");
        debug!("fetching free cash flow from {url}");

        let body = self
            .agent
            .get(&url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| ValorarError::data_unavailable(ticker, e.to_string()))?
            .into_string()
            .map_err(|e| ValorarError::data_unavailable(ticker, e.to_string()))?;

        parse_quote_summary(&body, ticker)
    }
}

/// Fixed source for offline runs and tests
pub struct FixedCashFlow {
    amount: f64,
}

impl FixedCashFlow {
    /// Create a source that always supplies `amount`
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }
}

impl CashFlowSource for FixedCashFlow {
    fn base_free_cash_flow(&self, ticker: &str) -> Result<f64> {
        if self.amount.is_finite() && self.amount > 0.0 {
            Ok(self.amount)
        } else {
            Err(ValorarError::data_unavailable(
                ticker,
                format!(
                    "supplied free cash flow {} is not a positive amount",
                    self.amount
                ),
            ))
        }
    }
}

fn validate_ticker(ticker: &str) -> Result<()> {
    let well_formed = !ticker.is_empty()
        && ticker.len() <= 12
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'));
    if well_formed {
        Ok(())
    } else {
        Err(ValorarError::data_unavailable(
            ticker,
            "not a valid ticker symbol",
        ))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteResult {
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Deserialize)]
struct FinancialData {
    #[serde(rename = "freeCashflow")]
    free_cashflow: Option<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    raw: Option<f64>,
}

/// Extract and validate the free cash flow from a quote-summary payload
///
/// Rejects missing, non-finite, and non-positive amounts; a company with
/// negative trailing free cash flow cannot be valued by this model.
pub fn parse_quote_summary(body: &str, ticker: &str) -> Result<f64> {
    let response: QuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| ValorarError::data_unavailable(ticker, format!("malformed payload: {e}")))?;

    let amount = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.financial_data)
        .and_then(|data| data.free_cashflow)
        .and_then(|field| field.raw);

    match amount {
        Some(raw) if raw.is_finite() && raw > 0.0 => Ok(raw),
        Some(raw) => Err(ValorarError::data_unavailable(
            ticker,
            format!("free cash flow {raw} is not a positive amount"),
        )),
        None => Err(ValorarError::data_unavailable(
            ticker,
            "no freeCashflow figure in quote summary",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AAPL_PAYLOAD: &str = r#"{
        "quoteSummary": {
            "result": [{
                "financialData": {
                    "freeCashflow": {"raw": 93833871360.0, "fmt": "93.83B"},
                    "currentPrice": {"raw": 231.59}
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_extracts_free_cash_flow() {
        let fcf = parse_quote_summary(AAPL_PAYLOAD, "AAPL").unwrap();
        assert!((fcf - 93_833_871_360.0).abs() < 1.0);
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let payload = r#"{"quoteSummary": {"result": [{"financialData": {}}], "error": null}}"#;
        let err = parse_quote_summary(payload, "AAPL").unwrap_err();
        assert!(matches!(err, ValorarError::DataUnavailable { .. }));
    }

    #[test]
    fn test_parse_rejects_null_raw_value() {
        let payload = r#"{
            "quoteSummary": {
                "result": [{"financialData": {"freeCashflow": {"raw": null}}}],
                "error": null
            }
        }"#;
        assert!(parse_quote_summary(payload, "AAPL").is_err());
    }

    #[test]
    fn test_parse_rejects_negative_cash_flow() {
        let payload = r#"{
            "quoteSummary": {
                "result": [{"financialData": {"freeCashflow": {"raw": -5000000.0}}}],
                "error": null
            }
        }"#;
        let err = parse_quote_summary(payload, "UBER").unwrap_err();
        assert!(err.to_string().contains("not a positive amount"));
    }

    #[test]
    fn test_parse_rejects_empty_result() {
        let payload = r#"{"quoteSummary": {"result": [], "error": null}}"#;
        assert!(parse_quote_summary(payload, "AAPL").is_err());

        let null_result = r#"{"quoteSummary": {"result": null, "error": "Not Found"}}"#;
        assert!(parse_quote_summary(null_result, "AAPL").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_quote_summary("not json", "AAPL").unwrap_err();
        assert!(err.to_string().contains("malformed payload"));
    }

    #[test]
    fn test_fixed_source_supplies_amount() {
        let source = FixedCashFlow::new(93_833_871_360.0);
        let fcf = source.base_free_cash_flow("AAPL").unwrap();
        assert!((fcf - 93_833_871_360.0).abs() < 1.0);
    }

    #[test]
    fn test_fixed_source_rejects_non_positive_amounts() {
        assert!(FixedCashFlow::new(0.0).base_free_cash_flow("X").is_err());
        assert!(FixedCashFlow::new(-10.0).base_free_cash_flow("X").is_err());
        assert!(FixedCashFlow::new(f64::NAN).base_free_cash_flow("X").is_err());
        assert!(FixedCashFlow::new(f64::INFINITY)
            .base_free_cash_flow("X")
            .is_err());
    }

    #[test]
    fn test_ticker_validation() {
        assert!(validate_ticker("AAPL").is_ok());
        assert!(validate_ticker("BRK-B").is_ok());
        assert!(validate_ticker("^GSPC").is_ok());
        assert!(validate_ticker("").is_err());
        assert!(validate_ticker("AAPL?modules=evil").is_err());
        assert!(validate_ticker("far/too/long/to/be/real").is_err());
    }
}
