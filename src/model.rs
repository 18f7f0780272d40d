//! Discounted cash flow arithmetic
//!
//! Pure projection and discounting math over one iteration's sampled
//! rates. No randomness, no I/O; the engine guarantees viable inputs.

use crate::engine::types::{RateSample, TerminalValue};

/// Project free cash flow for each year in `[1, horizon]`
///
/// Year `t` compounds the base flow by `(1 + growth)^t`.
#[must_use]
pub fn project_cash_flows(base_fcf: f64, growth: f64, horizon: u32) -> Vec<f64> {
    let factor = 1.0 + growth;
    let mut flows = Vec::with_capacity(horizon as usize);
    let mut flow = base_fcf;
    for _ in 0..horizon {
        flow *= factor;
        flows.push(flow);
    }
    flows
}

/// Present value of a cash-flow path
///
/// Element `i` is treated as the flow for year `i + 1` and discounted by
/// `(1 + discount)^(i + 1)`.
#[must_use]
pub fn present_value(cash_flows: &[f64], discount: f64) -> f64 {
    let factor = 1.0 + discount;
    cash_flows
        .iter()
        .enumerate()
        .map(|(i, flow)| flow / factor.powi(i as i32 + 1))
        .sum()
}

/// Terminal value at the horizon, before discounting
///
/// Under perpetuity growth the caller must guarantee
/// `discount > terminal growth`; the engine's viability check does.
#[must_use]
pub fn terminal_value(horizon_fcf: f64, discount: f64, terminal: &TerminalValue) -> f64 {
    match *terminal {
        TerminalValue::Gordon { growth } => horizon_fcf * (1.0 + growth) / (discount - growth),
        TerminalValue::ExitMultiple { multiple } => horizon_fcf * multiple,
    }
}

/// Enterprise value for one iteration's sampled rates
///
/// Sum of the discounted projected flows and the discounted terminal
/// value.
#[must_use]
pub fn enterprise_value(
    base_fcf: f64,
    rates: &RateSample,
    horizon: u32,
    terminal: &TerminalValue,
) -> f64 {
    let cash_flows = project_cash_flows(base_fcf, rates.growth, horizon);
    let pv = present_value(&cash_flows, rates.discount);

    let horizon_fcf = cash_flows.last().copied().unwrap_or(base_fcf);
    let tv = terminal_value(horizon_fcf, rates.discount, terminal);

    pv + tv / (1.0 + rates.discount).powi(horizon as i32)
}
