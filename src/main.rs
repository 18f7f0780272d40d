//! valorar CLI
//!
//! Monte Carlo DCF enterprise valuation from the command line.

use env_logger::Env;

use valorar::cli::{Cli, OutputFormat};
use valorar::data::{CashFlowSource, FixedCashFlow, YahooFinance};
use valorar::engine::DcfEngine;
use valorar::error::Result;
use valorar::report;

fn main() {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base_fcf = match cli.fcf {
        Some(amount) => FixedCashFlow::new(amount).base_free_cash_flow(&cli.ticker)?,
        None => YahooFinance::new().base_free_cash_flow(&cli.ticker)?,
    };

    // Keep json and csv output machine-clean; the confirmation line is
    // table-only.
    if cli.format == OutputFormat::Table {
        println!(
            "Base free cash flow for {}: {}",
            cli.ticker,
            report::format_currency(base_fcf)
        );
        println!();
    }

    let engine = DcfEngine::new(cli.parameters(base_fcf))?;
    let outcome = if cli.parallel {
        engine.run_parallel()?
    } else {
        engine.run()?
    };

    match cli.format {
        OutputFormat::Table => {
            print!(
                "{}",
                report::render_summary(&outcome, &cli.ticker, base_fcf)
            );
            if cli.bins > 0 && !outcome.values.is_empty() {
                println!();
                print!(
                    "{}",
                    report::render_histogram(&outcome.values, &outcome.statistics, cli.bins)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", report::render_json(&outcome, &cli.ticker, base_fcf));
        }
        OutputFormat::Csv => {
            print!("{}", report::render_csv(&outcome, &cli.ticker, base_fcf));
        }
    }

    Ok(())
}
