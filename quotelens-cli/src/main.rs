//! QuoteLens CLI — a terminal stand-in for the dashboard.
//!
//! Commands:
//! - `resolve` — resolve a company name or ticker to a symbol
//! - `show` — resolve, fetch a period of bars, print metrics and recent rows
//! - `intervals` — print the interval cascade tried for a period

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quotelens_core::data::{candidate_intervals, CancelToken, LookupMiss, SeriesOutcome};
use quotelens_core::domain::{CompanyQuery, Period, Series, Symbol};
use quotelens_core::indicators::{IndicatorRow, IndicatorSet, MIN_BARS_FOR_METRICS};
use quotelens_core::{CoreConfig, QuoteService, SymbolLookup};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotelens",
    about = "QuoteLens CLI — company lookup, price history and indicators"
)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Abort symbol search retries after this many seconds.
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a company name or ticker to a symbol.
    Resolve {
        /// Company name or ticker (e.g., "Tesla Inc", AAPL).
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Fetch price history for a company and print indicators.
    Show {
        /// Company name or ticker.
        #[arg(required = true)]
        query: Vec<String>,

        /// Period: 5d, 1mo, 3mo, 6mo, 1y, 5y, max.
        #[arg(long, default_value = "1y")]
        period: String,

        /// Number of recent rows to print.
        #[arg(long, default_value_t = 20)]
        rows: usize,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the sampling intervals tried for a period, in order.
    Intervals {
        period: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CoreConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoreConfig::default(),
    };
    let cancel = deadline_token(cli.deadline_secs);

    match cli.command {
        Commands::Resolve { query } => {
            let service = QuoteService::yahoo(&config).context("building data service")?;
            run_resolve(&service, &CompanyQuery::new(query.join(" ")), &cancel);
            Ok(())
        }
        Commands::Show {
            query,
            period,
            rows,
            json,
        } => {
            let service = QuoteService::yahoo(&config).context("building data service")?;
            run_show(
                &service,
                &CompanyQuery::new(query.join(" ")),
                &Period::parse(&period),
                rows,
                json,
                &cancel,
            )
        }
        Commands::Intervals { period } => {
            let period = Period::parse(&period);
            let cascade: Vec<&str> = candidate_intervals(&period)
                .iter()
                .map(|iv| iv.as_str())
                .collect();
            println!("{period}: {}", cascade.join(" → "));
            Ok(())
        }
    }
}

/// Token that fires after `secs`, standing in for a host request timeout.
fn deadline_token(secs: Option<u64>) -> CancelToken {
    let token = CancelToken::new();
    if let Some(secs) = secs {
        let remote = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            remote.cancel();
        });
    }
    token
}

fn resolve(service: &QuoteService, query: &CompanyQuery, cancel: &CancelToken) -> Option<Symbol> {
    match service.resolve_symbol_cancellable(query, cancel) {
        SymbolLookup::Found { symbol } => Some(symbol),
        SymbolLookup::NotFound { miss } => {
            match miss {
                LookupMiss::NoMatch => debug!(query = query.raw(), "search returned no match"),
                LookupMiss::TransportExhausted { attempts } => {
                    warn!(query = query.raw(), attempts, "symbol search unavailable")
                }
                LookupMiss::Cancelled => warn!(query = query.raw(), "symbol search timed out"),
            }
            None
        }
    }
}

fn run_resolve(service: &QuoteService, query: &CompanyQuery, cancel: &CancelToken) {
    match resolve(service, query, cancel) {
        Some(symbol) => println!("{symbol}"),
        None => println!("No ticker found for \"{}\".", query.raw()),
    }
}

fn run_show(
    service: &QuoteService,
    query: &CompanyQuery,
    period: &Period,
    rows: usize,
    json: bool,
    cancel: &CancelToken,
) -> Result<()> {
    let Some(symbol) = resolve(service, query, cancel) else {
        println!("No ticker found for \"{}\".", query.raw());
        return Ok(());
    };

    let outcome = service.fetch_series_cached(&symbol, period);
    let series = match outcome.as_ref() {
        SeriesOutcome::Fetched { series } => series,
        SeriesOutcome::Empty { last_interval } => {
            println!(
                "No data found for {symbol} ({period}, last interval tried: {last_interval}). \
                 Please check the stock symbol."
            );
            return Ok(());
        }
    };

    let indicators = service.compute_indicators(series);
    if !indicators.has_enough_for_metrics() {
        println!(
            "Not enough data to compute metrics ({} bars, need {MIN_BARS_FOR_METRICS}). \
             Try a longer period.",
            indicators.len()
        );
        return Ok(());
    }

    if json {
        print_json(series, &indicators, rows)
    } else {
        print_table(series, &indicators, rows);
        Ok(())
    }
}

fn print_json(series: &Series, indicators: &IndicatorSet, rows: usize) -> Result<()> {
    let doc = serde_json::json!({
        "symbol": series.symbol(),
        "period": series.period(),
        "interval": series.interval(),
        "bars": series.len(),
        "latest": indicators.latest(),
        "rows": indicators.tail(rows),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

fn print_table(series: &Series, indicators: &IndicatorSet, rows: usize) {
    let latest = indicators.latest();
    println!();
    println!("=== {} ({}) ===", series.symbol(), series.period());
    println!("Interval:            {}", series.interval());
    println!("Bars:                {}", series.len());
    println!(
        "Latest Close:        {}",
        latest
            .latest_close
            .map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}"))
    );
    println!("Volatility (20):     {}", fmt_opt(latest.volatility20));
    println!("RSI (14):            {}", fmt_opt(latest.rsi14));
    println!();
    println!("--- Recent Data ---");
    println!(
        "{:<17} {:>10} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}",
        "Time", "Close", "MA20", "MA50", "Vol20", "RSI14", "BB Upper", "BB Lower"
    );
    for row in indicators.tail(rows) {
        print_row(row);
    }
}

fn print_row(row: &IndicatorRow) {
    println!(
        "{:<17} {:>10.2} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}",
        row.timestamp.format("%Y-%m-%d %H:%M"),
        row.close,
        fmt_opt(row.ma20),
        fmt_opt(row.ma50),
        fmt_opt(row.volatility20),
        fmt_opt(row.rsi14),
        fmt_opt(row.bb_upper),
        fmt_opt(row.bb_lower),
    );
}
