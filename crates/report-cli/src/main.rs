//! report-cli: score tickers from bars and fundamentals already on disk.
//!
//! The input is one `{symbol, bars, fundamentals}` object or an array of them.
//! A single ticker goes through the cached fetch path; an array is analyzed
//! in parallel. Reports are printed to stdout as JSON.
//!
//! Usage:
//!   cargo run -p report-cli -- --input nvda.json
//!   cargo run -p report-cli -- --input watchlist.json --basic --pretty
//!   cat nvda.json | cargo run -p report-cli

use std::io::Read;

use analysis_orchestrator::{AnalysisOrchestrator, InMemorySource, OrchestratorConfig, PrefetchedInput};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use technical_analysis::IndicatorSet;

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<PrefetchedInput>),
    One(PrefetchedInput),
}

struct Args {
    input: Option<String>,
    basic: bool,
    pretty: bool,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut parsed = Args {
        input: None,
        basic: false,
        pretty: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" | "-i" => {
                let path = iter.next().context("--input needs a file path")?;
                parsed.input = Some(path.clone());
            }
            "--basic" => parsed.basic = true,
            "--pretty" => parsed.pretty = true,
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

fn read_payload(input: Option<&str>) -> Result<Payload> {
    let raw = match input {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("input is not a ticker payload or an array of them")
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "report_cli=info,analysis_orchestrator=info".into())
    };
    // logs go to stderr so stdout stays valid JSON
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    }

    let args = parse_args()?;
    let mut config = OrchestratorConfig::from_env()?;
    if args.basic {
        config.indicator_set = IndicatorSet::Basic;
    }
    tracing::info!(
        "Indicator set: {:?}, history: {} days",
        config.indicator_set,
        config.history_days
    );

    match read_payload(args.input.as_deref())? {
        Payload::One(input) => {
            let symbol = input.symbol.clone();
            let source = InMemorySource::new()
                .with_bars(&symbol, input.bars)
                .with_fundamentals(&symbol, input.fundamentals);
            let orchestrator = AnalysisOrchestrator::new(source, config)?;
            let report = orchestrator
                .analyze(&symbol)
                .await
                .with_context(|| format!("analysis failed for {}", symbol))?;
            print_json(&report, args.pretty)?;
        }
        Payload::Many(inputs) => {
            let orchestrator = AnalysisOrchestrator::new(InMemorySource::new(), config)?;
            let mut reports = Vec::with_capacity(inputs.len());
            for (input, result) in inputs.iter().zip(orchestrator.analyze_prefetched(&inputs)) {
                match result {
                    Ok(report) => reports.push(report),
                    Err(e) => tracing::warn!("Skipping {}: {}", input.symbol, e),
                }
            }
            tracing::info!("{} of {} tickers analyzed", reports.len(), inputs.len());
            print_json(&reports, args.pretty)?;
        }
    }

    Ok(())
}
