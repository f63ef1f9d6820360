//! alertchart - watch a symbol, replay a CSV or run the alert monitor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use alertchart::runner::{self, LiveRunner, Services};
use alertchart::{Dashboard, RecordingSurface};
use alertchart_analysis::{AnalysisService, HeuristicAnalyzer, RemoteAnalyzer};
use alertchart_config::Config;
use alertchart_core::{sanitize_symbol, Timeframe};
use alertchart_data::{BinanceSource, CsvSource};
use alertchart_trigger::MemoryStore;
use binance_api::{BinanceClient, WsConfig};

const USAGE: &str = "\
Usage:
  alertchart [watch] [--symbol S] [--interval I] [--config PATH] [--store PATH]
  alertchart replay <csv> [--history N] [--symbol S] [--interval I] [--config PATH]
  alertchart monitor <alerts.json> [--config PATH]";

#[derive(Debug, Default)]
struct Args {
    command: String,
    path: Option<PathBuf>,
    symbol: Option<String>,
    interval: Option<String>,
    config: Option<PathBuf>,
    store: Option<PathBuf>,
    history: Option<usize>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        command: "watch".to_string(),
        ..Args::default()
    };
    let mut iter = std::env::args().skip(1).peekable();

    if let Some(first) = iter.peek() {
        if !first.starts_with("--") {
            args.command = first.clone();
            iter.next();
        }
    }

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| iter.next().with_context(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--symbol" => args.symbol = Some(value("--symbol")?),
            "--interval" => args.interval = Some(value("--interval")?),
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--store" => args.store = Some(PathBuf::from(value("--store")?)),
            "--history" => {
                args.history = Some(value("--history")?.parse().context("--history must be a number")?)
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if !other.starts_with("--") && args.path.is_none() => {
                args.path = Some(PathBuf::from(other));
            }
            other => bail!("unexpected argument {other}\n{USAGE}"),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(Config::load_default()),
    }
}

fn session_target(args: &Args, config: &Config) -> Result<(String, Timeframe)> {
    let symbol = sanitize_symbol(args.symbol.as_deref().unwrap_or(&config.general.default_symbol));
    if symbol.is_empty() {
        bail!("no symbol given");
    }
    let label = args.interval.as_deref().unwrap_or(&config.general.default_interval);
    let interval = Timeframe::from_label(label).with_context(|| format!("unknown interval {label}"))?;
    Ok((symbol, interval))
}

fn binance_source(config: &Config) -> Result<BinanceSource> {
    let api = binance_api::Config::public()
        .with_base_url(&config.api.rest_url)
        .with_timeout(Duration::from_secs(config.api.timeout_secs));
    Ok(BinanceSource::new(BinanceClient::new(api)?))
}

fn analyzer(config: &Config) -> Result<Arc<dyn AnalysisService>> {
    let timeout = Duration::from_secs(config.api.timeout_secs);
    match RemoteAnalyzer::from_config(&config.analysis, timeout).transpose()? {
        Some(remote) => Ok(Arc::new(remote)),
        None => {
            log::info!("No analysis endpoint configured, using the heuristic analyzer");
            Ok(Arc::new(HeuristicAnalyzer::new()))
        }
    }
}

async fn watch(args: &Args, config: &Config) -> Result<()> {
    let (symbol, interval) = session_target(args, config)?;
    let store = match &args.store {
        Some(path) => MemoryStore::load_or_default(path)?,
        None => MemoryStore::new(),
    };

    let services = Services {
        history: Arc::new(binance_source(config)?),
        analyzer: analyzer(config)?,
        history_limit: config.api.history_limit,
    };
    let ws_config = WsConfig::default().with_url(&config.api.ws_url);
    let dashboard = Dashboard::from_config(config, store, RecordingSurface::new());

    let dashboard = LiveRunner::new(dashboard, services, ws_config)
        .run(&symbol, interval)
        .await;

    if let Some(path) = &args.store {
        dashboard.into_store().save(path)?;
        log::info!("Saved alerts and notifications to {}", path.display());
    }
    Ok(())
}

async fn replay(args: &Args, config: &Config) -> Result<()> {
    let path = args.path.as_ref().with_context(|| format!("replay needs a CSV file\n{USAGE}"))?;
    let (symbol, interval) = session_target(args, config)?;
    let candles = CsvSource::new(path).load()?;
    let history = args.history.unwrap_or(config.analysis.window).min(candles.len());

    let mut dashboard = Dashboard::from_config(config, MemoryStore::new(), RecordingSurface::new());
    let summary = runner::replay(
        &mut dashboard,
        &symbol,
        interval,
        candles,
        history,
        &HeuristicAnalyzer::new(),
    )
    .await;

    println!(
        "Replayed {} ticks after {} history candles, {} messages",
        summary.ticks,
        summary.history,
        summary.messages.len()
    );
    for message in &summary.messages {
        println!("  {message}");
    }
    Ok(())
}

async fn monitor(args: &Args, config: &Config) -> Result<()> {
    let path = args.path.as_ref().with_context(|| format!("monitor needs an alerts file\n{USAGE}"))?;
    let source = binance_source(config)?;

    let outcome = runner::monitor_file(path, |symbols| async move {
        let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
        Ok::<_, anyhow::Error>(source.latest_prices(&symbols).await?)
    })
    .await?;

    for n in &outcome.notifications {
        println!("{}", n.message);
    }
    Ok(())
}

async fn run() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let config = load_config(&args)?;

    match args.command.as_str() {
        "watch" => watch(&args, &config).await,
        "replay" => replay(&args, &config).await,
        "monitor" => monitor(&args, &config).await,
        other => bail!("unknown command {other}\n{USAGE}"),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
