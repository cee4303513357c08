//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::config_validation::validate_scan_config;
use crate::domain::error::SignalError;
use crate::domain::evaluator::EvaluatorConfig;
use crate::domain::pipeline::{self, ScanConfig, DEFAULT_LOOKBACK_DAYS};
use crate::domain::pool::parse_pool;
use crate::domain::ranking::DEFAULT_TOP_N;
use crate::domain::sizing::{RiskConfig, SizingConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "etfscan", about = "Daily ETF signal scanner")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the instrument pool and print the ranked report
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        top_n: Option<usize>,
        /// Mark the run as inside the execution window
        #[arg(long)]
        execution_window: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without reading market data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for the benchmark and pool instruments
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Scan {
            config,
            data_dir,
            top_n,
            execution_window,
            output,
        } => run_scan(
            &config,
            data_dir.as_deref(),
            top_n,
            execution_window,
            output.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, code } => run_info(&config, code.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Logs go to stderr so the report can be piped from stdout.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SignalError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn run_scan(
    config_path: &Path,
    data_dir: Option<&Path>,
    top_n: Option<usize>,
    execution_window: bool,
    output_path: Option<&Path>,
) -> Result<(), SignalError> {
    // Stage 1: Load and validate config
    let adapter = load_config(config_path)?;
    validate_scan_config(&adapter)?;

    // Stage 2: Build ScanConfig, apply command-line overrides
    let mut scan_config = build_scan_config(&adapter)?;
    if let Some(n) = top_n {
        if n == 0 {
            return Err(SignalError::ConfigInvalid {
                section: "scan".into(),
                key: "top_n".into(),
                reason: "top_n must be at least 1".into(),
            });
        }
        scan_config.top_n = n;
    }
    if execution_window {
        scan_config.execution_window = true;
    }

    // Stage 3: Run the pipeline over the CSV data directory
    let data_dir = resolve_data_dir(data_dir, &adapter);
    let data_port = CsvAdapter::new(data_dir);
    let outcome = pipeline::scan(&data_port, &scan_config)?;

    // Stage 4: Report
    TextReportAdapter::new().write(&outcome, &scan_config.pool, output_path)?;
    if let Some(path) = output_path {
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

pub fn resolve_data_dir(data_dir: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => config
            .get_string("data", "dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    }
}

fn non_negative_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SignalError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value).map_err(|_| SignalError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{} must not be negative", key),
    })
}

pub fn build_scan_config(config: &dyn ConfigPort) -> Result<ScanConfig, SignalError> {
    let benchmark = config
        .get_string("market", "benchmark")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SignalError::ConfigMissing {
            section: "market".into(),
            key: "benchmark".into(),
        })?;

    let instruments = config.get_string("pool", "instruments").ok_or_else(|| {
        SignalError::ConfigMissing {
            section: "pool".into(),
            key: "instruments".into(),
        }
    })?;
    let pool = parse_pool(&instruments).map_err(|e| SignalError::ConfigInvalid {
        section: "pool".into(),
        key: "instruments".into(),
        reason: e.to_string(),
    })?;

    let sizing_defaults = SizingConfig::default();
    let risk_defaults = RiskConfig::default();
    let evaluator_defaults = EvaluatorConfig::default();

    let evaluator = EvaluatorConfig {
        buy_kdj_ceiling: config.get_double(
            "signal",
            "buy_kdj_ceiling",
            evaluator_defaults.buy_kdj_ceiling,
        ),
        sell_kdj_overheat: config.get_double(
            "signal",
            "sell_kdj_overheat",
            evaluator_defaults.sell_kdj_overheat,
        ),
        sizing: SizingConfig {
            normal_fraction: config.get_double(
                "sizing",
                "normal_fraction",
                sizing_defaults.normal_fraction,
            ),
            derated_fraction: config.get_double(
                "sizing",
                "derated_fraction",
                sizing_defaults.derated_fraction,
            ),
            derate_kdj: config.get_double("signal", "derate_kdj", sizing_defaults.derate_kdj),
            extreme_kdj: config.get_double("signal", "extreme_kdj", sizing_defaults.extreme_kdj),
        },
        risk: RiskConfig {
            stop_loss_pct: config.get_double("risk", "stop_loss_pct", risk_defaults.stop_loss_pct),
            take_profit_pct: config.get_double(
                "risk",
                "take_profit_pct",
                risk_defaults.take_profit_pct,
            ),
            take_profit_extended_pct: config.get_double(
                "risk",
                "take_profit_extended_pct",
                risk_defaults.take_profit_extended_pct,
            ),
        },
    };

    Ok(ScanConfig {
        benchmark,
        pool,
        lookback_days: non_negative_usize(config, "data", "lookback_days", DEFAULT_LOOKBACK_DAYS)?,
        top_n: non_negative_usize(config, "scan", "top_n", DEFAULT_TOP_N)?,
        execution_window: config.get_bool("scan", "execution_window", false),
        evaluator,
    })
}

fn run_validate(config_path: &Path) -> Result<(), SignalError> {
    let adapter = load_config(config_path)?;
    validate_scan_config(&adapter)?;
    let config = build_scan_config(&adapter)?;

    println!("Benchmark: {}", config.benchmark);
    println!("Pool ({} instruments):", config.pool.count());
    for entry in &config.pool.entries {
        println!("  {}  {}", entry.code, entry.name);
    }
    println!("Lookback: {} bars", config.lookback_days);
    println!("Top N: {}", config.top_n);
    println!(
        "Execution window: {}",
        if config.execution_window { "open" } else { "closed" }
    );

    let evaluator = &config.evaluator;
    println!(
        "Signal: buy kdj <= {}, sell overheat kdj > {}",
        evaluator.buy_kdj_ceiling, evaluator.sell_kdj_overheat
    );
    println!(
        "Sizing: normal {}, derated {} above kdj {}, blocked above kdj {}",
        evaluator.sizing.normal_fraction,
        evaluator.sizing.derated_fraction,
        evaluator.sizing.derate_kdj,
        evaluator.sizing.extreme_kdj
    );
    println!(
        "Risk: stop -{}%, targets +{}% / +{}%",
        evaluator.risk.stop_loss_pct,
        evaluator.risk.take_profit_pct,
        evaluator.risk.take_profit_extended_pct
    );

    println!("\nConfiguration is valid.");
    Ok(())
}

fn run_info(config_path: &Path, code: Option<&str>) -> Result<(), SignalError> {
    let adapter = load_config(config_path)?;
    let data_port = CsvAdapter::new(resolve_data_dir(None, &adapter));

    let codes = resolve_codes(code, &adapter)?;
    for c in &codes {
        match data_port.get_data_range(c) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} bars, {} to {}", c, count, first, last);
            }
            Ok(None) => println!("{}: no data found", c),
            Err(e) => warn!(code = %c, "{e}"),
        }
    }
    Ok(())
}

/// `--code` if given, otherwise the benchmark followed by the pool.
pub fn resolve_codes(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, SignalError> {
    if let Some(c) = code_override {
        return Ok(vec![c.trim().to_string()]);
    }

    let mut codes = Vec::new();
    if let Some(benchmark) = config.get_string("market", "benchmark") {
        let benchmark = benchmark.trim();
        if !benchmark.is_empty() {
            codes.push(benchmark.to_string());
        }
    }
    if let Some(instruments) = config.get_string("pool", "instruments") {
        let pool = parse_pool(&instruments).map_err(|e| SignalError::ConfigInvalid {
            section: "pool".into(),
            key: "instruments".into(),
            reason: e.to_string(),
        })?;
        codes.extend(pool.codes().map(str::to_string));
    }
    Ok(codes)
}
