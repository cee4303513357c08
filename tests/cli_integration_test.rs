//! CLI integration tests for config building and command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_scan_config)
//! - Code and data directory resolution
//! - validate / info / scan commands against real INI and CSV files on disk

mod common;

use clap::Parser;
use common::*;
use etfscan::adapters::file_config_adapter::FileConfigAdapter;
use etfscan::cli::{self, Cli};
use etfscan::domain::error::SignalError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn write_csv(dir: &Path, code: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for bar in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", code)), content).unwrap();
}

fn same_code(a: ExitCode, b: ExitCode) -> bool {
    format!("{:?}", a) == format!("{:?}", b)
}

const VALID_INI: &str = r#"
[data]
dir = ./data
lookback_days = 60

[market]
benchmark = sh000300

[pool]
instruments = 159516:Semiconductor Equipment ETF, 512000:Securities ETF, 159770:Robotics ETF

[scan]
top_n = 2
execution_window = true

[signal]
buy_kdj_ceiling = 80
sell_kdj_overheat = 75
derate_kdj = 82
extreme_kdj = 88

[sizing]
normal_fraction = 0.25
derated_fraction = 0.1

[risk]
stop_loss_pct = 5.0
take_profit_pct = 8.0
take_profit_extended_pct = 12.0
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_scan_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_scan_config(&adapter).unwrap();

        assert_eq!(config.benchmark, "sh000300");
        assert_eq!(config.pool.count(), 3);
        assert_eq!(config.pool.entries[2].code, "159770");
        assert_eq!(config.pool.entries[2].name, "Robotics ETF");
        assert_eq!(config.lookback_days, 60);
        assert_eq!(config.top_n, 2);
        assert!(config.execution_window);

        let evaluator = &config.evaluator;
        assert_eq!(evaluator.buy_kdj_ceiling, 80.0);
        assert_eq!(evaluator.sell_kdj_overheat, 75.0);
        assert_eq!(evaluator.sizing.derate_kdj, 82.0);
        assert_eq!(evaluator.sizing.extreme_kdj, 88.0);
        assert_eq!(evaluator.sizing.normal_fraction, 0.25);
        assert_eq!(evaluator.sizing.derated_fraction, 0.1);
        assert_eq!(evaluator.risk.stop_loss_pct, 5.0);
        assert_eq!(evaluator.risk.take_profit_pct, 8.0);
        assert_eq!(evaluator.risk.take_profit_extended_pct, 12.0);
    }

    #[test]
    fn build_scan_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string(
            "[market]\nbenchmark = sh000300\n[pool]\ninstruments = 159516\n",
        )
        .unwrap();
        let config = cli::build_scan_config(&adapter).unwrap();

        assert_eq!(config.lookback_days, 60);
        assert_eq!(config.top_n, 3);
        assert!(!config.execution_window);
        assert_eq!(config.evaluator.buy_kdj_ceiling, 85.0);
        assert_eq!(config.evaluator.sell_kdj_overheat, 80.0);
        assert_eq!(config.evaluator.sizing.normal_fraction, 0.3);
        assert_eq!(config.evaluator.sizing.derated_fraction, 0.2);
        assert_eq!(config.evaluator.risk.stop_loss_pct, 4.0);
        assert_eq!(config.pool.entries[0].name, "159516");
    }

    #[test]
    fn build_scan_config_missing_benchmark() {
        let adapter = FileConfigAdapter::from_string("[pool]\ninstruments = 159516\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, SignalError::ConfigMissing { ref key, .. } if key == "benchmark"));
    }

    #[test]
    fn build_scan_config_missing_pool() {
        let adapter = FileConfigAdapter::from_string("[market]\nbenchmark = X\n").unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, SignalError::ConfigMissing { ref key, .. } if key == "instruments"));
    }

    #[test]
    fn build_scan_config_bad_pool() {
        let adapter =
            FileConfigAdapter::from_string("[market]\nbenchmark = X\n[pool]\ninstruments = A,,B\n")
                .unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(matches!(err, SignalError::ConfigInvalid { ref section, .. } if section == "pool"));
    }

    #[test]
    fn build_scan_config_negative_lookback() {
        let adapter = FileConfigAdapter::from_string(
            "[market]\nbenchmark = X\n[pool]\ninstruments = A\n[data]\nlookback_days = -5\n",
        )
        .unwrap();
        let err = cli::build_scan_config(&adapter).unwrap_err();
        assert!(
            matches!(err, SignalError::ConfigInvalid { ref key, .. } if key == "lookback_days")
        );
    }
}

mod code_resolution {
    use super::*;

    #[test]
    fn override_single_code() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let codes = cli::resolve_codes(Some(" 512000 "), &adapter).unwrap();
        assert_eq!(codes, vec!["512000"]);
    }

    #[test]
    fn benchmark_then_pool() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let codes = cli::resolve_codes(None, &adapter).unwrap();
        assert_eq!(codes, vec!["sh000300", "159516", "512000", "159770"]);
    }

    #[test]
    fn nothing_configured() {
        let adapter = FileConfigAdapter::from_string("[scan]\ntop_n = 3\n").unwrap();
        assert!(cli::resolve_codes(None, &adapter).unwrap().is_empty());
    }

    #[test]
    fn data_dir_override_takes_precedence() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(
            cli::resolve_data_dir(Some(Path::new("/tmp/bars")), &adapter),
            PathBuf::from("/tmp/bars")
        );
        assert_eq!(cli::resolve_data_dir(None, &adapter), PathBuf::from("./data"));
    }

    #[test]
    fn data_dir_default() {
        let adapter = FileConfigAdapter::from_string("[market]\nbenchmark = X\n").unwrap();
        assert_eq!(cli::resolve_data_dir(None, &adapter), PathBuf::from("./data"));
    }
}

mod commands {
    use super::*;

    fn config_for(dir: &Path, pool: &str) -> tempfile::NamedTempFile {
        write_temp_ini(&format!(
            "[data]\ndir = {}\n[market]\nbenchmark = {}\n[pool]\ninstruments = {}\n",
            dir.display(),
            BENCHMARK,
            pool
        ))
    }

    fn run(args: &[&str]) -> ExitCode {
        let mut argv = vec!["etfscan", "--log-level", "warn"];
        argv.extend_from_slice(args);
        cli::run(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn validate_valid_config_succeeds() {
        let file = write_temp_ini(VALID_INI);
        let code = run(&["validate", "-c", file.path().to_str().unwrap()]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn validate_missing_file_is_config_error() {
        let code = run(&["validate", "-c", "/nonexistent/etfscan.ini"]);
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn validate_invalid_value_is_config_error() {
        let file = write_temp_ini(
            "[market]\nbenchmark = X\n[pool]\ninstruments = A\n[sizing]\nnormal_fraction = 0.9\n",
        );
        let code = run(&["validate", "-c", file.path().to_str().unwrap()]);
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn scan_writes_report_file() {
        let data = tempfile::TempDir::new().unwrap();
        write_csv(data.path(), BENCHMARK, &rising_benchmark());
        write_csv(data.path(), "159516", &bullish_bars("159516"));
        write_csv(data.path(), "512000", &bearish_bars("512000"));
        let config = config_for(data.path(), "159516:Semiconductor Equipment ETF,512000,159770");
        let out = data.path().join("report.txt");

        let code = run(&[
            "scan",
            "-c",
            config.path().to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let report = fs::read_to_string(&out).unwrap();
        assert!(report.contains("Benchmark sh000300: PERMITTED (AGGRESSIVE)"));
        assert!(report.contains("Semiconductor Equipment ETF"));
        assert!(report.contains("BUY (pending)"));
        assert!(report.contains("SELL"));
        assert!(report.contains("159770: no data"));
    }

    #[test]
    fn scan_overrides_apply() {
        let data = tempfile::TempDir::new().unwrap();
        write_csv(data.path(), BENCHMARK, &rising_benchmark());
        write_csv(data.path(), "159516", &bullish_bars("159516"));
        write_csv(data.path(), "512000", &bearish_bars("512000"));
        let elsewhere = tempfile::TempDir::new().unwrap();
        let config = config_for(elsewhere.path(), "159516,512000");
        let out = data.path().join("report.txt");

        let code = run(&[
            "scan",
            "-c",
            config.path().to_str().unwrap(),
            "--data-dir",
            data.path().to_str().unwrap(),
            "--top-n",
            "1",
            "--execution-window",
            "-o",
            out.to_str().unwrap(),
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let report = fs::read_to_string(&out).unwrap();
        assert!(report.contains("== Top 1 =="));
        assert!(report.contains("Execution window: open"));
        assert!(!report.contains("(pending)"));
    }

    #[test]
    fn scan_without_benchmark_data_fails_with_data_code() {
        let data = tempfile::TempDir::new().unwrap();
        write_csv(data.path(), "159516", &bullish_bars("159516"));
        let config = config_for(data.path(), "159516");

        let code = run(&["scan", "-c", config.path().to_str().unwrap()]);
        assert!(same_code(code, ExitCode::from(5)));
    }

    #[test]
    fn scan_rejects_zero_top_n() {
        let data = tempfile::TempDir::new().unwrap();
        let config = config_for(data.path(), "159516");

        let code = run(&["scan", "-c", config.path().to_str().unwrap(), "--top-n", "0"]);
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn info_succeeds_with_partial_data() {
        let data = tempfile::TempDir::new().unwrap();
        write_csv(data.path(), BENCHMARK, &rising_benchmark());
        let config = config_for(data.path(), "159516");

        let code = run(&["info", "-c", config.path().to_str().unwrap()]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let code = run(&[
            "info",
            "-c",
            config.path().to_str().unwrap(),
            "--code",
            BENCHMARK,
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }
}
