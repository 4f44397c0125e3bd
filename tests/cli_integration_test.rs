//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for every subcommand and the global log flags
//! - Exit codes per error category (config 2, script 4, data 5)
//! - Full backtest run writing a JSON report
//! - Streaming over a CSV file

mod common;

use clap::Parser;
use common::*;
use pinebt::cli::{self, Cli, Command};
use std::path::PathBuf;
use std::process::ExitCode;

fn run_args(args: &[&str]) -> ExitCode {
    let cli = Cli::try_parse_from(args).expect("arguments parse");
    cli::run(cli)
}

fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{actual:?}") == format!("{expected:?}")
}

fn path_str(file: &tempfile::NamedTempFile) -> String {
    file.path().to_str().unwrap().to_string()
}

mod argument_parsing {
    use super::*;

    #[test]
    fn backtest_arguments() {
        let cli = Cli::try_parse_from([
            "pinebt",
            "backtest",
            "--script",
            "s.pine",
            "--data",
            "bars.csv",
            "--capital",
            "2500",
            "-o",
            "out.json",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                script,
                config,
                data,
                capital,
                output,
            } => {
                assert_eq!(script, PathBuf::from("s.pine"));
                assert!(config.is_none());
                assert_eq!(data, Some(PathBuf::from("bars.csv")));
                assert_eq!(capital, Some(2500.0));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn stream_warmup_defaults_to_zero() {
        let cli =
            Cli::try_parse_from(["pinebt", "stream", "-s", "s.pine", "-d", "bars.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Stream { warmup: 0, .. }));
    }

    #[test]
    fn global_log_flags() {
        let cli = Cli::try_parse_from(["pinebt", "validate", "-s", "s.pine", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(
            Cli::try_parse_from(["pinebt", "--verbose", "--quiet", "validate", "-s", "s.pine"])
                .is_err()
        );
    }

    #[test]
    fn script_is_required() {
        assert!(Cli::try_parse_from(["pinebt", "validate"]).is_err());
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_good_script() {
        let script = write_temp(SMA_CROSS, ".pine");
        let code = run_args(&["pinebt", "-q", "validate", "--script", &path_str(&script)]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn validate_rejects_bad_script_with_code_4() {
        let script = write_temp("x = (1 + 2\n", ".pine");
        let code = run_args(&["pinebt", "-q", "validate", "--script", &path_str(&script)]);
        assert!(same_code(code, ExitCode::from(4)));
    }

    #[test]
    fn missing_script_file_is_code_4() {
        let code = run_args(&["pinebt", "-q", "validate", "--script", "/nonexistent/s.pine"]);
        assert!(same_code(code, ExitCode::from(4)));
    }

    #[test]
    fn tokens_dumps_stream() {
        let script = write_temp("plot(close)\n", ".pine");
        let code = run_args(&["pinebt", "-q", "tokens", "--script", &path_str(&script)]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn backtest_writes_json_report() {
        let script = write_temp(SMA_CROSS, ".pine");
        let data = write_temp(&bars_csv(&bars_from_closes(&wave_closes(90))), ".csv");
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("report.json");

        let code = run_args(&[
            "pinebt",
            "-q",
            "backtest",
            "--script",
            &path_str(&script),
            "--data",
            &path_str(&data),
            "--output",
            output.to_str().unwrap(),
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["backtest"]["symbol"], "UNKNOWN");
        assert_eq!(json["backtest"]["equity_curve"].as_array().unwrap().len(), 90);
    }

    #[test]
    fn backtest_reads_data_path_from_config() {
        let script = write_temp(SMA_CROSS, ".pine");
        let data = write_temp(&bars_csv(&bars_from_closes(&wave_closes(40))), ".csv");
        let config = write_temp(
            &format!(
                "[backtest]\ninitial_capital = 1000\nsymbol = WAVE\n\n[data]\npath = {}\n",
                path_str(&data)
            ),
            ".ini",
        );
        let code = run_args(&[
            "pinebt",
            "-q",
            "backtest",
            "--script",
            &path_str(&script),
            "--config",
            &path_str(&config),
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn backtest_without_data_is_config_error() {
        let script = write_temp(SMA_CROSS, ".pine");
        let code = run_args(&["pinebt", "-q", "backtest", "--script", &path_str(&script)]);
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn backtest_with_bad_input_override_is_config_error() {
        let script = write_temp(SMA_CROSS, ".pine");
        let data = write_temp(&bars_csv(&bars_from_closes(&wave_closes(40))), ".csv");
        let config = write_temp("[inputs]\nfastLength = quick\n", ".ini");
        let code = run_args(&[
            "pinebt",
            "-q",
            "backtest",
            "--script",
            &path_str(&script),
            "--config",
            &path_str(&config),
            "--data",
            &path_str(&data),
        ]);
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn backtest_with_missing_column_is_data_error() {
        let script = write_temp(SMA_CROSS, ".pine");
        let data = write_temp("time,open,high,low,close\n2024-01-01,1,2,0,1\n", ".csv");
        let code = run_args(&[
            "pinebt",
            "-q",
            "backtest",
            "--script",
            &path_str(&script),
            "--data",
            &path_str(&data),
        ]);
        assert!(same_code(code, ExitCode::from(5)));
    }

    #[test]
    fn stream_over_csv() {
        let script = write_temp(SMA_CROSS, ".pine");
        let data = write_temp(&bars_csv(&bars_from_closes(&wave_closes(60))), ".csv");
        let code = run_args(&[
            "pinebt",
            "-q",
            "stream",
            "--script",
            &path_str(&script),
            "--data",
            &path_str(&data),
            "--warmup",
            "15",
        ]);
        assert!(same_code(code, ExitCode::SUCCESS));
    }
}
