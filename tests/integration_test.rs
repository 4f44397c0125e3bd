//! Integration tests for the script-to-report pipeline.
//!
//! Tests cover:
//! - End-to-end backtest of a minimal always-enter / always-exit script
//! - Streaming and batch modes agreeing on a single-direction strategy
//! - Input overrides from an INI config
//! - Profit factor and Sharpe edge cases
//! - CSV loading failures surfacing as data errors
//! - JSON report round trip through the report port

mod common;

use common::*;
use pinebt::adapters::csv_adapter::CsvAdapter;
use pinebt::adapters::file_config_adapter::FileConfigAdapter;
use pinebt::adapters::json_report_adapter::JsonReportAdapter;
use pinebt::cli::{build_plan, run_backtest_pipeline, stream_signals};
use pinebt::domain::backtest::{BacktestConfig, TradeKind};
use pinebt::domain::error::PinebtError;
use pinebt::domain::evaluator::Evaluator;
use pinebt::domain::parser::{parse, try_parse};
use pinebt::domain::signal::SignalType;
use pinebt::ports::config_port::ConfigPort;
use pinebt::ports::data_port::DataPort;
use pinebt::ports::report_port::ReportPort;
use std::path::Path;
use std::sync::Arc;

mod end_to_end {
    use super::*;

    const ALWAYS: &str = "//@version=5\n\
        strategy(\"Always\")\n\
        strategy.entry(\"long\", direction=\"long\")\n\
        strategy.close_all()\n";

    #[test]
    fn constant_prices_enter_then_exit_flat() {
        let strategy = parse(ALWAYS).expect("script parses");
        assert_eq!(strategy.name, "Always");
        assert_eq!(strategy.entry_conditions.len(), 1);
        assert_eq!(strategy.exit_conditions.len(), 1);

        let mut evaluator = Evaluator::new(Arc::new(strategy), "FLAT");
        evaluator.load_bars(bars_from_closes(&[100.0; 5]));
        let report = evaluator.run_backtest(&BacktestConfig::default());

        let kinds: Vec<(TradeKind, usize)> =
            report.trades.iter().map(|t| (t.kind, t.bar_index)).collect();
        assert_eq!(
            kinds,
            vec![
                (TradeKind::Entry, 1),
                (TradeKind::Exit, 2),
                (TradeKind::Entry, 3),
                (TradeKind::Exit, 4),
            ]
        );
        assert!(report.exits().all(|t| t.pnl == Some(0.0)));
        assert_eq!(report.final_capital, report.initial_capital);
        assert_eq!(report.stats.sharpe_ratio, 0.0);
        assert_eq!(report.stats.max_drawdown, 0.0);
        assert_eq!(report.stats.total_return, 0.0);
        assert_eq!(report.equity_curve, vec![100_000.0; 5]);
    }

    #[test]
    fn sma_cross_trades_on_a_wave() {
        let port = MockDataPort::new(bars_from_closes(&wave_closes(120)));
        let plan = build_plan(None, None, Some(10_000.0)).unwrap();
        let report = run_backtest_pipeline(&port, try_parse(SMA_CROSS).unwrap(), &plan).unwrap();

        assert!(report.stats.total_trades > 0);
        assert_eq!(report.initial_capital, 10_000.0);
        assert_eq!(report.equity_curve.len(), 120);
        // entries and exits alternate, starting with an entry
        for (i, trade) in report.trades.iter().enumerate() {
            let expected = if i % 2 == 0 {
                TradeKind::Entry
            } else {
                TradeKind::Exit
            };
            assert_eq!(trade.kind, expected);
        }
        let realized: f64 = report.exits().filter_map(|t| t.pnl).sum();
        assert!((report.final_capital - (10_000.0 + realized)).abs() < 1e-9);
    }

    #[test]
    fn parse_failure_is_absent() {
        assert!(parse("x = (1 + 2\n").is_none());
        assert!(try_parse("x = (1 + 2\n").is_err());
    }
}

mod mode_equivalence {
    use super::*;

    #[test]
    fn streaming_matches_batch_for_long_only_script() {
        let bars = bars_from_closes(&wave_closes(150));
        let port = MockDataPort::new(bars);

        let plan = build_plan(None, None, None).unwrap();
        let report = run_backtest_pipeline(&port, try_parse(SMA_CROSS).unwrap(), &plan).unwrap();
        let batch: Vec<(usize, f64, bool)> = report
            .trades
            .iter()
            .map(|t| (t.bar_index, t.price, t.kind == TradeKind::Entry))
            .collect();
        assert!(!batch.is_empty());

        let streamed: Vec<(usize, f64, bool)> =
            stream_signals(&port, try_parse(SMA_CROSS).unwrap(), "WAVE", 1)
                .unwrap()
                .into_iter()
                .map(|(bar, s)| (bar, s.price, s.kind.is_entry()))
                .collect();
        assert_eq!(streamed, batch);
    }

    #[test]
    fn streaming_signals_carry_symbol_and_kinds() {
        let port = MockDataPort::new(bars_from_closes(&wave_closes(150)));
        let signals = stream_signals(&port, try_parse(SMA_CROSS).unwrap(), "WAVE", 20).unwrap();
        assert!(!signals.is_empty());
        assert!(signals.iter().all(|(bar, _)| *bar >= 20));
        assert!(signals.iter().all(|(_, s)| s.symbol == "WAVE"));
        assert!(
            signals
                .iter()
                .all(|(_, s)| matches!(s.kind, SignalType::Buy | SignalType::ExitLong))
        );
    }
}

mod config_overrides {
    use super::*;

    #[test]
    fn ini_inputs_match_edited_script() {
        let ini = write_temp(
            "[backtest]\ninitial_capital = 5000\nsymbol = WAVE\n\n[inputs]\nfastLength = 3\n",
            ".ini",
        );
        let adapter = FileConfigAdapter::from_file(ini.path()).unwrap();
        let plan = build_plan(Some(&adapter as &dyn ConfigPort), None, None).unwrap();
        assert_eq!(plan.config.symbol, "WAVE");
        assert_eq!(plan.config.initial_capital, 5000.0);

        let port = MockDataPort::new(bars_from_closes(&wave_closes(120)));
        let overridden =
            run_backtest_pipeline(&port, try_parse(SMA_CROSS).unwrap(), &plan).unwrap();

        let edited_source = SMA_CROSS.replace("input.int(5, \"Fast\")", "input.int(3, \"Fast\")");
        let plain = build_plan(None, None, Some(5000.0)).unwrap();
        let edited = run_backtest_pipeline(&port, try_parse(&edited_source).unwrap(), &plain).unwrap();

        assert_eq!(overridden.trades, edited.trades);
        assert_eq!(overridden.equity_curve, edited.equity_curve);
    }

    #[test]
    fn data_flag_overrides_config_path() {
        let adapter =
            FileConfigAdapter::from_string("[data]\npath = from_config.csv\n").unwrap();
        let from_config = build_plan(Some(&adapter as &dyn ConfigPort), None, None).unwrap();
        assert_eq!(from_config.data_path.as_deref(), Some(Path::new("from_config.csv")));

        let from_flag = build_plan(
            Some(&adapter as &dyn ConfigPort),
            Some(Path::new("flag.csv")),
            None,
        )
        .unwrap();
        assert_eq!(from_flag.data_path.as_deref(), Some(Path::new("flag.csv")));
    }

    #[test]
    fn invalid_capital_is_rejected() {
        let err = build_plan(None, None, Some(-1.0)).err().unwrap();
        assert!(matches!(err, PinebtError::ConfigInvalid { .. }));

        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_capital = 0\n").unwrap();
        let err = build_plan(Some(&adapter as &dyn ConfigPort), None, None)
            .err()
            .unwrap();
        assert!(matches!(err, PinebtError::ConfigInvalid { key, .. } if key == "initial_capital"));
    }
}

mod metrics_edges {
    use super::*;

    fn run(source: &str, closes: &[f64]) -> pinebt::domain::backtest::BacktestReport {
        let mut evaluator = Evaluator::new(Arc::new(try_parse(source).unwrap()), "T");
        evaluator.load_bars(bars_from_closes(closes));
        evaluator.run_backtest(&BacktestConfig::default())
    }

    const WINDOW: &str = "strategy.entry(\"L\", strategy.long, when=bar_index == 1)\n\
                          strategy.close(\"L\", when=bar_index == 3)\n";

    #[test]
    fn profit_factor_infinite_with_only_wins() {
        let report = run(WINDOW, &[10.0, 10.0, 11.0, 12.0, 12.0]);
        assert_eq!(report.stats.winning_trades, 1);
        assert!(report.stats.profit_factor.is_infinite());
        assert_eq!(report.stats.win_rate, 100.0);
    }

    #[test]
    fn profit_factor_zero_with_only_losses() {
        let report = run(WINDOW, &[10.0, 10.0, 9.0, 8.0, 8.0]);
        assert_eq!(report.stats.losing_trades, 1);
        assert_eq!(report.stats.profit_factor, 0.0);
        assert!(report.stats.max_drawdown > 0.0);
    }

    #[test]
    fn no_trades_means_zero_sharpe() {
        let report = run(
            "strategy.entry(\"L\", strategy.long, when=close > 1000)\n",
            &wave_closes(40),
        );
        assert!(report.trades.is_empty());
        assert_eq!(report.stats.sharpe_ratio, 0.0);
        assert_eq!(report.final_capital, 100_000.0);
    }
}

mod adapters {
    use super::*;

    #[test]
    fn csv_round_trip_feeds_backtest() {
        let bars = bars_from_closes(&wave_closes(60));
        let csv = write_temp(&bars_csv(&bars), ".csv");
        let loaded = CsvAdapter::new(csv.path()).load_bars().unwrap();
        assert_eq!(loaded.len(), 60);
        assert_eq!(loaded[0].timestamp, bars[0].timestamp);
        assert_eq!(loaded[59].close, bars[59].close);
    }

    #[test]
    fn missing_column_surfaces_as_data_error() {
        let csv = write_temp("time,open,high,low,close\n2024-01-01,1,2,0,1\n", ".csv");
        let plan = build_plan(None, None, None).unwrap();
        let err = run_backtest_pipeline(
            &CsvAdapter::new(csv.path()),
            try_parse(SMA_CROSS).unwrap(),
            &plan,
        )
        .unwrap_err();
        assert!(matches!(err, PinebtError::MissingColumn { ref column } if column == "volume"));
        let code = format!("{:?}", std::process::ExitCode::from(&err));
        assert_eq!(code, format!("{:?}", std::process::ExitCode::from(5)));
    }

    #[test]
    fn mock_port_error_propagates() {
        let plan = build_plan(None, None, None).unwrap();
        let err = run_backtest_pipeline(
            &MockDataPort::with_error("close"),
            try_parse(SMA_CROSS).unwrap(),
            &plan,
        )
        .unwrap_err();
        assert!(matches!(err, PinebtError::MissingColumn { .. }));
    }

    #[test]
    fn json_report_written_through_port() {
        let strategy = try_parse(SMA_CROSS).unwrap();
        let port = MockDataPort::new(bars_from_closes(&wave_closes(80)));
        let plan = build_plan(None, None, None).unwrap();
        let report = run_backtest_pipeline(&port, strategy.clone(), &plan).unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        JsonReportAdapter::new()
            .write(&report, &strategy, path.to_str().unwrap())
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["strategy"]["name"], "SMA Cross");
        assert_eq!(
            json["backtest"]["equity_curve"].as_array().unwrap().len(),
            80
        );
        assert_eq!(
            json["backtest"]["stats"]["total_trades"],
            report.stats.total_trades
        );
    }
}
