//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::ast::ParsedStrategy;
use crate::domain::backtest::{BacktestConfig, BacktestReport, DEFAULT_SYMBOL};
use crate::domain::config_validation::{
    DATA_SECTION, backtest_config, input_overrides, validate_backtest_config,
};
use crate::domain::error::PinebtError;
use crate::domain::evaluator::Evaluator;
use crate::domain::lexer::tokenize;
use crate::domain::parser::try_parse;
use crate::domain::signal::Signal;
use crate::domain::value::Value;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "pinebt", about = "Trading-script interpreter and backtester")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Log warnings and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token stream of a script
    Tokens {
        #[arg(short, long)]
        script: PathBuf,
    },
    /// Parse a script and summarize it
    Validate {
        #[arg(short, long)]
        script: PathBuf,
    },
    /// Run a script over historical bars
    Backtest {
        #[arg(short, long)]
        script: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        capital: Option<f64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Feed bars one at a time and print each signal
    Stream {
        #[arg(short, long)]
        script: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        /// Bars loaded as history before streaming starts
        #[arg(short, long, default_value_t = 0)]
        warmup: usize,
    },
}

pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    // a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose, cli.quiet);
    let result = match cli.command {
        Command::Tokens { script } => run_tokens(&script),
        Command::Validate { script } => run_validate(&script),
        Command::Backtest {
            script,
            config,
            data,
            capital,
            output,
        } => run_backtest(
            &script,
            config.as_deref(),
            data.as_deref(),
            capital,
            output.as_deref(),
        ),
        Command::Stream {
            script,
            data,
            warmup,
        } => run_stream(&script, &data, warmup),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn read_script(path: &Path) -> Result<String, PinebtError> {
    fs::read_to_string(path).map_err(|e| PinebtError::ScriptRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Read and parse a script; a parse failure prints the offending line.
pub fn load_script(path: &Path) -> Result<ParsedStrategy, PinebtError> {
    let source = read_script(path)?;
    try_parse(&source).map_err(|e| {
        error!(line = e.line, column = e.column, "failed to parse script");
        eprintln!("{}", e.display_with_context(&source));
        PinebtError::from(e)
    })
}

fn run_tokens(script: &Path) -> Result<(), PinebtError> {
    let source = read_script(script)?;
    for token in tokenize(&source) {
        println!(
            "{:>4}:{:<3} {:<16} {}",
            token.line,
            token.column,
            format!("{:?}", token.kind),
            token.value
        );
    }
    Ok(())
}

fn run_validate(script: &Path) -> Result<(), PinebtError> {
    let strategy = load_script(script)?;
    println!("Strategy:    {}", strategy.name);
    if !strategy.description.is_empty() {
        println!("Description: {}", strategy.description);
    }
    println!("Version:     {}", strategy.version);
    println!("Inputs:      {}", strategy.inputs.len());
    for (name, input) in &strategy.inputs {
        let default = input
            .default
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "na".to_string());
        println!("  {name} = {default} ({})", input.kind);
    }
    println!("Variables:   {}", strategy.variables.len());
    println!("Indicators:  {}", strategy.indicators.len());
    println!("Entries:     {}", strategy.entry_conditions.len());
    for entry in &strategy.entry_conditions {
        let guard = entry
            .guard
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "always".to_string());
        println!(
            "  {} {} when {}",
            entry.id.as_deref().unwrap_or("-"),
            entry.direction,
            guard
        );
    }
    println!("Exits:       {}", strategy.exit_conditions.len());
    for exit in &strategy.exit_conditions {
        let guard = exit
            .guard
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "always".to_string());
        println!("  {} when {}", exit.function, guard);
    }
    eprintln!("\nScript is valid.");
    Ok(())
}

/// Resolved settings for one backtest run.
pub struct BacktestPlan {
    pub config: BacktestConfig,
    pub data_path: Option<PathBuf>,
    pub overrides: Vec<(String, Value)>,
}

/// Merge the optional INI config with command-line overrides.
pub fn build_plan(
    config: Option<&dyn ConfigPort>,
    data: Option<&Path>,
    capital: Option<f64>,
) -> Result<BacktestPlan, PinebtError> {
    let mut plan = BacktestPlan {
        config: BacktestConfig::default(),
        data_path: None,
        overrides: Vec::new(),
    };
    if let Some(config) = config {
        validate_backtest_config(config)?;
        plan.config = backtest_config(config);
        plan.data_path = config.get_string(DATA_SECTION, "path").map(PathBuf::from);
        plan.overrides = input_overrides(config);
    }
    if let Some(data) = data {
        plan.data_path = Some(data.to_path_buf());
    }
    if let Some(capital) = capital {
        if !(capital > 0.0 && capital.is_finite()) {
            return Err(PinebtError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: "--capital must be a positive number".to_string(),
            });
        }
        plan.config.initial_capital = capital;
    }
    Ok(plan)
}

fn run_backtest(
    script: &Path,
    config_path: Option<&Path>,
    data: Option<&Path>,
    capital: Option<f64>,
    output: Option<&Path>,
) -> Result<(), PinebtError> {
    let adapter = match config_path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Some(FileConfigAdapter::from_file(path)?)
        }
        None => None,
    };
    let plan = build_plan(
        adapter.as_ref().map(|a| a as &dyn ConfigPort),
        data,
        capital,
    )?;
    let data_path = plan.data_path.clone().ok_or_else(|| PinebtError::ConfigMissing {
        section: DATA_SECTION.to_string(),
        key: "path".to_string(),
    })?;

    let strategy = load_script(script)?;
    let data_port = CsvAdapter::new(data_path);
    let report = run_backtest_pipeline(&data_port, strategy.clone(), &plan)?;
    print_summary(&report);

    if let Some(output) = output {
        let path = output.display().to_string();
        JsonReportAdapter::pretty().write(&report, &strategy, &path)?;
        eprintln!("\nReport written to: {path}");
    }
    Ok(())
}

/// Load bars, apply overrides and run the batch backtest.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: ParsedStrategy,
    plan: &BacktestPlan,
) -> Result<BacktestReport, PinebtError> {
    let bars = data_port.load_bars()?;
    info!(
        strategy = %strategy.name,
        bars = bars.len(),
        capital = plan.config.initial_capital,
        "running backtest"
    );
    let mut evaluator = Evaluator::new(Arc::new(strategy), plan.config.symbol.clone());
    for (name, value) in &plan.overrides {
        evaluator.set_input(name.clone(), value.clone());
    }
    evaluator.load_bars(bars);
    Ok(evaluator.run_backtest(&plan.config))
}

fn print_summary(report: &BacktestReport) {
    let stats = &report.stats;
    eprintln!("\n=== Results: {} ===", report.symbol);
    eprintln!("Initial Capital:  {:.2}", report.initial_capital);
    eprintln!("Final Capital:    {:.2}", report.final_capital);
    eprintln!("Total Return:     {:.2}%", report.total_return);
    eprintln!("Sharpe Ratio:     {:.2}", stats.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.2}%", stats.max_drawdown);
    eprintln!("Total Trades:     {}", stats.total_trades);
    eprintln!("Win Rate:         {:.1}%", stats.win_rate);
    eprintln!("Profit Factor:    {:.2}", stats.profit_factor);
}

/// Seed with `warmup` bars, then stream the rest through `process_candle`.
pub fn stream_signals(
    data_port: &dyn DataPort,
    strategy: ParsedStrategy,
    symbol: &str,
    warmup: usize,
) -> Result<Vec<(usize, Signal)>, PinebtError> {
    let mut bars = data_port.load_bars()?;
    let rest = bars.split_off(warmup.min(bars.len()));
    let offset = bars.len();

    let mut evaluator = Evaluator::new(Arc::new(strategy), symbol);
    evaluator.load_bars(bars);

    let mut signals = Vec::new();
    for (i, bar) in rest.into_iter().enumerate() {
        let signal = evaluator.process_candle(bar);
        if !signal.is_none() {
            signals.push((offset + i, signal));
        }
    }
    Ok(signals)
}

fn run_stream(script: &Path, data: &Path, warmup: usize) -> Result<(), PinebtError> {
    let strategy = load_script(script)?;
    let data_port = CsvAdapter::new(data);
    let signals = stream_signals(&data_port, strategy, DEFAULT_SYMBOL, warmup)?;
    for (bar, signal) in &signals {
        println!("{bar:>6}  {signal}");
    }
    eprintln!("\n{} signals", signals.len());
    Ok(())
}
