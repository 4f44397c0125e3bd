//! Backtest configuration, trade log and report.
//!
//! The bar loop itself lives on the evaluator (`Evaluator::run_backtest`);
//! this module holds what it consumes and produces.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::ast::Direction;
use crate::domain::metrics::Metrics;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_SYMBOL: &str = "UNKNOWN";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub symbol: String,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            symbol: DEFAULT_SYMBOL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Entry,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvent {
    pub kind: TradeKind,
    pub direction: Direction,
    pub price: f64,
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    /// Realized P&L; exits only.
    pub pnl: Option<f64>,
}

impl TradeEvent {
    pub fn entry(direction: Direction, price: f64, bar_index: usize, timestamp: NaiveDateTime) -> Self {
        Self {
            kind: TradeKind::Entry,
            direction,
            price,
            bar_index,
            timestamp,
            pnl: None,
        }
    }

    pub fn exit(
        direction: Direction,
        price: f64,
        bar_index: usize,
        timestamp: NaiveDateTime,
        pnl: f64,
    ) -> Self {
        Self {
            kind: TradeKind::Exit,
            direction,
            price,
            bar_index,
            timestamp,
            pnl: Some(pnl),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    /// Percent.
    pub total_return: f64,
    pub trades: Vec<TradeEvent>,
    /// One sample per bar, starting with the initial capital.
    pub equity_curve: Vec<f64>,
    pub stats: Metrics,
}

impl BacktestReport {
    pub fn new(config: &BacktestConfig, trades: Vec<TradeEvent>, equity_curve: Vec<f64>) -> Self {
        let final_capital = equity_curve
            .last()
            .copied()
            .unwrap_or(config.initial_capital);
        let stats = Metrics::compute(config.initial_capital, &trades, &equity_curve);
        Self {
            symbol: config.symbol.clone(),
            initial_capital: config.initial_capital,
            final_capital,
            total_return: stats.total_return,
            trades,
            equity_curve,
            stats,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TradeEvent> {
        self.trades.iter().filter(|t| t.kind == TradeKind::Entry)
    }

    pub fn exits(&self) -> impl Iterator<Item = &TradeEvent> {
        self.trades.iter().filter(|t| t.kind == TradeKind::Exit)
    }
}
