//! Backtest summary statistics.

use serde::Serialize;

use crate::domain::backtest::{TradeEvent, TradeKind};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Count of exit events.
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of exits with positive P&L.
    pub win_rate: f64,
    /// Largest percentage decline from a running peak.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Gross profit / gross loss; +inf when gross loss is zero.
    pub profit_factor: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// Percent.
    pub total_return: f64,
}

impl Metrics {
    pub fn compute(initial_capital: f64, trades: &[TradeEvent], equity_curve: &[f64]) -> Self {
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let mut total_trades = 0usize;
        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for trade in trades.iter().filter(|t| t.kind == TradeKind::Exit) {
            total_trades += 1;
            let pnl = trade.pnl.unwrap_or(0.0);
            if pnl > 0.0 {
                winning_trades += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                gross_loss += pnl.abs();
            }
        }

        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            f64::INFINITY
        };

        Metrics {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            max_drawdown: compute_drawdown(equity_curve),
            sharpe_ratio: compute_sharpe(equity_curve),
            profit_factor,
            gross_profit,
            gross_loss,
            total_return,
        }
    }
}

fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized mean / sample stdev of per-bar percentage returns.
fn compute_sharpe(equity_curve: &[f64]) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
