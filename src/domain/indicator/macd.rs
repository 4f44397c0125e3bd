//! MACD (Moving Average Convergence Divergence).
//!
//! - MACD line = EMA(fast) - EMA(slow)
//! - Signal line = EMA(MACD line, signal)
//! - Histogram = MACD line - signal line

use super::Outputs;
use super::ema::ema;
use crate::domain::indicator_helpers::zip_map;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn into_outputs(self) -> Outputs {
        vec![
            ("macd", self.macd),
            ("signal", self.signal),
            ("histogram", self.histogram),
        ]
    }
}

pub fn macd(source: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let line = zip_map(&ema(source, fast), &ema(source, slow), |f, s| f - s);
    let signal_line = ema(&line, signal);
    let histogram = zip_map(&line, &signal_line, |m, s| m - s);
    Macd {
        macd: line,
        signal: signal_line,
        histogram,
    }
}
