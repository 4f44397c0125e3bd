//! Simple Moving Average: rolling arithmetic mean over `length` bars.

use crate::domain::indicator_helpers::rolling_mean;

pub fn sma(source: &[f64], length: usize) -> Vec<f64> {
    rolling_mean(source, length)
}
