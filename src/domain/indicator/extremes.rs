//! Rolling highest/lowest and Williams %R.

use crate::domain::indicator_helpers::{rolling_max, rolling_min};

pub fn highest(source: &[f64], length: usize) -> Vec<f64> {
    rolling_max(source, length)
}

pub fn lowest(source: &[f64], length: usize) -> Vec<f64> {
    rolling_min(source, length)
}

/// Williams %R = -100 * (highest high - close) / (highest high - lowest low).
pub fn williams_r(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    let hh = highest(high, length);
    let ll = lowest(low, length);
    (0..close.len())
        .map(|i| -100.0 * (hh[i] - close[i]) / (hh[i] - ll[i]))
        .collect()
}
