//! Stochastic oscillator.
//!
//! raw %K = 100 * (close - lowest low) / (highest high - lowest low) over `k_length`,
//! %K = SMA(raw %K, k_smooth), %D = SMA(%K, d_smooth).

use super::Outputs;
use super::sma::sma;
use crate::domain::indicator_helpers::{rolling_max, rolling_min};

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

impl Stochastic {
    pub fn into_outputs(self) -> Outputs {
        vec![("k", self.k), ("d", self.d)]
    }
}

pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_length: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> Stochastic {
    let highest = rolling_max(high, k_length);
    let lowest = rolling_min(low, k_length);
    let raw: Vec<f64> = (0..close.len())
        .map(|i| 100.0 * (close[i] - lowest[i]) / (highest[i] - lowest[i]))
        .collect();
    let k = sma(&raw, k_smooth);
    let d = sma(&k, d_smooth);
    Stochastic { k, d }
}
