//! Weighted and volume-weighted moving averages.
//!
//! WMA weights the window linearly 1..n (newest bar heaviest).
//! VWMA = rolling sum(x * volume) / rolling sum(volume).

use crate::domain::indicator_helpers::{rolling, rolling_sum, zip_map};

pub fn wma(source: &[f64], length: usize) -> Vec<f64> {
    let n = length as f64;
    let denominator = n * (n + 1.0) / 2.0;
    rolling(source, length, |w| {
        w.iter()
            .enumerate()
            .map(|(i, v)| v * (i + 1) as f64)
            .sum::<f64>()
            / denominator
    })
}

pub fn vwma(source: &[f64], volume: &[f64], length: usize) -> Vec<f64> {
    let weighted = zip_map(source, volume, |x, v| x * v);
    zip_map(
        &rolling_sum(&weighted, length),
        &rolling_sum(volume, length),
        |num, den| num / den,
    )
}
