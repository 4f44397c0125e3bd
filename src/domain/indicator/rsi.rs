//! RSI (Relative Strength Index).
//!
//! Average gain and loss are simple rolling means of the positive and negative
//! one-bar changes (not Wilder smoothing):
//! RSI = 100 - 100 / (1 + mean(gain) / mean(loss)).
//! A zero average loss with positive gains gives 100; a flat window is NaN.

use crate::domain::indicator_helpers::{diff, rolling_mean, zip_map};

pub fn rsi(source: &[f64], length: usize) -> Vec<f64> {
    let delta = diff(source, 1);
    let gains: Vec<f64> = delta
        .iter()
        .map(|&d| if d > 0.0 { d } else { 0.0 })
        .collect();
    let losses: Vec<f64> = delta
        .iter()
        .map(|&d| if d < 0.0 { -d } else { 0.0 })
        .collect();

    zip_map(
        &rolling_mean(&gains, length),
        &rolling_mean(&losses, length),
        |gain, loss| 100.0 - 100.0 / (1.0 + gain / loss),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_warmup() {
        let out = rsi(&[1.0, 2.0, 1.5, 3.0, 2.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(!out[2].is_nan());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let out = rsi(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_relative_eq!(out[4], 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let out = rsi(&[5.0, 4.0, 3.0, 2.0, 1.0], 3);
        assert_relative_eq!(out[4], 0.0);
    }

    #[test]
    fn rsi_flat_is_nan() {
        let out = rsi(&[5.0; 6], 3);
        assert!(out[5].is_nan());
    }

    #[test]
    fn rsi_simple_mean_of_changes() {
        // changes over last 3 bars: +2, -1, +1 -> gain 1.0, loss 1/3
        let out = rsi(&[10.0, 10.0, 12.0, 11.0, 12.0], 3);
        let rs = 1.0 / (1.0 / 3.0);
        assert_relative_eq!(out[4], 100.0 - 100.0 / (1.0 + rs), epsilon = 1e-9);
    }
}
