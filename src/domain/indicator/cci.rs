//! Commodity Channel Index.
//!
//! CCI = (tp - SMA(tp, n)) / (0.015 * mean absolute deviation of tp over n).

use super::sma::sma;
use crate::domain::indicator_helpers::rolling_mean_deviation;

const CCI_CONSTANT: f64 = 0.015;

/// CCI over an explicit source column (normally the typical price).
pub fn cci(source: &[f64], length: usize) -> Vec<f64> {
    let mean = sma(source, length);
    let deviation = rolling_mean_deviation(source, length);
    (0..source.len())
        .map(|i| (source[i] - mean[i]) / (CCI_CONSTANT * deviation[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cci_known_value() {
        // window [1,2,3]: mean 2, mad 2/3 -> (3-2)/(0.015*2/3) = 100
        let out = cci(&[1.0, 2.0, 3.0], 3);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 100.0, epsilon = 1e-9);
    }

    #[test]
    fn cci_flat_is_nan() {
        let out = cci(&[5.0; 3], 3);
        assert!(out[2].is_nan());
    }
}
