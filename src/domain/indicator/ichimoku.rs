//! Ichimoku cloud.
//!
//! Tenkan/kijun are midpoints of the rolling high/low range; senkou span A is
//! the tenkan/kijun midpoint and span B the midpoint over `senkou` bars, both
//! shifted forward by `kijun` bars.

use super::Outputs;
use crate::domain::indicator_helpers::{rolling_max, rolling_min, shift, zip_map};

#[derive(Debug, Clone, PartialEq)]
pub struct Ichimoku {
    pub tenkan: Vec<f64>,
    pub kijun: Vec<f64>,
    pub senkou_a: Vec<f64>,
    pub senkou_b: Vec<f64>,
}

impl Ichimoku {
    pub fn into_outputs(self) -> Outputs {
        vec![
            ("tenkan", self.tenkan),
            ("kijun", self.kijun),
            ("senkou_a", self.senkou_a),
            ("senkou_b", self.senkou_b),
        ]
    }
}

fn midpoint(high: &[f64], low: &[f64], length: usize) -> Vec<f64> {
    zip_map(&rolling_max(high, length), &rolling_min(low, length), |h, l| {
        (h + l) / 2.0
    })
}

pub fn ichimoku(high: &[f64], low: &[f64], tenkan: usize, kijun: usize, senkou: usize) -> Ichimoku {
    let tenkan_line = midpoint(high, low, tenkan);
    let kijun_line = midpoint(high, low, kijun);
    let span_a = zip_map(&tenkan_line, &kijun_line, |t, k| (t + k) / 2.0);
    Ichimoku {
        senkou_a: shift(&span_a, kijun),
        senkou_b: shift(&midpoint(high, low, senkou), kijun),
        tenkan: tenkan_line,
        kijun: kijun_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ichimoku_lines() {
        let high: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let low: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let out = ichimoku(&high, &low, 2, 3, 4);

        // tenkan at 1: (max(10,11) + min(0,1)) / 2 = 5.5
        assert_relative_eq!(out.tenkan[1], 5.5);
        assert!(out.kijun[1].is_nan());
        // kijun at 2: (12 + 0) / 2 = 6
        assert_relative_eq!(out.kijun[2], 6.0);
        // span A defined from 2 and shifted forward by 3
        assert!(out.senkou_a[4].is_nan());
        assert_relative_eq!(out.senkou_a[5], (out.tenkan[2] + out.kijun[2]) / 2.0);
        // span B: window 4 defined from 3, shifted to 6
        assert!(out.senkou_b[5].is_nan());
        assert_relative_eq!(out.senkou_b[6], (13.0 + 0.0) / 2.0);
    }
}
