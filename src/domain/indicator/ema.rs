//! Exponential and Wilder (running) moving averages.
//!
//! EMA: alpha = 2/(n+1); RMA: alpha = 1/n. Both seed with the first defined
//! input (y0 = x0) and then apply y[t] = alpha*x[t] + (1-alpha)*y[t-1], so
//! neither has a warmup gap.

use crate::domain::indicator_helpers::exponential;

pub fn ema(source: &[f64], length: usize) -> Vec<f64> {
    if length == 0 {
        return vec![f64::NAN; source.len()];
    }
    exponential(source, 2.0 / (length as f64 + 1.0))
}

pub fn rma(source: &[f64], length: usize) -> Vec<f64> {
    if length == 0 {
        return vec![f64::NAN; source.len()];
    }
    exponential(source, 1.0 / length as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn ema_recursive_calculation() {
        let out = ema(&[10.0, 20.0, 30.0, 40.0], 3);
        let k = 2.0 / 4.0;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);
        assert_relative_eq!(out[0], 10.0);
        assert_relative_eq!(out[1], e1);
        assert_relative_eq!(out[2], e2);
        assert_relative_eq!(out[3], e3);
    }

    #[test]
    fn ema_period_1_tracks_input() {
        let out = ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(out, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn rma_uses_wilder_alpha() {
        let out = rma(&[10.0, 20.0], 4);
        assert_relative_eq!(out[1], 0.25 * 20.0 + 0.75 * 10.0);
    }

    #[test]
    fn ema_period_0() {
        assert!(ema(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_empty() {
        assert!(ema(&[], 3).is_empty());
    }

    proptest! {
        #[test]
        fn ema_of_constant_is_constant(
            c in -1000.0f64..1000.0,
            n in 1usize..50,
            length in 1usize..30,
        ) {
            let out = ema(&vec![c; n], length);
            for v in out {
                prop_assert!((v - c).abs() < 1e-9);
            }
        }
    }
}
