//! Supertrend.
//!
//! Sequential by definition: bands are hl2 +/- mult * ATR, and the trend
//! direction carries bar to bar, flipping up when close breaks the prior upper
//! band and down when it breaks the prior lower band. The line follows the
//! lower band in an uptrend and the upper band in a downtrend.

use super::Outputs;
use crate::domain::indicator_helpers::calc_atr;

#[derive(Debug, Clone, PartialEq)]
pub struct Supertrend {
    pub line: Vec<f64>,
    /// +1 uptrend, -1 downtrend, NaN on the first bar.
    pub direction: Vec<f64>,
}

impl Supertrend {
    pub fn into_outputs(self) -> Outputs {
        vec![("line", self.line), ("direction", self.direction)]
    }
}

#[derive(Debug, Clone, Copy)]
struct TrendState {
    direction: f64,
    prev_upper: f64,
    prev_lower: f64,
}

pub fn supertrend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    length: usize,
    mult: f64,
) -> Supertrend {
    let atr = calc_atr(high, low, close, length);
    let n = close.len();
    let mut line = vec![f64::NAN; n];
    let mut direction = vec![f64::NAN; n];
    if n == 0 {
        return Supertrend { line, direction };
    }

    let bands = |i: usize| {
        let mid = (high[i] + low[i]) / 2.0;
        (mid + mult * atr[i], mid - mult * atr[i])
    };

    let (upper0, lower0) = bands(0);
    let mut state = TrendState {
        direction: 1.0,
        prev_upper: upper0,
        prev_lower: lower0,
    };

    for i in 1..n {
        let (upper, lower) = bands(i);
        if close[i] > state.prev_upper {
            state.direction = 1.0;
        } else if close[i] < state.prev_lower {
            state.direction = -1.0;
        }
        direction[i] = state.direction;
        line[i] = if state.direction > 0.0 { lower } else { upper };
        state.prev_upper = upper;
        state.prev_lower = lower;
    }

    Supertrend { line, direction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn supertrend_flips_down_on_break() {
        // flat bars with range 2 (ATR = 2), then a collapse below the lower band
        let high = [11.0, 11.0, 11.0, 5.0];
        let low = [9.0, 9.0, 9.0, 3.0];
        let close = [10.0, 10.0, 10.0, 4.0];
        let out = supertrend(&high, &low, &close, 1, 1.0);

        assert!(out.direction[0].is_nan());
        assert_relative_eq!(out.direction[1], 1.0);
        assert_relative_eq!(out.line[1], 8.0);
        assert_relative_eq!(out.direction[3], -1.0);
        // downtrend follows the upper band of the current bar
        let atr3 = calc_atr(&high, &low, &close, 1)[3];
        assert_relative_eq!(out.line[3], 4.0 + atr3);
    }

    #[test]
    fn supertrend_direction_carries_forward() {
        let high = [11.0, 11.0, 5.0, 5.5, 5.2];
        let low = [9.0, 9.0, 3.0, 3.5, 3.2];
        let close = [10.0, 10.0, 4.0, 4.5, 4.2];
        let out = supertrend(&high, &low, &close, 1, 3.0);
        // wide bands: once down, closes stay inside and direction holds
        let d2 = out.direction[2];
        assert_relative_eq!(out.direction[3], d2);
        assert_relative_eq!(out.direction[4], d2);
    }

    #[test]
    fn supertrend_empty() {
        let out = supertrend(&[], &[], &[], 10, 3.0);
        assert!(out.line.is_empty());
    }
}
