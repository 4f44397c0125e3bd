//! On-Balance Volume: cumulative sum of sign(close change) * volume.
//!
//! The first bar has no prior close and is NaN; accumulation starts at bar 1.

pub fn obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(close.len());
    let mut total = 0.0;
    for i in 0..close.len() {
        if i == 0 {
            out.push(f64::NAN);
            continue;
        }
        let delta = close[i] - close[i - 1];
        let sign = if delta > 0.0 {
            1.0
        } else if delta < 0.0 {
            -1.0
        } else {
            0.0
        };
        total += sign * volume[i];
        out.push(total);
    }
    out
}
