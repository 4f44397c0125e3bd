//! Shared helper functions for indicator calculations.
//!
//! Every helper returns a vector the same length as its input. Positions that
//! cannot be computed (window not yet filled, NaN inside the window) are NaN.

/// Apply `f` to every full window of `length` values ending at each index.
pub fn rolling<F>(source: &[f64], length: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; source.len()];
    if length == 0 {
        return out;
    }
    for end in (length - 1)..source.len() {
        let window = &source[end + 1 - length..=end];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end] = f(window);
    }
    out
}

pub fn rolling_sum(source: &[f64], length: usize) -> Vec<f64> {
    rolling(source, length, |w| w.iter().sum())
}

pub fn rolling_mean(source: &[f64], length: usize) -> Vec<f64> {
    rolling(source, length, |w| w.iter().sum::<f64>() / w.len() as f64)
}

pub fn rolling_max(source: &[f64], length: usize) -> Vec<f64> {
    rolling(source, length, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(source: &[f64], length: usize) -> Vec<f64> {
    rolling(source, length, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Sample standard deviation (n - 1 denominator). A one-value window is NaN.
pub fn rolling_stdev(source: &[f64], length: usize) -> Vec<f64> {
    rolling(source, length, |w| {
        if w.len() < 2 {
            return f64::NAN;
        }
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let var = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    })
}

/// Mean absolute deviation from the window mean.
pub fn rolling_mean_deviation(source: &[f64], length: usize) -> Vec<f64> {
    rolling(source, length, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        w.iter().map(|v| (v - mean).abs()).sum::<f64>() / n
    })
}

/// Value `offset` bars back; NaN where no such bar exists.
pub fn shift(source: &[f64], offset: usize) -> Vec<f64> {
    (0..source.len())
        .map(|i| {
            if i >= offset {
                source[i - offset]
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// x[t] - x[t - offset]
pub fn diff(source: &[f64], offset: usize) -> Vec<f64> {
    let prev = shift(source, offset);
    source.iter().zip(&prev).map(|(x, p)| x - p).collect()
}

/// Element-wise combination of two aligned columns.
pub fn zip_map<F>(a: &[f64], b: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

/// Recursive smoothing y[t] = alpha * x[t] + (1 - alpha) * y[t-1], seeded with
/// the first defined input. A NaN input carries the previous output forward.
pub fn exponential(source: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(source.len());
    let mut prev: Option<f64> = None;
    for &x in source {
        let y = match prev {
            None => x,
            Some(p) if x.is_nan() => p,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        if !y.is_nan() {
            prev = Some(y);
        }
        out.push(y);
    }
    out
}

/// max(high - low, |high - prev_close|, |low - prev_close|); the first bar uses high - low.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                return hl;
            }
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// Average true range: Wilder smoothing of the true range.
pub fn calc_atr(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    if length == 0 {
        return vec![f64::NAN; close.len()];
    }
    exponential(&true_range(high, low, close), 1.0 / length as f64)
}
