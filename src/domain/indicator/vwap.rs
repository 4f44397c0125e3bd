//! Volume-weighted average price, cumulative from the first bar (no session reset).

pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(close.len());
    let mut price_volume = 0.0;
    let mut total_volume = 0.0;
    for i in 0..close.len() {
        let typical = (high[i] + low[i] + close[i]) / 3.0;
        price_volume += typical * volume[i];
        total_volume += volume[i];
        out.push(price_volume / total_volume);
    }
    out
}
