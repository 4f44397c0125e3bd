//! Average Directional Index.
//!
//! +DM/-DM from one-bar high/low moves (only the dominant positive move
//! counts), smoothed with RMA and divided by ATR to give +DI/-DI;
//! DX = 100 * |+DI - -DI| / (+DI + -DI); ADX = RMA(DX).

use super::ema::rma;
use crate::domain::indicator_helpers::{calc_atr, diff};

pub fn adx(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    let up = diff(high, 1);
    let down: Vec<f64> = diff(low, 1).into_iter().map(|d| -d).collect();

    let plus_dm: Vec<f64> = up
        .iter()
        .zip(&down)
        .map(|(&u, &d)| if u > d && u > 0.0 { u } else { 0.0 })
        .collect();
    let minus_dm: Vec<f64> = up
        .iter()
        .zip(&down)
        .map(|(&u, &d)| if d > u && d > 0.0 { d } else { 0.0 })
        .collect();

    let atr = calc_atr(high, low, close, length);
    let plus_smoothed = rma(&plus_dm, length);
    let minus_smoothed = rma(&minus_dm, length);

    let dx: Vec<f64> = (0..close.len())
        .map(|i| {
            let plus_di = 100.0 * plus_smoothed[i] / atr[i];
            let minus_di = 100.0 * minus_smoothed[i] / atr[i];
            100.0 * (plus_di - minus_di).abs() / (plus_di + minus_di)
        })
        .collect();

    rma(&dx, length)
}
