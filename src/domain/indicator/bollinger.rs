//! Bollinger Bands.
//!
//! basis = SMA(source, n); dev = mult * rolling sample stdev;
//! upper/lower = basis +/- dev.

use super::Outputs;
use super::sma::sma;
use crate::domain::indicator_helpers::{rolling_stdev, zip_map};

#[derive(Debug, Clone, PartialEq)]
pub struct Bollinger {
    pub basis: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Bollinger {
    pub fn into_outputs(self) -> Outputs {
        vec![
            ("basis", self.basis),
            ("upper", self.upper),
            ("lower", self.lower),
        ]
    }
}

pub fn bollinger(source: &[f64], length: usize, mult: f64) -> Bollinger {
    let basis = sma(source, length);
    let dev: Vec<f64> = rolling_stdev(source, length)
        .into_iter()
        .map(|sd| mult * sd)
        .collect();
    let upper = zip_map(&basis, &dev, |b, d| b + d);
    let lower = zip_map(&basis, &dev, |b, d| b - d);
    Bollinger {
        basis,
        upper,
        lower,
    }
}
