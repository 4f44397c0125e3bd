//! Change, momentum and rate of change.
//!
//! change/mom = x[t] - x[t-n]; ROC = 100 * (x[t] - x[t-n]) / x[t-n].

use crate::domain::indicator_helpers::{diff, shift, zip_map};

pub fn change(source: &[f64], length: usize) -> Vec<f64> {
    diff(source, length)
}

pub fn momentum(source: &[f64], length: usize) -> Vec<f64> {
    diff(source, length)
}

pub fn roc(source: &[f64], length: usize) -> Vec<f64> {
    zip_map(source, &shift(source, length), |x, prev| {
        100.0 * (x - prev) / prev
    })
}
