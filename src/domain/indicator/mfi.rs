//! Money Flow Index.
//!
//! Raw money flow = typical price * volume, split into positive/negative by the
//! direction of the typical price change, summed over `length` bars:
//! MFI = 100 - 100 / (1 + positive / negative).

use crate::domain::indicator_helpers::rolling_sum;

pub fn mfi(typical: &[f64], volume: &[f64], length: usize) -> Vec<f64> {
    let n = typical.len();
    let mut positive = vec![0.0; n];
    let mut negative = vec![0.0; n];
    for i in 1..n {
        let flow = typical[i] * volume[i];
        if typical[i] > typical[i - 1] {
            positive[i] = flow;
        } else if typical[i] < typical[i - 1] {
            negative[i] = flow;
        }
    }
    let pos_sum = rolling_sum(&positive, length);
    let neg_sum = rolling_sum(&negative, length);
    (0..n)
        .map(|i| 100.0 - 100.0 / (1.0 + pos_sum[i] / neg_sum[i]))
        .collect()
}
