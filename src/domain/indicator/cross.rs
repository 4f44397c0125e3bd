//! Crossover / crossunder detection.
//!
//! Output is a boolean column encoded as 1.0 / 0.0. Comparisons involving NaN
//! are false, so the first bar is always 0.0.

pub fn crossover(a: &[f64], b: &[f64]) -> Vec<f64> {
    crossing(a, b, |curr_a, curr_b, prev_a, prev_b| {
        curr_a > curr_b && prev_a <= prev_b
    })
}

pub fn crossunder(a: &[f64], b: &[f64]) -> Vec<f64> {
    crossing(a, b, |curr_a, curr_b, prev_a, prev_b| {
        curr_a < curr_b && prev_a >= prev_b
    })
}

fn crossing<F>(a: &[f64], b: &[f64], crossed: F) -> Vec<f64>
where
    F: Fn(f64, f64, f64, f64) -> bool,
{
    let n = a.len().min(b.len());
    (0..n)
        .map(|i| {
            if i == 0 {
                return 0.0;
            }
            if crossed(a[i], b[i], a[i - 1], b[i - 1]) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}
