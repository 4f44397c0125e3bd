//! Classic pivot points computed from the prior bar's high/low/close.

use super::Outputs;

#[derive(Debug, Clone, PartialEq)]
pub struct PivotPoints {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub r2: Vec<f64>,
    pub r3: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
    pub s3: Vec<f64>,
}

impl PivotPoints {
    pub fn into_outputs(self) -> Outputs {
        vec![
            ("pivot", self.pivot),
            ("r1", self.r1),
            ("r2", self.r2),
            ("r3", self.r3),
            ("s1", self.s1),
            ("s2", self.s2),
            ("s3", self.s3),
        ]
    }
}

pub fn pivot_points(high: &[f64], low: &[f64], close: &[f64]) -> PivotPoints {
    let n = close.len();
    let mut out = PivotPoints {
        pivot: vec![f64::NAN; n],
        r1: vec![f64::NAN; n],
        r2: vec![f64::NAN; n],
        r3: vec![f64::NAN; n],
        s1: vec![f64::NAN; n],
        s2: vec![f64::NAN; n],
        s3: vec![f64::NAN; n],
    };

    for i in 1..n {
        let (h, l, c) = (high[i - 1], low[i - 1], close[i - 1]);
        let pp = (h + l + c) / 3.0;
        out.pivot[i] = pp;
        out.r1[i] = 2.0 * pp - l;
        out.s1[i] = 2.0 * pp - h;
        out.r2[i] = pp + (h - l);
        out.s2[i] = pp - (h - l);
        out.r3[i] = h + 2.0 * (pp - l);
        out.s3[i] = l - 2.0 * (h - pp);
    }
    out
}
