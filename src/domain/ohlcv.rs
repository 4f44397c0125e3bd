//! OHLCV bar representation and the append-only bar series.

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// (high + low) / 2
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// (high + low + close) / 3
    pub fn hlc3(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (open + high + low + close) / 4
    pub fn ohlc4(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    /// (high + low + 2 * close) / 4
    pub fn hlcc4(&self) -> f64 {
        (self.high + self.low + 2.0 * self.close) / 4.0
    }
}

/// Names accepted by [`BarSeries::column`].
pub const PRICE_COLUMNS: &[&str] = &[
    "open", "high", "low", "close", "volume", "hl2", "hlc3", "ohlc4", "hlcc4",
];

/// Columnar, append-only sequence of bars. Index 0 is the oldest bar.
///
/// Derived price columns are filled in as bars are ingested so the evaluator
/// can hand out whole columns without recomputing them.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub hl2: Vec<f64>,
    pub hlc3: Vec<f64>,
    pub ohlc4: Vec<f64>,
    pub hlcc4: Vec<f64>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bars<I: IntoIterator<Item = Bar>>(bars: I) -> Self {
        let mut series = Self::new();
        for bar in bars {
            series.push(bar);
        }
        series
    }

    pub fn push(&mut self, bar: Bar) {
        self.hl2.push(bar.hl2());
        self.hlc3.push(bar.hlc3());
        self.ohlc4.push(bar.ohlc4());
        self.hlcc4.push(bar.hlcc4());
        self.timestamps.push(bar.timestamp);
        self.open.push(bar.open);
        self.high.push(bar.high);
        self.low.push(bar.low);
        self.close.push(bar.close);
        self.volume.push(bar.volume);
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Look up a price column by its script name (see [`PRICE_COLUMNS`]).
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let col = match name {
            "open" => &self.open,
            "high" => &self.high,
            "low" => &self.low,
            "close" => &self.close,
            "volume" => &self.volume,
            "hl2" => &self.hl2,
            "hlc3" => &self.hlc3,
            "ohlc4" => &self.ohlc4,
            "hlcc4" => &self.hlcc4,
            _ => return None,
        };
        Some(col.as_slice())
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}
