#![allow(dead_code)]

use chrono::NaiveDate;
use pinebt::domain::error::PinebtError;
pub use pinebt::domain::ohlcv::Bar;
use pinebt::ports::data_port::DataPort;
use std::io::Write;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn with_error(column: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(column.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self) -> Result<Vec<Bar>, PinebtError> {
        if let Some(column) = &self.error {
            return Err(PinebtError::MissingColumn {
                column: column.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn make_bar(date: &str, close: f64) -> Bar {
    Bar {
        timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// One bar per day from 2024-01-01 with the given closes.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: (start + chrono::Duration::days(i as i64))
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Deterministic zig-zag price path with a drift.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.2 * t + 8.0 * (t / 5.0).sin()
        })
        .collect()
}

pub fn bars_csv(bars: &[Bar]) -> String {
    let mut out = String::from("time,open,high,low,close,volume\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const SMA_CROSS: &str = r#"//@version=5
strategy("SMA Cross", overlay=true)
fastLength = input.int(5, "Fast")
slowLength = input.int(12, "Slow")
fast = ta.sma(close, fastLength)
slow = ta.sma(close, slowLength)
strategy.entry("Long", strategy.long, when=ta.crossover(fast, slow))
strategy.close("Long", when=ta.crossunder(fast, slow))
"#;
