//! JSON report adapter implementing ReportPort.
//!
//! Non-finite floats (an infinite profit factor) serialize as `null`.

use std::collections::BTreeMap;
use std::fs;

use serde::Serialize;
use tracing::info;

use crate::domain::ast::{InputConfig, ParsedStrategy};
use crate::domain::backtest::BacktestReport;
use crate::domain::error::PinebtError;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
struct StrategySummary<'a> {
    name: &'a str,
    description: &'a str,
    version: u32,
    inputs: &'a BTreeMap<String, InputConfig>,
    entry_conditions: usize,
    exit_conditions: usize,
    indicators: usize,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    strategy: StrategySummary<'a>,
    backtest: &'a BacktestReport,
}

#[derive(Debug, Default)]
pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn render(
        &self,
        report: &BacktestReport,
        strategy: &ParsedStrategy,
    ) -> Result<String, PinebtError> {
        let document = ReportDocument {
            strategy: StrategySummary {
                name: &strategy.name,
                description: &strategy.description,
                version: strategy.version,
                inputs: &strategy.inputs,
                entry_conditions: strategy.entry_conditions.len(),
                exit_conditions: strategy.exit_conditions.len(),
                indicators: strategy.indicators.len(),
            },
            backtest: report,
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)
        } else {
            serde_json::to_string(&document)
        };
        rendered.map_err(|e| PinebtError::Report {
            reason: e.to_string(),
        })
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        report: &BacktestReport,
        strategy: &ParsedStrategy,
        output_path: &str,
    ) -> Result<(), PinebtError> {
        let json = self.render(report, strategy)?;
        fs::write(output_path, json).map_err(|e| PinebtError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })?;
        info!(path = output_path, "report written");
        Ok(())
    }
}
