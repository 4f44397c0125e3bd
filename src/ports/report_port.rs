//! Report generation port trait.

use crate::domain::ast::ParsedStrategy;
use crate::domain::backtest::BacktestReport;
use crate::domain::error::PinebtError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        report: &BacktestReport,
        strategy: &ParsedStrategy,
        output_path: &str,
    ) -> Result<(), PinebtError>;
}
