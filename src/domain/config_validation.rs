//! Configuration validation and extraction.
//!
//! Validates the `[backtest]` and `[inputs]` sections before a run and turns
//! them into a `BacktestConfig` plus a list of input overrides.

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_SYMBOL};
use crate::domain::error::PinebtError;
use crate::domain::ohlcv::PRICE_COLUMNS;
use crate::domain::value::Value;
use crate::ports::config_port::ConfigPort;

pub const BACKTEST_SECTION: &str = "backtest";
pub const DATA_SECTION: &str = "data";
pub const INPUTS_SECTION: &str = "inputs";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PinebtError> {
    validate_initial_capital(config)?;
    validate_symbol(config)?;
    validate_inputs(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), PinebtError> {
    let Some(raw) = config.get_string(BACKTEST_SECTION, "initial_capital") else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value > 0.0 && value.is_finite() => Ok(()),
        _ => Err(PinebtError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be a positive number".to_string(),
        }),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), PinebtError> {
    match config.get_string(BACKTEST_SECTION, "symbol") {
        Some(s) if s.trim().is_empty() => Err(PinebtError::ConfigInvalid {
            section: BACKTEST_SECTION.to_string(),
            key: "symbol".to_string(),
            reason: "symbol must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Overrides must be numbers, booleans or a price column name.
fn validate_inputs(config: &dyn ConfigPort) -> Result<(), PinebtError> {
    for key in config.keys(INPUTS_SECTION) {
        let raw = config.get_string(INPUTS_SECTION, &key).unwrap_or_default();
        let accepted = match Value::parse_literal(&raw) {
            Value::Number(n) => n.is_finite(),
            Value::Bool(_) => true,
            Value::Text(name) => PRICE_COLUMNS.contains(&name.as_str()),
            _ => false,
        };
        if !accepted {
            return Err(PinebtError::ConfigInvalid {
                section: INPUTS_SECTION.to_string(),
                key,
                reason: format!("'{}' is not a number, boolean or price column", raw.trim()),
            });
        }
    }
    Ok(())
}

/// Backtest settings, falling back to defaults for absent keys.
pub fn backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_capital: config.get_double(
            BACKTEST_SECTION,
            "initial_capital",
            DEFAULT_INITIAL_CAPITAL,
        ),
        symbol: config
            .get_string(BACKTEST_SECTION, "symbol")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
    }
}

/// `[inputs]` entries as evaluator overrides.
pub fn input_overrides(config: &dyn ConfigPort) -> Vec<(String, Value)> {
    config
        .keys(INPUTS_SECTION)
        .into_iter()
        .filter_map(|key| {
            let raw = config.get_string(INPUTS_SECTION, &key)?;
            Some((key, Value::parse_literal(&raw)))
        })
        .collect()
}
