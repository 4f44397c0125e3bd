//! Core domain: the script language, indicators, evaluation and backtesting.

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod value;
pub mod functions;
pub mod evaluator;
pub mod ohlcv;
pub mod position;
pub mod signal;
pub mod indicator;
pub mod indicator_helpers;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
