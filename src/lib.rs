//! pinebt: interpreter and backtester for a Pine-style trading script language.
//!
//! Hexagonal architecture: the language, indicators and backtest loop live in
//! [`domain`], port traits in [`ports`], file-backed implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
