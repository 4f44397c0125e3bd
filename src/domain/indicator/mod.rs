//! Technical indicator library.
//!
//! Every function takes aligned input columns (index 0 = oldest bar) and
//! returns columns of the same length. Positions before a window fills are NaN.
//! Multi-output indicators return a struct whose columns can be flattened into
//! named [`Outputs`] for the evaluator.

pub mod adx;
pub mod bollinger;
pub mod cci;
pub mod cross;
pub mod ema;
pub mod extremes;
pub mod ichimoku;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod pivot;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod supertrend;
pub mod vwap;
pub mod wma;

/// Named output columns, primary output first.
pub type Outputs = Vec<(&'static str, Vec<f64>)>;
