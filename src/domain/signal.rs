//! Trading signals emitted by the evaluator, one per processed bar.

use serde::Serialize;
use std::fmt;

use crate::domain::ast::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Buy,
    Sell,
    ExitLong,
    ExitShort,
    None,
}

impl SignalType {
    pub fn entry(direction: Direction) -> Self {
        match direction {
            Direction::Long => SignalType::Buy,
            Direction::Short => SignalType::Sell,
        }
    }

    pub fn exit(direction: Direction) -> Self {
        match direction {
            Direction::Long => SignalType::ExitLong,
            Direction::Short => SignalType::ExitShort,
        }
    }

    pub fn is_entry(self) -> bool {
        matches!(self, SignalType::Buy | SignalType::Sell)
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::ExitLong => "EXIT_LONG",
            SignalType::ExitShort => "EXIT_SHORT",
            SignalType::None => "NONE",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub kind: SignalType,
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
}

impl Signal {
    pub fn none(symbol: &str) -> Self {
        Self {
            kind: SignalType::None,
            symbol: symbol.to_string(),
            price: 0.0,
            quantity: 0.0,
            stop_loss: None,
            target: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == SignalType::None
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} qty={} @ {:.4}",
            self.kind, self.symbol, self.quantity, self.price
        )?;
        if let Some(stop) = self.stop_loss {
            write!(f, " stop={:.4}", stop)?;
        }
        if let Some(target) = self.target {
            write!(f, " target={:.4}", target)?;
        }
        Ok(())
    }
}
