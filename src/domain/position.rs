//! Directional position state owned by one evaluator.

use serde::Serialize;
use std::fmt;

use crate::domain::ast::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Position {
    Short,
    #[default]
    Flat,
    Long,
}

impl Position {
    /// -1 short, 0 flat, +1 long.
    pub fn value(self) -> i8 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    pub fn sign(self) -> f64 {
        f64::from(self.value())
    }

    pub fn is_flat(self) -> bool {
        self == Position::Flat
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Position::Long => Some(Direction::Long),
            Position::Short => Some(Direction::Short),
            Position::Flat => None,
        }
    }
}

impl From<Direction> for Position {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Long => Position::Long,
            Direction::Short => Position::Short,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Short => write!(f, "short"),
            Position::Flat => write!(f, "flat"),
            Position::Long => write!(f, "long"),
        }
    }
}
