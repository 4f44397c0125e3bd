//! Market-data access port trait.

use crate::domain::error::PinebtError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// All bars of the source, oldest first.
    fn load_bars(&self) -> Result<Vec<Bar>, PinebtError>;
}
