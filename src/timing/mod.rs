//! High resolution lap timing.

pub mod stopwatch;

pub use stopwatch::{Lap, Stopwatch, StopwatchError};
