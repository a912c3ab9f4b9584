//! Computations over the parsed archive: mutual-dependency detection and
//! usage indexing.

mod cycles;
mod usage;

pub use cycles::{CycleDetector, MutualPair};
pub use usage::{UsageAnalyzer, UsageIndex};
