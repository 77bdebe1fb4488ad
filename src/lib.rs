//! `cardinality-lab` measures the space efficiency and estimation error of
//! HyperLogLog-style distinct-count sketches across true distinct counts from
//! one up to 10^21.
//!
//! Counts that large cannot be reached by inserting elements one by one.
//! Instead, [`simulate::GrowthSimulator`] samples for every register the
//! distinct counts at which it last increases, then replays those transitions
//! in order, producing sketch states distributed exactly as if every element
//! had been inserted.

mod error;

pub mod compress;
pub mod counter;
pub mod driver;
pub mod report;
pub mod schedule;
pub mod simulate;
pub mod sketch;
pub mod stats;

pub use error::{Error, Result};
