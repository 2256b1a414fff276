//! Common utility functions for breath-core
//!
//! - Counts/millivolt conversion and EMA coefficient helpers
//! - Injectable clocks and deadline pacing for the sampling loop
//!
//! Constants live in the config module.

pub mod time;
pub mod conversion;

// Re-export commonly used functions for convenience
pub use time::{
    MockTimeProvider,
    MonotonicTimeProvider,
    TickPacer,
    TimeProvider,
};

pub use conversion::{
    alpha_from_tau,
    counts_to_millivolts,
    lsb_millivolts,
    millivolts_to_counts,
    rail_millivolts,
    seconds_to_millis,
};
