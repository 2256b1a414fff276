// src/error.rs
//! Unified error handling for breath-core
//!
//! The per-tick path never fails: a failed conversion degrades to a zero
//! reading and clamps replace configuration rejection. Errors only surface from
//! the setup surfaces (attaching a sample source, loading configuration).

use crate::config::loader::ConfigError;
use thiserror::Error;

/// Failure reported by a [`SampleSource`](crate::hal::SampleSource)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The converter is absent or stopped answering
    #[error("sample source unavailable: {0}")]
    Unavailable(String),

    /// A single conversion did not complete in time
    #[error("conversion timed out on channel {channel}")]
    ConversionTimeout { channel: u8 },

    /// The multiplexer input does not exist on this converter
    #[error("invalid converter channel {0}")]
    InvalidChannel(u8),
}

/// Unified error type for the crate
#[derive(Debug, Error)]
pub enum BreathError {
    #[error("sample source error: {0}")]
    Source(#[from] SourceError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for breath-core operations
pub type BreathResult<T> = Result<T, BreathError>;
