// src/hal/traits.rs
//! Sample source abstraction for the analog front end

use crate::error::SourceError;
use crate::hal::types::AdcGain;

/// Injected converter capability: "read one raw count for channel N"
///
/// A read may block for one conversion time; that latency is charged to the
/// tick that requested it.
pub trait SampleSource: Send {
    /// Read one raw conversion from a multiplexer input
    fn read_raw(&mut self, channel: u8) -> Result<i16, SourceError>;

    /// Apply a programmable gain setting; sources without a PGA ignore it
    fn configure_gain(&mut self, _gain: AdcGain) -> Result<(), SourceError> {
        Ok(())
    }

    /// Human-readable name used in log fields
    fn name(&self) -> &str {
        "sample-source"
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read_raw(&mut self, channel: u8) -> Result<i16, SourceError> {
        (**self).read_raw(channel)
    }

    fn configure_gain(&mut self, gain: AdcGain) -> Result<(), SourceError> {
        (**self).configure_gain(gain)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapter turning a closure into a [`SampleSource`]
pub struct FnSource<F> {
    read: F,
}

impl<F> FnSource<F>
where
    F: FnMut(u8) -> Result<i16, SourceError> + Send,
{
    pub fn new(read: F) -> Self {
        Self { read }
    }
}

impl<F> SampleSource for FnSource<F>
where
    F: FnMut(u8) -> Result<i16, SourceError> + Send,
{
    fn read_raw(&mut self, channel: u8) -> Result<i16, SourceError> {
        (self.read)(channel)
    }

    fn name(&self) -> &str {
        "fn-source"
    }
}
