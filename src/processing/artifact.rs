// src/processing/artifact.rs
//! Motion and electrical artifact classifier

use crate::config::DerivedCoefficients;
use crate::processing::filter_chain::ChannelState;
use serde::{Deserialize, Serialize};

/// Which artifact checks fired on a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFlags {
    /// Raw sample within the rail margin of full scale
    pub rail: bool,
    /// Envelope jumped more than the derivative limit in one tick
    pub spike: bool,
    /// Envelope far above its own baseline
    pub rms_burst: bool,
}

impl ArtifactFlags {
    pub fn any(&self) -> bool {
        self.rail || self.spike || self.rms_burst
    }
}

/// Per-channel artifact detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactDetector {
    rail_mv: f32,
    rail_margin_mv: f32,
    spike_deriv_mv: f32,
    rms_burst_factor: f32,
}

impl ArtifactDetector {
    pub fn new(coeffs: &DerivedCoefficients) -> Self {
        Self {
            rail_mv: coeffs.rail_mv,
            rail_margin_mv: coeffs.rail_margin_mv,
            spike_deriv_mv: coeffs.spike_deriv_mv,
            rms_burst_factor: coeffs.rms_burst_factor,
        }
    }

    /// Classify the channel's current tick
    ///
    /// Must run after the filter chain so `channel.env` is this tick's envelope.
    /// Every check runs and the channel's previous envelope is always advanced,
    /// even when an earlier check already fired.
    pub fn check(&self, channel: &mut ChannelState, x_mv: f32) -> ArtifactFlags {
        let rail = (self.rail_mv - x_mv.abs()).abs() <= self.rail_margin_mv;
        let spike = (channel.env - channel.prev_env).abs() > self.spike_deriv_mv;
        let rms_burst = channel.env > self.rms_burst_factor * channel.guarded_baseline();

        channel.prev_env = channel.env;

        ArtifactFlags { rail, spike, rms_burst }
    }
}

impl Default for ArtifactDetector {
    fn default() -> Self {
        Self::new(&DerivedCoefficients::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled_channel(env: f32, baseline: f32) -> ChannelState {
        let mut channel = ChannelState::default();
        channel.env = env;
        channel.prev_env = env;
        channel.env_baseline = baseline;
        channel
    }

    #[test]
    fn test_clean_sample_has_no_flags() {
        let detector = ArtifactDetector::default();
        let mut channel = settled_channel(20.0, 25.0);

        let flags = detector.check(&mut channel, 40.0);
        assert_eq!(flags, ArtifactFlags::default());
        assert!(!flags.any());
    }

    #[test]
    fn test_rail_proximity_both_polarities() {
        let detector = ArtifactDetector::default();
        let mut channel = settled_channel(20.0, 25.0);

        assert!(detector.check(&mut channel, 255.875).rail);
        assert!(detector.check(&mut channel, -256.0).rail);
        assert!(!detector.check(&mut channel, 250.0).rail);
    }

    #[test]
    fn test_envelope_spike() {
        let detector = ArtifactDetector::default();
        let mut channel = settled_channel(20.0, 100.0);

        channel.env = 60.0;
        let flags = detector.check(&mut channel, 0.0);
        assert!(flags.spike);
        assert!(!flags.rms_burst);
        assert_eq!(channel.prev_env, 60.0);

        // Previous envelope already advanced, so a steady level clears the flag
        assert!(!detector.check(&mut channel, 0.0).spike);
    }

    #[test]
    fn test_rms_burst() {
        let detector = ArtifactDetector::default();
        let mut channel = settled_channel(31.0, 10.0);

        let flags = detector.check(&mut channel, 0.0);
        assert!(flags.rms_burst);
        assert!(flags.any());
    }

    #[test]
    fn test_all_checks_run_together() {
        let detector = ArtifactDetector::default();
        let mut channel = settled_channel(0.0, 1.0);
        channel.env = 50.0;

        let flags = detector.check(&mut channel, 256.0);
        assert!(flags.rail && flags.spike && flags.rms_burst);
    }
}
