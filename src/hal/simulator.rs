// src/hal/simulator.rs
//! Scripted neonatal breathing simulator
//!
//! Plays a list of segments (breathing at a rate and amplitude, flat apnea,
//! rail saturation) and answers converter reads with the matching raw counts.
//! Each multiplexer input keeps its own sample counter, so reading both
//! channels once per tick advances simulated time by one processing period.
//!
//! A breath is modelled as one positive lobe followed by a rest phase of equal
//! length, not as a plain sinusoid. A full-wave rectified sinusoid gives an
//! envelope that stays above threshold, so the rate detector never sees a second
//! rising edge. The rest phase lets the envelope decay between breaths, giving
//! one hump per breath.

use crate::config::constants::{signal, time};
use crate::error::SourceError;
use crate::hal::traits::SampleSource;
use crate::hal::types::{AdcGain, AdcModel, RawFrame};
use crate::utils::conversion::{lsb_millivolts, millivolts_to_counts};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// One scripted stretch of signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// Regular breathing
    Breathing { bpm: f32, amplitude_mv: f32 },
    /// No respiratory movement; constant level
    Flat { level_mv: f32 },
    /// Converter pinned at positive full scale
    RailSaturation,
}

/// A segment and how long it lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub segment: Segment,
    pub duration_ms: u64,
}

impl ScriptStep {
    pub fn new(segment: Segment, duration_ms: u64) -> Self {
        Self { segment, duration_ms }
    }
}

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub rate_hz: u32,
    pub adc_model: AdcModel,
    pub adc_gain: AdcGain,
    /// Mux inputs answered, in frame order
    pub channel_inputs: [u8; signal::CHANNEL_COUNT],
    /// Per-channel amplitude scale, in frame order
    pub channel_scale: [f32; signal::CHANNEL_COUNT],
    /// Peak uniform noise in millivolts (0 disables)
    pub noise_mv: f32,
    pub seed: u64,
    /// Restart the script after the last step instead of holding it
    pub repeat: bool,
    pub script: Vec<ScriptStep>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            rate_hz: signal::DEFAULT_PROCESSING_RATE_HZ,
            adc_model: AdcModel::default(),
            adc_gain: AdcGain::default(),
            channel_inputs: [signal::DEFAULT_CHANNEL1_INDEX, signal::DEFAULT_CHANNEL2_INDEX],
            channel_scale: [1.0; signal::CHANNEL_COUNT],
            noise_mv: 0.0,
            seed: 0,
            repeat: false,
            script: vec![ScriptStep::new(
                Segment::Breathing {
                    bpm: 40.0,
                    amplitude_mv: 80.0,
                },
                60_000,
            )],
        }
    }
}

/// Scripted [`SampleSource`]
pub struct BreathSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    samples_read: [u64; signal::CHANNEL_COUNT],
}

impl BreathSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            samples_read: [0; signal::CHANNEL_COUNT],
            config,
        }
    }

    /// Steady breathing on both channels
    pub fn breathing(bpm: f32, amplitude_mv: f32) -> Self {
        Self::new(SimulatorConfig {
            script: vec![ScriptStep::new(Segment::Breathing { bpm, amplitude_mv }, u64::MAX)],
            ..Default::default()
        })
    }

    /// Play `script` with default converter settings
    pub fn scripted(script: Vec<ScriptStep>) -> Self {
        Self::new(SimulatorConfig {
            script,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Total scripted duration in milliseconds
    pub fn script_duration_ms(&self) -> u64 {
        self.config
            .script
            .iter()
            .fold(0u64, |acc, step| acc.saturating_add(step.duration_ms))
    }

    /// Noise-free millivolts for a frame position at `t_ms` of simulated time
    pub fn sample_mv(&self, position: usize, t_ms: u64) -> f32 {
        let scale = self.config.channel_scale.get(position).copied().unwrap_or(0.0);
        match self.segment_at(t_ms) {
            Some((Segment::Breathing { bpm, amplitude_mv }, offset_ms)) => {
                let t_sec = offset_ms as f32 / time::MILLISECONDS_PER_SECOND as f32;
                let phase = (t_sec * bpm / 60.0).fract();
                if phase < 0.5 {
                    scale * amplitude_mv * (2.0 * PI * 2.0 * phase).sin()
                } else {
                    0.0
                }
            }
            Some((Segment::Flat { level_mv }, _)) => scale * level_mv,
            Some((Segment::RailSaturation, _)) => self.rail_mv(),
            None => 0.0,
        }
    }

    /// Noise-free raw frame at `t_ms`
    pub fn frame_at(&self, t_ms: u64) -> RawFrame {
        let mut frame = [0i16; signal::CHANNEL_COUNT];
        for (position, slot) in frame.iter_mut().enumerate() {
            *slot = self.counts_for(position, t_ms, 0.0);
        }
        frame
    }

    fn segment_at(&self, t_ms: u64) -> Option<(Segment, u64)> {
        let total = self.script_duration_ms();
        if total == 0 {
            return None;
        }
        let t_ms = if self.config.repeat { t_ms % total } else { t_ms };

        let mut start = 0u64;
        for step in &self.config.script {
            let end = start.saturating_add(step.duration_ms);
            if t_ms < end {
                return Some((step.segment, t_ms - start));
            }
            start = end;
        }
        // Past the end: the last step holds
        self.config
            .script
            .last()
            .map(|step| (step.segment, t_ms - (total - step.duration_ms)))
    }

    fn rail_mv(&self) -> f32 {
        self.config.adc_gain.full_scale_mv()
    }

    fn counts_for(&self, position: usize, t_ms: u64, noise_mv: f32) -> i16 {
        let lsb = lsb_millivolts(self.config.adc_model, self.config.adc_gain);
        // Highest positive code of the converter
        let max_code = self.config.adc_model.counts_per_full_scale() - 1.0;

        if matches!(self.segment_at(t_ms), Some((Segment::RailSaturation, _))) {
            return max_code as i16;
        }
        let counts = millivolts_to_counts(self.sample_mv(position, t_ms) + noise_mv, lsb);
        counts.clamp(-(max_code as i16) - 1, max_code as i16)
    }
}

impl SampleSource for BreathSimulator {
    fn read_raw(&mut self, channel: u8) -> Result<i16, SourceError> {
        let position = self
            .config
            .channel_inputs
            .iter()
            .position(|&input| input == channel)
            .ok_or(SourceError::InvalidChannel(channel))?;

        let sample_index = self.samples_read[position];
        self.samples_read[position] += 1;
        let t_ms = sample_index * time::MILLISECONDS_PER_SECOND / self.config.rate_hz.max(1) as u64;

        let noise = if self.config.noise_mv > 0.0 {
            self.rng.gen_range(-self.config.noise_mv..=self.config.noise_mv)
        } else {
            0.0
        };
        Ok(self.counts_for(position, t_ms, noise))
    }

    fn configure_gain(&mut self, gain: AdcGain) -> Result<(), SourceError> {
        self.config.adc_gain = gain;
        Ok(())
    }

    fn name(&self) -> &str {
        "breath-simulator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breath_lobe_then_rest() {
        let sim = BreathSimulator::breathing(30.0, 80.0);
        // 30 bpm: 2 s period, lobe peaks at 0.25 s, rest from 1 s
        assert!((sim.sample_mv(0, 250) - 80.0).abs() < 1e-3);
        assert!(sim.sample_mv(0, 750) < -79.0);
        assert_eq!(sim.sample_mv(0, 1500), 0.0);
    }

    #[test]
    fn test_script_segments_and_hold() {
        let sim = BreathSimulator::scripted(vec![
            ScriptStep::new(Segment::Flat { level_mv: 10.0 }, 1000),
            ScriptStep::new(Segment::Flat { level_mv: 20.0 }, 1000),
        ]);
        assert_eq!(sim.sample_mv(0, 500), 10.0);
        assert_eq!(sim.sample_mv(0, 1500), 20.0);
        assert_eq!(sim.sample_mv(0, 10_000), 20.0);
        assert_eq!(sim.script_duration_ms(), 2000);
    }

    #[test]
    fn test_rail_saturation_counts() {
        let sim = BreathSimulator::scripted(vec![ScriptStep::new(Segment::RailSaturation, 1000)]);
        assert_eq!(sim.frame_at(0), [2047, 2047]);
    }

    #[test]
    fn test_read_advances_per_channel() {
        let mut sim = BreathSimulator::scripted(vec![
            ScriptStep::new(Segment::Flat { level_mv: 0.0 }, 10),
            ScriptStep::new(Segment::Flat { level_mv: 1.0 }, 1000),
        ]);
        // Default gain: 0.125 mV per code
        assert_eq!(sim.read_raw(0), Ok(0));
        assert_eq!(sim.read_raw(1), Ok(0));
        assert_eq!(sim.read_raw(0), Ok(8));
        assert_eq!(sim.read_raw(1), Ok(8));
        assert_eq!(sim.read_raw(3), Err(SourceError::InvalidChannel(3)));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let config = SimulatorConfig {
            noise_mv: 2.0,
            seed: 42,
            ..Default::default()
        };
        let mut a = BreathSimulator::new(config.clone());
        let mut b = BreathSimulator::new(config);
        for _ in 0..50 {
            assert_eq!(a.read_raw(0), b.read_raw(0));
        }
    }

    #[test]
    fn test_gain_changes_scale() {
        let mut sim = BreathSimulator::scripted(vec![ScriptStep::new(Segment::Flat { level_mv: 100.0 }, 1000)]);
        assert_eq!(sim.frame_at(0)[0], 800);
        sim.configure_gain(AdcGain::Two).unwrap();
        assert_eq!(sim.frame_at(0)[0], 100);
    }
}
