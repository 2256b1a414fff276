// src/hal/types.rs
//! Core types for the analog front end

use crate::config::constants::signal;
use serde::{Deserialize, Serialize};

/// One raw conversion per physical channel, in channel order (sensor 1, sensor 2)
pub type RawFrame = [i16; signal::CHANNEL_COUNT];

/// Converter family; selects the code span of one full-scale excursion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdcModel {
    /// 12-bit converter
    #[default]
    Ads1015,
    /// 16-bit converter
    Ads1115,
}

impl AdcModel {
    /// Number of codes between zero and positive full scale
    pub fn counts_per_full_scale(self) -> f32 {
        match self {
            AdcModel::Ads1015 => signal::ADS1015_COUNTS_PER_FULL_SCALE,
            AdcModel::Ads1115 => signal::ADS1115_COUNTS_PER_FULL_SCALE,
        }
    }
}

/// Programmable gain setting of the converter front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdcGain {
    /// ±6.144 V
    TwoThirds,
    /// ±4.096 V
    One,
    /// ±2.048 V
    Two,
    /// ±1.024 V
    Four,
    /// ±0.512 V
    Eight,
    /// ±0.256 V, sized for small neonatal piezo signals
    #[default]
    Sixteen,
}

impl AdcGain {
    /// Full-scale input voltage in millivolts; also the saturation rail
    pub fn full_scale_mv(self) -> f32 {
        match self {
            AdcGain::TwoThirds => 6144.0,
            AdcGain::One => 4096.0,
            AdcGain::Two => 2048.0,
            AdcGain::Four => 1024.0,
            AdcGain::Eight => 512.0,
            AdcGain::Sixteen => 256.0,
        }
    }
}

/// Which sensor drives rate and episode detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryChannel {
    Channel1,
    #[default]
    Channel2,
}

impl PrimaryChannel {
    /// Position of this channel inside a [`RawFrame`]
    pub fn index(self) -> usize {
        match self {
            PrimaryChannel::Channel1 => 0,
            PrimaryChannel::Channel2 => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_full_scale_table() {
        assert_eq!(AdcGain::TwoThirds.full_scale_mv(), 6144.0);
        assert_eq!(AdcGain::Two.full_scale_mv(), 2048.0);
        assert_eq!(AdcGain::Sixteen.full_scale_mv(), 256.0);
        assert_eq!(AdcGain::default(), AdcGain::Sixteen);
    }

    #[test]
    fn test_primary_channel_index() {
        assert_eq!(PrimaryChannel::Channel1.index(), 0);
        assert_eq!(PrimaryChannel::Channel2.index(), 1);
        assert_eq!(PrimaryChannel::default(), PrimaryChannel::Channel2);
    }

    #[test]
    fn test_serde_names() {
        let gain: AdcGain = toml::Value::String("two_thirds".into()).try_into().unwrap();
        assert_eq!(gain, AdcGain::TwoThirds);
        let model: AdcModel = toml::Value::String("ads1115".into()).try_into().unwrap();
        assert_eq!(model, AdcModel::Ads1115);
    }
}
