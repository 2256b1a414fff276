// tests/config_loader_tests.rs
//! Layered configuration loading from files and the environment

use breath_core::config::ConfigLoader;
use breath_core::{AdcGain, AdcModel, PipelineConfig, PrimaryChannel};
use serial_test::serial;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn write_toml(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let file = write_toml(
        r#"
        processing_rate_hz = 200
        adc_model = "ads1115"
        primary_channel = "channel1"
        apnea_min_sec = 15.0
        "#,
    );

    let config = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .without_env()
        .load()
        .expect("Failed to load config");

    assert_eq!(config.processing_rate_hz, 200);
    assert_eq!(config.adc_model, AdcModel::Ads1115);
    assert_eq!(config.primary_channel, PrimaryChannel::Channel1);
    assert_eq!(config.apnea_min_sec, 15.0);
    assert_eq!(config.hypopnea_min_sec, PipelineConfig::default().hypopnea_min_sec);
}

#[test]
#[serial]
fn test_later_files_take_precedence() {
    let base = write_toml("anti_ring_taps = 4\nrefractory_sec = 0.5");
    let local = write_toml("anti_ring_taps = 6");

    let config = ConfigLoader::with_paths(vec![base.path().to_path_buf(), local.path().to_path_buf()])
        .without_env()
        .load()
        .unwrap();

    assert_eq!(config.anti_ring_taps, 6);
    assert_eq!(config.refractory_sec, 0.5);
}

#[test]
#[serial]
fn test_environment_overrides_files() {
    let file = write_toml("apnea_min_sec = 15.0\nadc_gain = \"four\"");
    std::env::set_var("BREATHTEST_APNEA_MIN_SEC", "12");
    std::env::set_var("BREATHTEST_ADC_GAIN", "two");

    let result = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .with_env_prefix("BREATHTEST")
        .load();

    std::env::remove_var("BREATHTEST_APNEA_MIN_SEC");
    std::env::remove_var("BREATHTEST_ADC_GAIN");

    let config = result.expect("Failed to load config");
    assert_eq!(config.apnea_min_sec, 12.0);
    assert_eq!(config.adc_gain, AdcGain::Two);
}

#[test]
#[serial]
fn test_malformed_file_is_error() {
    let file = write_toml("processing_rate_hz = \"fast\"");
    let result = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .without_env()
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_export_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("breath.toml");
    let config = PipelineConfig {
        threshold_factor: 0.5,
        burst_pre_ms: 1500,
        ..Default::default()
    };

    ConfigLoader::export(&config, &path).expect("Failed to export config");
    let loaded = ConfigLoader::with_paths(vec![path]).without_env().load().unwrap();

    assert_eq!(loaded, config);
}
