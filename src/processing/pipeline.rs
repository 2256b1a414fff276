// src/processing/pipeline.rs
//! Breathing engine: one `tick()` per processing period
//!
//! Per tick, in order:
//! 1. read both channels (a failed or missing read counts as zero)
//! 2. filter chain, threshold tracker and artifact check on each channel
//! 3. threshold crossing and peak debouncing on each artifact-free channel
//! 4. rate window, hypopnea and apnea machines on the primary channel
//! 5. status snapshot, telemetry record and diagnostic burst sample
//!
//! Every other method must be called from the same execution context as
//! `tick()`. The engine holds no locks.

use crate::acquisition::burst::{BurstSample, DiagnosticBurstRing};
use crate::acquisition::telemetry::{TelemetryRecord, TelemetryRing};
use crate::config::constants::signal;
use crate::config::{DerivedCoefficients, PipelineConfig};
use crate::detection::{ApneaDetector, CallbackListener, Event, EventListener, EventType, HypopneaDetector};
use crate::error::BreathResult;
use crate::hal::{PrimaryChannel, RawFrame, SampleSource};
use crate::processing::artifact::{ArtifactDetector, ArtifactFlags};
use crate::processing::filter_chain::ChannelState;
use crate::processing::peak_detector::{PeakDetector, RateWindow};
use crate::utils::conversion::counts_to_millivolts;
use crate::utils::time::{MonotonicTimeProvider, TimeProvider};
use serde::Serialize;
use std::sync::Arc;

/// Snapshot of the engine after the most recent tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Status {
    pub timestamp_ms: u64,
    pub bpm: f32,
    pub signal_ok: bool,
    pub apnea: bool,
    pub hypopnea: bool,
    /// Primary channel artifact
    pub artifact: bool,
    pub channel_artifacts: [ArtifactFlags; signal::CHANNEL_COUNT],
    pub env: f32,
    pub baseline: f32,
    pub threshold: f32,
    pub snr: f32,
}

/// Running counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineMetrics {
    pub ticks: u64,
    pub source_errors: u64,
    pub peaks_accepted: u64,
    pub events_emitted: u64,
    pub bursts_triggered: u64,
    pub telemetry_dropped: u64,
}

/// Real-time breathing waveform engine
pub struct BreathPipeline {
    config: PipelineConfig,
    coeffs: DerivedCoefficients,
    artifact_detector: ArtifactDetector,
    peak_detector: PeakDetector,
    channels: [ChannelState; signal::CHANNEL_COUNT],
    rate_window: RateWindow,
    apnea: ApneaDetector,
    hypopnea: HypopneaDetector,
    status: Status,
    telemetry: TelemetryRing,
    burst: DiagnosticBurstRing,
    listener: Option<Box<dyn EventListener>>,
    source: Option<Box<dyn SampleSource>>,
    source_healthy: bool,
    clock: Arc<dyn TimeProvider>,
    epoch_ms: u64,
    metrics: PipelineMetrics,
}

impl BreathPipeline {
    /// Engine on the monotonic clock
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicTimeProvider::new()))
    }

    /// Engine on an injected clock; tick timestamps are relative to creation
    pub fn with_clock(config: PipelineConfig, clock: Arc<dyn TimeProvider>) -> Self {
        for note in config.adjustments() {
            tracing::warn!(adjustment = %note, "configuration value out of range, clamping");
        }
        let config = config.sanitized();
        let coeffs = DerivedCoefficients::from_config(&config);
        let epoch_ms = clock.now_millis();

        Self {
            artifact_detector: ArtifactDetector::new(&coeffs),
            peak_detector: PeakDetector::new(&coeffs),
            channels: std::array::from_fn(|_| ChannelState::new(coeffs.taps)),
            rate_window: RateWindow::new(),
            apnea: ApneaDetector::new(coeffs.apnea_min_ms),
            hypopnea: HypopneaDetector::new(coeffs.hypopnea_frac, coeffs.hypopnea_min_ms),
            status: Status::default(),
            telemetry: TelemetryRing::new(config.telemetry_capacity),
            burst: DiagnosticBurstRing::new(config.burst_pre_ms, config.burst_post_ms, config.processing_rate_hz),
            listener: None,
            source: None,
            source_healthy: true,
            clock,
            epoch_ms,
            metrics: PipelineMetrics::default(),
            config,
            coeffs,
        }
    }

    /// Attach the converter; the configured gain is applied first
    pub fn attach_source(&mut self, mut source: Box<dyn SampleSource>) -> BreathResult<()> {
        source.configure_gain(self.config.adc_gain)?;
        tracing::info!(source = source.name(), gain = ?self.config.adc_gain, "sample source attached");
        self.source = Some(source);
        self.source_healthy = true;
        Ok(())
    }

    /// Detach and return the current source
    pub fn detach_source(&mut self) -> Option<Box<dyn SampleSource>> {
        self.source.take()
    }

    /// Read one frame from the source and process it at the clock's current time
    pub fn tick(&mut self) {
        let frame = self.read_frame();
        let now_ms = self.clock.now_millis().saturating_sub(self.epoch_ms);
        self.ingest(frame, now_ms);
    }

    fn read_frame(&mut self) -> RawFrame {
        let mut frame = [0i16; signal::CHANNEL_COUNT];
        let mut failures = 0u64;
        let mut last_error = None;

        match self.source.as_mut() {
            Some(source) => {
                for (slot, channel) in frame.iter_mut().zip(self.config.channel_indices()) {
                    match source.read_raw(channel) {
                        Ok(counts) => *slot = counts,
                        Err(e) => {
                            failures += 1;
                            last_error = Some(e.to_string());
                        }
                    }
                }
            }
            None => {
                failures = signal::CHANNEL_COUNT as u64;
                last_error = Some("no sample source attached".to_string());
            }
        }

        self.metrics.source_errors += failures;
        match (failures, self.source_healthy) {
            (0, false) => {
                self.source_healthy = true;
                tracing::info!("sample source recovered");
            }
            (n, true) if n > 0 => {
                self.source_healthy = false;
                tracing::warn!(
                    error = last_error.as_deref().unwrap_or("unknown"),
                    "sample source failed, substituting zero readings"
                );
            }
            _ => {}
        }
        frame
    }

    /// Process one frame of raw counts taken at `now_ms`
    pub fn ingest(&mut self, frame: RawFrame, now_ms: u64) {
        let primary = self.config.primary_channel.index();
        let mut flags = [ArtifactFlags::default(); signal::CHANNEL_COUNT];
        let mut primary_peak = None;
        let mut primary_artifact_onset = false;

        for (index, channel) in self.channels.iter_mut().enumerate() {
            let x_mv = counts_to_millivolts(frame[index], self.coeffs.lsb_mv);
            channel.process(x_mv, &self.coeffs);
            flags[index] = self.artifact_detector.check(channel, x_mv);

            let artifact = flags[index].any();
            if index == primary {
                primary_artifact_onset = artifact && !channel.prev_artifact;
            }
            channel.prev_artifact = artifact;
            let above = channel.env >= channel.threshold(self.coeffs.threshold_factor) && !artifact;
            if above {
                channel.last_cross_ms = now_ms;
            }
            if !artifact {
                let peak = self.peak_detector.detect(channel, above, now_ms);
                if index == primary {
                    primary_peak = peak;
                }
            }
        }

        if let Some(peak) = primary_peak {
            self.metrics.peaks_accepted += 1;
            if let Some(rate) = peak.instantaneous_bpm() {
                self.rate_window.push(rate);
            }
        }

        let artifact = flags[primary].any();
        if primary_artifact_onset {
            self.dispatch(Event::new(EventType::ArtifactDetected, now_ms, 0));
        }

        let channel = &self.channels[primary];
        let (last_env_peak, env_baseline, last_cross_ms) =
            (channel.last_env_peak, channel.env_baseline, channel.last_cross_ms);

        let reduced = self.hypopnea.condition(last_env_peak, env_baseline, artifact);
        if let Some(event) = self.hypopnea.update(reduced, now_ms) {
            self.dispatch(event);
        }
        if let Some(event) = self.apnea.update(last_cross_ms, now_ms) {
            self.dispatch(event);
        }

        let channel = &self.channels[primary];
        self.status = Status {
            timestamp_ms: now_ms,
            bpm: self.rate_window.bpm(),
            signal_ok: now_ms.saturating_sub(channel.last_cross_ms) < self.coeffs.signal_ok_window_ms,
            apnea: self.apnea.is_active(),
            hypopnea: self.hypopnea.is_active(),
            artifact,
            channel_artifacts: flags,
            env: channel.env,
            baseline: channel.env_baseline,
            threshold: channel.threshold(self.coeffs.threshold_factor),
            snr: channel.snr(),
        };

        self.telemetry.push(TelemetryRecord {
            timestamp_ms: now_ms,
            bpm: self.status.bpm,
            signal_ok: self.status.signal_ok,
            apnea: self.status.apnea,
            hypopnea: self.status.hypopnea,
            artifact,
            env: self.status.env,
            threshold: self.status.threshold,
        });

        let completed = self.burst.record(BurstSample {
            ch1: frame[0],
            ch2: frame[1],
        });
        if completed {
            tracing::debug!(samples = self.burst.len(), "diagnostic burst capture complete");
        }

        self.metrics.ticks += 1;
    }

    fn dispatch(&mut self, event: Event) {
        self.metrics.events_emitted += 1;
        tracing::info!(
            event = ?event.event_type,
            timestamp_ms = event.timestamp_ms,
            duration_ms = event.duration_ms,
            "breathing event"
        );
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&event);
        }
    }

    /// Status after the most recent tick
    pub fn status(&self) -> Status {
        self.status
    }

    /// Oldest unread telemetry record
    pub fn pop_telemetry(&mut self) -> Option<TelemetryRecord> {
        self.telemetry.pop()
    }

    /// Keep recording for `post_ms` beyond this moment
    pub fn trigger_burst(&mut self, post_ms: u32) {
        self.burst.trigger(post_ms);
        self.metrics.bursts_triggered += 1;
        tracing::debug!(post_ms, retained = self.burst.len(), "diagnostic burst triggered");
    }

    /// Copy up to `max_samples` raw samples, oldest first
    pub fn export_burst(&self, max_samples: usize) -> Vec<BurstSample> {
        self.burst.export(max_samples)
    }

    /// Copy raw samples into caller buffers; returns the count written
    pub fn export_burst_into(&self, ch1: &mut [i16], ch2: &mut [i16]) -> usize {
        self.burst.export_into(ch1, ch2)
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listener = Some(listener);
    }

    pub fn set_event_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.listener = Some(Box::new(CallbackListener::new(callback)));
    }

    pub fn clear_event_listener(&mut self) {
        self.listener = None;
    }

    /// Apply a new configuration without resetting channel history
    ///
    /// Coefficients and machine thresholds are recomputed; rings are resized
    /// keeping their newest contents.
    pub fn update_config(&mut self, config: PipelineConfig) {
        for note in config.adjustments() {
            tracing::warn!(adjustment = %note, "configuration value out of range, clamping");
        }
        let config = config.sanitized();
        let coeffs = DerivedCoefficients::from_config(&config);

        self.artifact_detector = ArtifactDetector::new(&coeffs);
        self.peak_detector = PeakDetector::new(&coeffs);
        for channel in &mut self.channels {
            channel.set_tap_count(coeffs.taps);
        }
        self.apnea.set_min_quiet_ms(coeffs.apnea_min_ms);
        self.hypopnea.set_thresholds(coeffs.hypopnea_frac, coeffs.hypopnea_min_ms);
        self.telemetry.resize(config.telemetry_capacity);
        self.burst
            .reconfigure(config.burst_pre_ms, config.burst_post_ms, config.processing_rate_hz);

        if config.adc_gain != self.config.adc_gain {
            if let Some(source) = self.source.as_mut() {
                if let Err(e) = source.configure_gain(config.adc_gain) {
                    self.metrics.source_errors += 1;
                    tracing::warn!(error = %e, gain = ?config.adc_gain, "failed to apply gain to sample source");
                }
            }
        }

        tracing::info!(
            rate_hz = config.processing_rate_hz,
            primary = ?config.primary_channel,
            taps = coeffs.taps,
            "configuration applied"
        );
        self.config = config;
        self.coeffs = coeffs;
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn coefficients(&self) -> &DerivedCoefficients {
        &self.coeffs
    }

    pub fn channel(&self, channel: PrimaryChannel) -> &ChannelState {
        &self.channels[channel.index()]
    }

    pub fn metrics(&self) -> PipelineMetrics {
        PipelineMetrics {
            telemetry_dropped: self.telemetry.dropped(),
            ..self.metrics
        }
    }

    pub fn telemetry_len(&self) -> usize {
        self.telemetry.len()
    }

    pub fn burst_len(&self) -> usize {
        self.burst.len()
    }

    pub fn burst_active(&self) -> bool {
        self.burst.is_active()
    }
}
