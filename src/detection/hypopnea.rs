// src/detection/hypopnea.rs
//! Hypopnea state machine
//!
//! The reduced-amplitude condition must hold without interruption for the full
//! minimum duration. Any break resets the window; partial windows never add up.

use crate::config::constants::filters;
use crate::detection::events::{Event, EventType};
use crate::detection::EpisodeState;

#[derive(Debug, Clone)]
pub struct HypopneaDetector {
    fraction: f32,
    min_duration_ms: u64,
    state: EpisodeState,
    window_start_ms: Option<u64>,
}

impl HypopneaDetector {
    pub fn new(fraction: f32, min_duration_ms: u64) -> Self {
        Self {
            fraction,
            min_duration_ms,
            state: EpisodeState::Idle,
            window_start_ms: None,
        }
    }

    /// Reduced breathing: last breath amplitude under `fraction` of the baseline
    pub fn condition(&self, last_env_peak: f32, env_baseline: f32, artifact: bool) -> bool {
        last_env_peak < self.fraction * env_baseline.max(filters::ENVELOPE_EPSILON) && !artifact
    }

    pub fn update(&mut self, reduced: bool, now_ms: u64) -> Option<Event> {
        if !reduced {
            let started = self.window_start_ms.take();
            if self.state == EpisodeState::Active {
                self.state = EpisodeState::Idle;
                let duration = started.map_or(0, |start| now_ms.saturating_sub(start));
                return Some(Event::new(EventType::HypopneaEnd, now_ms, duration));
            }
            return None;
        }

        let start = *self.window_start_ms.get_or_insert(now_ms);
        let held_ms = now_ms.saturating_sub(start);
        if self.state == EpisodeState::Idle && held_ms >= self.min_duration_ms {
            self.state = EpisodeState::Active;
            return Some(Event::new(EventType::HypopneaStart, now_ms, held_ms));
        }
        None
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == EpisodeState::Active
    }

    /// Start of the current uninterrupted window, if any
    pub fn window_start_ms(&self) -> Option<u64> {
        self.window_start_ms
    }

    pub fn set_thresholds(&mut self, fraction: f32, min_duration_ms: u64) {
        self.fraction = fraction;
        self.min_duration_ms = min_duration_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(detector: &mut HypopneaDetector, reduced: impl Fn(u64) -> bool, until_ms: u64) -> Vec<Event> {
        (0..until_ms)
            .step_by(10)
            .filter_map(|now| detector.update(reduced(now), now))
            .collect()
    }

    #[test]
    fn test_continuous_window_declares() {
        let mut hypo = HypopneaDetector::new(0.5, 10_000);
        let events = run(&mut hypo, |now| (1_000..15_000).contains(&now), 20_000);

        assert_eq!(
            events,
            vec![
                Event::new(EventType::HypopneaStart, 11_000, 10_000),
                Event::new(EventType::HypopneaEnd, 15_000, 14_000),
            ]
        );
    }

    #[test]
    fn test_break_resets_window() {
        let mut hypo = HypopneaDetector::new(0.5, 10_000);
        // Two 6 s stretches separated by a single clean tick
        let events = run(&mut hypo, |now| now != 6_000 && now < 12_000, 20_000);

        assert!(events.is_empty());
        assert_eq!(hypo.state(), EpisodeState::Idle);
    }

    #[test]
    fn test_condition() {
        let hypo = HypopneaDetector::new(0.5, 10_000);
        assert!(hypo.condition(4.0, 10.0, false));
        assert!(!hypo.condition(4.0, 10.0, true));
        assert!(!hypo.condition(6.0, 10.0, false));
        // Zero everywhere still counts as reduced
        assert!(hypo.condition(0.0, 0.0, false));
    }
}
