// src/detection/apnea.rs
//! Apnea state machine
//!
//! Driven by the time since the primary channel last crossed its threshold
//! without artifact. Enters after `apnea_min` of quiet, leaves on the first tick
//! the quiet time drops below it again.

use crate::detection::events::{Event, EventType};
use crate::detection::EpisodeState;

#[derive(Debug, Clone)]
pub struct ApneaDetector {
    min_quiet_ms: u64,
    state: EpisodeState,
    onset_ms: u64,
}

impl ApneaDetector {
    pub fn new(min_quiet_ms: u64) -> Self {
        Self {
            min_quiet_ms,
            state: EpisodeState::Idle,
            onset_ms: 0,
        }
    }

    pub fn update(&mut self, last_cross_ms: u64, now_ms: u64) -> Option<Event> {
        let quiet_ms = now_ms.saturating_sub(last_cross_ms);

        match self.state {
            EpisodeState::Idle if quiet_ms >= self.min_quiet_ms => {
                self.state = EpisodeState::Active;
                self.onset_ms = last_cross_ms;
                Some(Event::new(EventType::ApneaStart, now_ms, quiet_ms))
            }
            EpisodeState::Active if quiet_ms < self.min_quiet_ms => {
                self.state = EpisodeState::Idle;
                Some(Event::new(
                    EventType::ApneaEnd,
                    now_ms,
                    now_ms.saturating_sub(self.onset_ms),
                ))
            }
            _ => None,
        }
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == EpisodeState::Active
    }

    pub fn min_quiet_ms(&self) -> u64 {
        self.min_quiet_ms
    }

    /// Change the entry threshold; the current state is kept
    pub fn set_min_quiet_ms(&mut self, min_quiet_ms: u64) {
        self.min_quiet_ms = min_quiet_ms;
    }
}
