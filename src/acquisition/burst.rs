// src/acquisition/burst.rs
//! Always-on diagnostic recorder of raw converter counts
//!
//! The ring records both channels on every tick, so it always holds a rolling
//! pre-trigger history. A trigger arms a post-trigger countdown; while the
//! countdown runs the ring keeps recording until `post_ms` of samples follow the
//! trigger moment. Export is a non-destructive copy, oldest first.

use crate::acquisition::ring_buffer::Ring;
use crate::config::constants::{buffers, time};
use serde::{Deserialize, Serialize};

/// Raw counts for both channels captured on one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstSample {
    pub ch1: i16,
    pub ch2: i16,
}

/// Ring capacity for a pre/post window at a processing rate
///
/// Bounded below by [`buffers::MIN_BURST_CAPACITY`] and above by
/// [`buffers::MAX_BURST_CAPACITY`].
pub fn burst_capacity(pre_ms: u32, post_ms: u32, rate_hz: u32) -> usize {
    let window_ms = pre_ms as u64 + post_ms as u64;
    let needed = (window_ms * rate_hz.max(1) as u64 / time::MILLISECONDS_PER_SECOND) as usize;
    needed.clamp(buffers::MIN_BURST_CAPACITY, buffers::MAX_BURST_CAPACITY)
}

/// Tick period in whole milliseconds (never zero)
fn tick_period_ms(rate_hz: u32) -> u32 {
    (time::MILLISECONDS_PER_SECOND as u32 / rate_hz.max(1)).max(1)
}

/// Pre/post-trigger diagnostic capture ring
#[derive(Debug, Clone)]
pub struct DiagnosticBurstRing {
    samples: Ring<BurstSample>,
    active: bool,
    post_remaining_ms: u32,
    tick_period_ms: u32,
}

impl DiagnosticBurstRing {
    pub fn new(pre_ms: u32, post_ms: u32, rate_hz: u32) -> Self {
        Self {
            samples: Ring::new(burst_capacity(pre_ms, post_ms, rate_hz)),
            active: false,
            post_remaining_ms: 0,
            tick_period_ms: tick_period_ms(rate_hz),
        }
    }

    /// Record one tick and advance the post-trigger countdown
    ///
    /// Returns true on the tick the post-trigger window completes.
    pub fn record(&mut self, sample: BurstSample) -> bool {
        self.samples.push(sample);

        if !self.active {
            return false;
        }
        self.post_remaining_ms = self.post_remaining_ms.saturating_sub(self.tick_period_ms);
        if self.post_remaining_ms == 0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Start (or restart) a post-trigger capture window
    pub fn trigger(&mut self, post_ms: u32) {
        self.active = true;
        self.post_remaining_ms = post_ms;
    }

    /// Copy up to `max_samples` retained samples, oldest first
    pub fn export(&self, max_samples: usize) -> Vec<BurstSample> {
        self.samples.iter().take(max_samples).copied().collect()
    }

    /// Copy into caller-owned channel buffers; returns the number of samples written
    pub fn export_into(&self, ch1: &mut [i16], ch2: &mut [i16]) -> usize {
        let limit = ch1.len().min(ch2.len());
        let mut written = 0;
        for (i, sample) in self.samples.iter().take(limit).enumerate() {
            ch1[i] = sample.ch1;
            ch2[i] = sample.ch2;
            written += 1;
        }
        written
    }

    /// Re-size for a new window or rate, keeping the newest history
    pub fn reconfigure(&mut self, pre_ms: u32, post_ms: u32, rate_hz: u32) {
        self.samples.resize(burst_capacity(pre_ms, post_ms, rate_hz));
        self.tick_period_ms = tick_period_ms(rate_hz);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn post_remaining_ms(&self) -> u32 {
        self.post_remaining_ms
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: i16) -> BurstSample {
        BurstSample { ch1: n, ch2: -n }
    }

    #[test]
    fn test_capacity_bounds() {
        assert_eq!(burst_capacity(3000, 3000, 100), 600);
        assert_eq!(burst_capacity(100, 100, 100), buffers::MIN_BURST_CAPACITY);
        assert_eq!(burst_capacity(60_000, 60_000, 1000), buffers::MAX_BURST_CAPACITY);
        assert_eq!(burst_capacity(3000, 3000, 0), buffers::MIN_BURST_CAPACITY);
    }

    #[test]
    fn test_records_without_trigger() {
        let mut ring = DiagnosticBurstRing::new(3000, 3000, 100);
        for n in 0..700 {
            assert!(!ring.record(sample(n)));
        }
        assert_eq!(ring.len(), 600);
        assert!(!ring.is_active());

        let exported = ring.export(3);
        assert_eq!(exported, vec![sample(100), sample(101), sample(102)]);
    }

    #[test]
    fn test_post_trigger_countdown() {
        let mut ring = DiagnosticBurstRing::new(3000, 3000, 100);
        ring.trigger(50);
        assert!(ring.is_active());

        let completed: Vec<bool> = (0..6).map(|n| ring.record(sample(n))).collect();
        assert_eq!(completed, vec![false, false, false, false, true, false]);
        assert!(!ring.is_active());
        assert_eq!(ring.post_remaining_ms(), 0);
    }

    #[test]
    fn test_export_is_non_destructive() {
        let mut ring = DiagnosticBurstRing::new(3000, 3000, 100);
        for n in 0..10 {
            ring.record(sample(n));
        }
        assert_eq!(ring.export(100).len(), 10);
        assert_eq!(ring.export(100).len(), 10);

        let mut ch1 = [0i16; 4];
        let mut ch2 = [0i16; 4];
        assert_eq!(ring.export_into(&mut ch1, &mut ch2), 4);
        assert_eq!(ch1, [0, 1, 2, 3]);
        assert_eq!(ch2, [0, -1, -2, -3]);
    }

    #[test]
    fn test_reconfigure_keeps_newest() {
        let mut ring = DiagnosticBurstRing::new(3000, 3000, 100);
        for n in 0..600 {
            ring.record(sample(n));
        }
        ring.reconfigure(500, 500, 100);
        assert_eq!(ring.capacity(), 100);
        assert_eq!(ring.export(1), vec![sample(500)]);
    }
}
