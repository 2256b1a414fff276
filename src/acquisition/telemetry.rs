// src/acquisition/telemetry.rs
//! Lossy telemetry ring for slow consumers
//!
//! One record is appended per tick. When the consumer falls behind, the oldest
//! unread record is dropped so the sampling loop never blocks and memory stays
//! fixed.

use crate::acquisition::ring_buffer::Ring;
use serde::{Deserialize, Serialize};

/// Per-tick status snapshot handed to the transport/dashboard layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub timestamp_ms: u64,
    pub bpm: f32,
    pub signal_ok: bool,
    pub apnea: bool,
    pub hypopnea: bool,
    pub artifact: bool,
    pub env: f32,
    pub threshold: f32,
}

/// Fixed-capacity FIFO of telemetry records with overwrite-oldest policy
#[derive(Debug, Clone)]
pub struct TelemetryRing {
    records: Ring<TelemetryRecord>,
    overflowing: bool,
}

impl TelemetryRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Ring::new(capacity),
            overflowing: false,
        }
    }

    /// Append a record, dropping the oldest unread one when full
    pub fn push(&mut self, record: TelemetryRecord) {
        if let Some(dropped) = self.records.push(record) {
            // Log once per overflow run; a pop ends the run
            if !self.overflowing {
                self.overflowing = true;
                tracing::debug!(
                    dropped_ts_ms = dropped.timestamp_ms,
                    total_dropped = self.records.overwritten(),
                    "telemetry consumer behind, dropping oldest record"
                );
            }
        }
    }

    /// Oldest unread record, or `None` when the reader has caught up
    pub fn pop(&mut self) -> Option<TelemetryRecord> {
        self.overflowing = false;
        self.records.pop()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Records lost to overflow since creation
    pub fn dropped(&self) -> u64 {
        self.records.overwritten()
    }

    /// Change capacity, keeping the newest unread records
    pub fn resize(&mut self, capacity: usize) {
        self.records.resize(capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: u64) -> TelemetryRecord {
        TelemetryRecord {
            timestamp_ms: ts,
            ..Default::default()
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut ring = TelemetryRing::new(4);
        ring.push(record(10));
        ring.push(record(20));

        assert_eq!(ring.pop().map(|r| r.timestamp_ms), Some(10));
        assert_eq!(ring.pop().map(|r| r.timestamp_ms), Some(20));
        assert!(ring.pop().is_none());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut ring = TelemetryRing::new(3);
        for ts in 0..4 {
            ring.push(record(ts));
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.dropped(), 1);
        assert_eq!(ring.pop().map(|r| r.timestamp_ms), Some(1));
    }

    #[test]
    fn test_resize_keeps_unread_tail() {
        let mut ring = TelemetryRing::new(4);
        for ts in 0..4 {
            ring.push(record(ts));
        }
        ring.resize(2);
        assert_eq!(ring.capacity(), 2);
        assert_eq!(ring.pop().map(|r| r.timestamp_ms), Some(2));
        assert_eq!(ring.pop().map(|r| r.timestamp_ms), Some(3));
    }
}
