// src/detection/events.rs
//! Episode events and their delivery
//!
//! Listeners run synchronously inside `tick()`. They must return quickly,
//! must not call back into the pipeline, and must not panic. A slow listener
//! delays the sampling loop.

use crate::acquisition::ring_buffer::Ring;
use crate::config::constants::episodes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventType {
    #[default]
    ApneaStart,
    ApneaEnd,
    HypopneaStart,
    HypopneaEnd,
    ArtifactDetected,
}

/// One state-machine transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp_ms: u64,
    pub duration_ms: u64,
}

impl Event {
    pub fn new(event_type: EventType, timestamp_ms: u64, duration_ms: u64) -> Self {
        Self {
            event_type,
            timestamp_ms,
            duration_ms,
        }
    }
}

/// Receiver of pipeline events
pub trait EventListener: Send {
    fn on_event(&mut self, event: &Event);
}

/// Adapts a closure into an [`EventListener`]
pub struct CallbackListener<F> {
    callback: F,
}

impl<F> CallbackListener<F>
where
    F: FnMut(&Event) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventListener for CallbackListener<F>
where
    F: FnMut(&Event) + Send,
{
    fn on_event(&mut self, event: &Event) {
        (self.callback)(event)
    }
}

/// Bounded event queue shared between the pipeline and a consumer
///
/// When the consumer falls behind, the oldest event is overwritten.
#[derive(Debug, Clone)]
pub struct EventQueue {
    inner: Arc<Mutex<Ring<Event>>>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ring::new(capacity))),
        }
    }

    pub fn pop(&self) -> Option<Event> {
        self.inner.lock().pop()
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<Event> {
        let mut ring = self.inner.lock();
        let mut events = Vec::with_capacity(ring.len());
        while let Some(event) = ring.pop() {
            events.push(event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Events lost because the queue was full
    pub fn dropped(&self) -> u64 {
        self.inner.lock().overwritten()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(episodes::DEFAULT_EVENT_QUEUE_CAPACITY)
    }
}

impl EventListener for EventQueue {
    fn on_event(&mut self, event: &Event) {
        self.inner.lock().push(*event);
    }
}
