// src/acquisition/ring_buffer.rs
//! Fixed-capacity ring buffer with overwrite-oldest semantics
//!
//! Every circular buffer in the engine (anti-ring taps, rate window, telemetry,
//! diagnostic burst, event queue) is a `Ring`. Storage is allocated once at
//! construction; pushes never allocate and never block. The ring is meant for a
//! single execution context and carries no synchronization.

/// Arena-plus-index ring buffer
#[derive(Debug, Clone)]
pub struct Ring<T> {
    slots: Vec<T>,
    head: usize,
    len: usize,
    overwritten: u64,
}

impl<T: Default> Ring<T> {
    /// Create a ring holding up to `capacity` items (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);

        Self {
            slots,
            head: 0,
            len: 0,
            overwritten: 0,
        }
    }

    /// Append an item; when full the oldest item is evicted and returned
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        let evicted = std::mem::replace(&mut self.slots[self.head], item);
        self.head = (self.head + 1) % capacity;

        if self.len < capacity {
            self.len += 1;
            None
        } else {
            self.overwritten += 1;
            Some(evicted)
        }
    }

    /// Remove and return the oldest item
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let tail = self.tail();
        self.len -= 1;
        Some(std::mem::take(&mut self.slots[tail]))
    }

    /// Change capacity, keeping the newest items that still fit
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity == self.capacity() {
            return;
        }

        let keep = self.len.min(capacity);
        let skip = self.len - keep;
        let mut resized = Ring::new(capacity);
        for _ in 0..skip {
            self.pop();
        }
        while let Some(item) = self.pop() {
            resized.push(item);
        }
        resized.overwritten = self.overwritten + skip as u64;
        *self = resized;
    }

    /// Drop all items, keeping capacity
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
        self.head = 0;
    }
}

impl<T> Ring<T> {
    /// Items currently held
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Items evicted by pushes into a full ring since creation
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }

    /// Current buffer utilization (0.0 to 1.0)
    pub fn utilization(&self) -> f32 {
        self.len as f32 / self.capacity() as f32
    }

    /// Item at `index`, counted from the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        Some(&self.slots[(self.tail() + index) % self.capacity()])
    }

    /// Most recently pushed item
    pub fn newest(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Iterate oldest to newest without consuming
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).map(move |i| &self.slots[(self.tail() + i) % self.capacity()])
    }

    fn tail(&self) -> usize {
        (self.head + self.capacity() - self.len) % self.capacity()
    }
}
