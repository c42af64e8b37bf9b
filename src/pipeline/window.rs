//! Fixed-capacity sliding window with drop-oldest eviction.
//!
//! The window keeps the most recent `capacity` insertions since the last
//! drain, in arrival order. When full, an insert shifts everything one slot
//! toward the head (discarding slot 0) and writes the new value at the tail.
//! There is no modulo wraparound, so a drain is always a single contiguous
//! copy of `slots[..len]`.
//!
//! All three operations take the same lock for their full duration, so the
//! window can be shared between an inserting thread and a draining thread.

use crate::pipeline::error::{PipelineError, PipelineResult};
use std::sync::{Mutex, MutexGuard};

struct WindowState {
    slots: Box<[i64]>,
    /// Number of live elements. The most recent value sits at `len - 1`.
    len: usize,
}

/// Thread-safe sliding-window collector of integers.
pub struct SlidingWindow {
    state: Mutex<WindowState>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window. A capacity of zero is rejected.
    pub fn new(capacity: usize) -> PipelineResult<Self> {
        if capacity == 0 {
            return Err(PipelineError::InvalidCapacity);
        }
        Ok(Self {
            state: Mutex::new(WindowState {
                slots: vec![0; capacity].into_boxed_slice(),
                len: 0,
            }),
            capacity,
        })
    }

    /// Lock the state. Every operation leaves the state consistent before
    /// it can panic, so a poisoned lock is still safe to reuse.
    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a value, dropping the oldest one if the window is full.
    pub fn insert(&self, value: i64) {
        let mut state = self.lock();
        if state.len == self.capacity {
            state.slots.copy_within(1.., 0);
            state.slots[self.capacity - 1] = value;
        } else {
            let tail = state.len;
            state.slots[tail] = value;
            state.len += 1;
        }
    }

    /// Take every live value in arrival order and reset to empty.
    ///
    /// Returns `None` when there is nothing to take, never an empty `Vec`.
    pub fn drain(&self) -> Option<Vec<i64>> {
        let mut state = self.lock();
        if state.len == 0 {
            return None;
        }
        let batch = state.slots[..state.len].to_vec();
        state.len = 0;
        Some(batch)
    }

    /// Pop the most recently inserted value.
    pub fn remove_last(&self) -> Option<i64> {
        let mut state = self.lock();
        if state.len == 0 {
            return None;
        }
        state.len -= 1;
        Some(state.slots[state.len])
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SlidingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
