use std::collections::VecDeque;

use crate::error::BufferError;

/// Capacity used when none is configured
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;

/// Entries allocated up front; larger buffers grow on demand
const PREALLOCATED_ENTRIES: usize = 1024;

/// Append-only sequence of the most recent `capacity` messages.
///
/// Storage is a ring that grows up to `capacity` entries and is then reused.
/// When full, the oldest entry is evicted before the new one is pushed, so
/// the length never exceeds the capacity, not even transiently.
#[derive(Debug)]
pub struct MessageBuffer<M> {
    entries: VecDeque<M>,
    capacity: usize,
}

impl<M> MessageBuffer<M> {
    /// Create an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidCapacity { capacity });
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity.min(PREALLOCATED_ENTRIES)),
            capacity,
        })
    }

    /// Append a message, evicting the oldest one first when full.
    ///
    /// Returns the evicted message, if any.
    pub fn append(&mut self, message: M) -> Option<M> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(message);
        debug_assert!(self.entries.len() <= self.capacity);
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Messages oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &M> + ExactSizeIterator {
        self.entries.iter()
    }
}

impl<M: Clone> MessageBuffer<M> {
    /// Independent copy of the current contents, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<M> {
        self.entries.iter().cloned().collect()
    }
}
