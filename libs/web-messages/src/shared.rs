use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::MessageBuffer;
use crate::error::BufferError;

/// Cloneable, thread-safe handle to a [`MessageBuffer`].
///
/// Appends and snapshots are mutually exclusive: no reader observes a length
/// above capacity or a partially copied buffer.
#[derive(Debug)]
pub struct SharedMessageBuffer<M> {
    inner: Arc<Mutex<MessageBuffer<M>>>,
}

impl<M> Clone for SharedMessageBuffer<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> SharedMessageBuffer<M> {
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        MessageBuffer::new(capacity).map(Self::from_buffer)
    }

    #[must_use]
    pub fn from_buffer(buffer: MessageBuffer<M>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    /// Append under the lock; returns the evicted message, if any.
    pub fn append(&self, message: M) -> Option<M> {
        self.inner.lock().append(message)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Run `f` with exclusive access to the buffer.
    ///
    /// `f` must not block; the lock is held for its whole duration.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut MessageBuffer<M>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<M: Clone> SharedMessageBuffer<M> {
    #[must_use]
    pub fn snapshot(&self) -> Vec<M> {
        self.inner.lock().snapshot()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_storage() {
        let buffer = SharedMessageBuffer::new(2).unwrap();
        let other = buffer.clone();
        buffer.append(1);
        other.append(2);
        other.append(3);
        assert_eq!(buffer.snapshot(), vec![2, 3]);
        assert_eq!(buffer.len(), 2);
        assert_eq!(other.capacity(), 2);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(SharedMessageBuffer::<u8>::new(0).is_err());
    }

    #[test]
    fn test_concurrent_appends_respect_capacity() {
        let buffer = SharedMessageBuffer::new(16).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let buffer = buffer.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        buffer.append((writer, i));
                    }
                })
            })
            .collect();

        let reader = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = buffer.snapshot();
                    assert!(snapshot.len() <= 16);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 16);

        // Per-writer order is preserved.
        for writer in 0..4 {
            let seq: Vec<_> = snapshot
                .iter()
                .filter(|(w, _)| *w == writer)
                .map(|(_, i)| *i)
                .collect();
            assert!(seq.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_with_locked_gives_exclusive_access() {
        let buffer = SharedMessageBuffer::new(3).unwrap();
        let len = buffer.with_locked(|inner| {
            for i in 0..4 {
                inner.append(i);
            }
            inner.len()
        });
        assert_eq!(len, 3);
        assert_eq!(buffer.snapshot(), vec![1, 2, 3]);
    }
}
