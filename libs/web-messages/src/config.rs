use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::error::BufferError;

/// Live channel capacity used when none is configured
pub const DEFAULT_LIVE_CAPACITY: usize = 256;

/// Largest live channel capacity; the channel allocates every slot up front
pub const MAX_LIVE_CAPACITY: usize = 1 << 16;

/// Message hub configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Messages retained for late-joining consumers
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Messages a live subscriber may fall behind before it skips ahead
    #[serde(default = "default_live_capacity")]
    pub live_capacity: usize,
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_live_capacity() -> usize {
    DEFAULT_LIVE_CAPACITY
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            live_capacity: DEFAULT_LIVE_CAPACITY,
        }
    }
}

impl MessagesConfig {
    /// # Errors
    ///
    /// Returns [`BufferError`] when either capacity is zero or the live
    /// capacity exceeds [`MAX_LIVE_CAPACITY`].
    pub fn validate(&self) -> Result<(), BufferError> {
        if self.buffer_capacity == 0 {
            return Err(BufferError::InvalidCapacity {
                capacity: self.buffer_capacity,
            });
        }
        if self.live_capacity == 0 || self.live_capacity > MAX_LIVE_CAPACITY {
            return Err(BufferError::InvalidLiveCapacity {
                capacity: self.live_capacity,
                max: MAX_LIVE_CAPACITY,
            });
        }
        Ok(())
    }
}
