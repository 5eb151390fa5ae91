use thiserror::Error;

/// Configuration errors raised when a buffer or hub is constructed
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("live channel capacity must be between 1 and {max}, got {capacity}")]
    InvalidLiveCapacity { capacity: usize, max: usize },
}
