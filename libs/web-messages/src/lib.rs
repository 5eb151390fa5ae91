//! Bounded message buffer and live fan-out.
//!
//! [`MessageBuffer`] keeps the most recent `capacity` messages for consumers
//! that read on demand. [`SharedMessageBuffer`] makes it safe to use from
//! several threads, and [`MessageHub`] adds push delivery to live subscribers
//! on top of it.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod buffer;
pub mod config;
pub mod error;
pub mod hub;
pub mod shared;

pub use buffer::{MessageBuffer, DEFAULT_BUFFER_CAPACITY};
pub use config::MessagesConfig;
pub use error::BufferError;
pub use hub::{MessageHub, Subscription, WEB_MESSAGE_EVENT};
pub use shared::SharedMessageBuffer;
