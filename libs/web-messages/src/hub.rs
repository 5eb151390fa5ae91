//! Buffered publish/subscribe for web messages.
//!
//! Every published message is appended to the bounded buffer and then pushed
//! to live subscribers. A new subscriber receives the buffered messages as a
//! replay followed by everything published after it subscribed.

use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::config::MessagesConfig;
use crate::error::BufferError;
use crate::shared::SharedMessageBuffer;

/// Event name used when messages are delivered to web consumers
pub const WEB_MESSAGE_EVENT: &str = "WEB_MESSAGE";

/// Bounded buffer plus live fan-out
#[derive(Debug)]
pub struct MessageHub<M> {
    buffer: SharedMessageBuffer<M>,
    live: broadcast::Sender<M>,
}

impl<M> Clone for MessageHub<M> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            live: self.live.clone(),
        }
    }
}

/// Buffered messages at subscription time and the live feed that follows them
#[derive(Debug)]
pub struct Subscription<M> {
    pub replay: Vec<M>,
    pub live: broadcast::Receiver<M>,
}

impl<M: Clone + Send + 'static> MessageHub<M> {
    /// # Errors
    ///
    /// Returns [`BufferError`] if the configuration does not validate.
    pub fn new(config: &MessagesConfig) -> Result<Self, BufferError> {
        config.validate()?;
        let buffer = SharedMessageBuffer::new(config.buffer_capacity)?;
        let (live, _) = broadcast::channel(config.live_capacity);

        tracing::debug!(
            buffer_capacity = config.buffer_capacity,
            live_capacity = config.live_capacity,
            "Message hub created"
        );

        Ok(Self { buffer, live })
    }

    /// Buffer a message and push it to live subscribers.
    ///
    /// Returns the number of live subscribers it was pushed to; zero is not
    /// an error.
    pub fn publish(&self, message: M) -> usize {
        // Buffering and sending under one lock keeps subscribe() from seeing
        // a message both in its replay and on its live feed.
        self.buffer.with_locked(|buffer| {
            if buffer.append(message.clone()).is_some() {
                tracing::trace!(capacity = buffer.capacity(), "Evicted oldest message");
            }
            self.live.send(message).unwrap_or(0)
        })
    }

    /// Buffered messages, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<M> {
        self.buffer.snapshot()
    }

    /// Subscribe to live messages together with the current replay.
    ///
    /// Nothing published concurrently is lost or delivered twice between
    /// the replay and the live feed.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<M> {
        self.buffer.with_locked(|buffer| Subscription {
            replay: buffer.snapshot(),
            live: self.live.subscribe(),
        })
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.live.receiver_count()
    }

    #[must_use]
    pub fn buffer(&self) -> &SharedMessageBuffer<M> {
        &self.buffer
    }
}

impl<M: Clone + Send + 'static> Subscription<M> {
    /// Replay followed by live messages.
    ///
    /// A subscriber that falls more than the live capacity behind skips the
    /// messages it missed; the gap is logged.
    pub fn into_stream(self) -> impl Stream<Item = M> + Send + 'static {
        let live = BroadcastStream::new(self.live).filter_map(|item| match item {
            Ok(message) => Some(message),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Live subscriber lagged; messages dropped");
                None
            }
        });

        tokio_stream::iter(self.replay).chain(live)
    }
}
