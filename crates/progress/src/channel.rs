//! Embedding-context channel.
//!
//! The embedding context is whatever hosts the course (the parent page, a
//! test harness, a CLI transcript). It receives [`ParentMessage`]s
//! synchronously, on the caller's stack.

use chrono::Utc;
use scormbridge_core::{ParentMessage, Time};
use std::sync::{Mutex, PoisonError};

/// A sink for messages addressed to the embedding context.
///
/// Delivery is best effort: implementations must not fail the caller.
pub trait EmbeddingChannel: Send + Sync {
    /// Deliver a message.
    fn post(&self, message: &ParentMessage);
}

impl<F> EmbeddingChannel for F
where
    F: Fn(&ParentMessage) + Send + Sync,
{
    fn post(&self, message: &ParentMessage) {
        self(message)
    }
}

/// A message together with the time it was posted.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    /// When it was posted
    pub at: Time,

    /// The message
    pub message: ParentMessage,
}

/// Channel that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    entries: Mutex<Vec<RecordedMessage>>,
}

impl RecordingChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded entry, oldest first.
    pub fn entries(&self) -> Vec<RecordedMessage> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every recorded message, oldest first.
    pub fn messages(&self) -> Vec<ParentMessage> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Messages other than mirrored log lines.
    pub fn events(&self) -> Vec<ParentMessage> {
        self.messages()
            .into_iter()
            .filter(|m| !matches!(m, ParentMessage::ScormLog { .. }))
            .collect()
    }

    /// The `type` tag of every message, oldest first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.messages().iter().map(ParentMessage::kind).collect()
    }

    /// Remove and return every recorded message.
    pub fn drain(&self) -> Vec<ParentMessage> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
            .into_iter()
            .map(|e| e.message)
            .collect()
    }
}

impl EmbeddingChannel for RecordingChannel {
    fn post(&self, message: &ParentMessage) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedMessage {
                at: Utc::now(),
                message: message.clone(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_recording_channel_keeps_order() {
        let channel = RecordingChannel::new();
        channel.post(&ParentMessage::ScormInitialize);
        channel.post(&ParentMessage::log("LMSCommit", None));
        channel.post(&ParentMessage::ScormFinish);

        assert_eq!(channel.kinds(), vec!["scormInitialize", "scormLog", "scormFinish"]);
        assert_eq!(
            channel.events(),
            vec![ParentMessage::ScormInitialize, ParentMessage::ScormFinish]
        );

        let entries = channel.entries();
        assert!(entries[0].at <= entries[2].at);
    }

    #[test]
    fn test_drain_empties_channel() {
        let channel = RecordingChannel::new();
        channel.post(&ParentMessage::ScormInitialize);
        assert_eq!(channel.drain().len(), 1);
        assert!(channel.messages().is_empty());
    }

    #[test]
    fn test_closure_channel() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let channel: Arc<dyn EmbeddingChannel> = Arc::new(move |_: &ParentMessage| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        channel.post(&ParentMessage::ScormInitialize);
        channel.post(&ParentMessage::ScormFinish);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
