//! Progress Notification
//!
//! Embedding-context messages, remote progress sinks, and the notifier that
//! fans updates out to both.

#![warn(missing_docs)]

pub mod channel;
pub mod sink;
pub mod notifier;

pub use channel::{EmbeddingChannel, RecordedMessage, RecordingChannel};
pub use sink::{HttpProgressSink, ProgressSink, SinkError, CSRF_HEADER};
pub use notifier::{ProgressNotifier, RuntimeLog};
