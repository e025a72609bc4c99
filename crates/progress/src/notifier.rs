//! Progress notification service.
//!
//! Fans every progress update out to two independent consumers: the
//! embedding context (synchronously, for a responsive UI) and the remote sink
//! (as a detached task whose outcome is only logged).

use crate::channel::EmbeddingChannel;
use crate::sink::{HttpProgressSink, ProgressSink};
use scormbridge_core::{
    CmiSnapshot, ParentMessage, ProgressExtra, ProgressUpdate, RuntimeConfig, SlideNumber,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Mirrors runtime log lines to `tracing` and the embedding context.
#[derive(Clone, Default)]
pub struct RuntimeLog {
    channel: Option<Arc<dyn EmbeddingChannel>>,
    debug: bool,
}

impl RuntimeLog {
    /// Log a line. It is always posted to the embedding context and also
    /// written through `tracing` when debug logging is on.
    pub fn log(&self, message: &str, data: Option<Value>) {
        if self.debug {
            match &data {
                Some(data) => info!(target: "scorm_api", "{} {}", message, data),
                None => info!(target: "scorm_api", "{}", message),
            }
        }
        if let Some(channel) = &self.channel {
            channel.post(&ParentMessage::log(message, data));
        }
    }
}

/// Service that dispatches progress updates.
#[derive(Clone)]
pub struct ProgressNotifier {
    /// Embedding context, if any
    channel: Option<Arc<dyn EmbeddingChannel>>,

    /// Remote sink, if configured
    sink: Option<Arc<dyn ProgressSink>>,

    /// Slides in the course
    total_slides: u32,

    /// Mirror log lines through `tracing`
    debug: bool,
}

impl ProgressNotifier {
    /// Create a notifier with no channels.
    pub fn new(total_slides: u32) -> Self {
        Self {
            channel: None,
            sink: None,
            total_slides,
            debug: false,
        }
    }

    /// Create a notifier from host configuration, using an HTTP sink when a
    /// progress URL is configured.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let notifier = Self::new(config.total_slides).with_debug(config.debug);
        match HttpProgressSink::from_config(config) {
            Some(sink) => notifier.with_sink(Arc::new(sink)),
            None => notifier,
        }
    }

    /// Attach the embedding-context channel.
    pub fn with_channel(mut self, channel: Arc<dyn EmbeddingChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Attach the remote sink.
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Enable or disable debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Slides in the course.
    pub fn total_slides(&self) -> u32 {
        self.total_slides
    }

    /// Whether a remote sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// The log mirror bound to this notifier's channel.
    pub fn runtime_log(&self) -> RuntimeLog {
        RuntimeLog {
            channel: self.channel.clone(),
            debug: self.debug,
        }
    }

    /// Log a runtime line.
    pub fn log(&self, message: &str, data: Option<Value>) {
        self.runtime_log().log(message, data);
    }

    /// Post a message to the embedding context. Skipped silently when there
    /// is none.
    pub fn post(&self, message: ParentMessage) {
        if let Some(channel) = &self.channel {
            channel.post(&message);
        }
    }

    /// Build an update for the current state.
    pub fn compose(
        &self,
        slide_number: SlideNumber,
        highest_slide_reached: SlideNumber,
        scorm_data: CmiSnapshot,
        extra: ProgressExtra,
    ) -> ProgressUpdate {
        ProgressUpdate::new(
            slide_number,
            highest_slide_reached,
            self.total_slides,
            scorm_data,
            extra,
        )
    }

    /// Dispatch an update to both consumers.
    ///
    /// The embedding context receives a `slideChange` before this returns.
    /// The remote send runs detached; the returned handle may be dropped
    /// without cancelling it.
    pub fn notify(&self, update: ProgressUpdate) -> Option<JoinHandle<()>> {
        if self.channel.is_some() {
            self.post(ParentMessage::slide_change(update.clone()));
        }

        let Some(sink) = self.sink.clone() else {
            self.log("No progress URL configured", None);
            return None;
        };

        let log = self.runtime_log();
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    "No async runtime available, progress update for slide {} dropped",
                    update.current_slide
                );
                log.log(
                    "Progress save failed",
                    Some(Value::String("no async runtime".to_string())),
                );
                return None;
            }
        };

        Some(handle.spawn(async move {
            match sink.send(&update).await {
                Ok(ack) => {
                    debug!("Progress saved for slide {}", update.current_slide);
                    log.log("Progress saved", Some(ack));
                }
                Err(e) => {
                    warn!("Progress save failed for slide {}: {}", update.current_slide, e);
                    log.log("Progress save failed", Some(Value::String(e.to_string())));
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::RecordingChannel;
    use crate::sink::SinkError;
    use async_trait::async_trait;
    use scormbridge_core::CmiStore;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockSink {
        sent: Mutex<Vec<ProgressUpdate>>,
        fail: bool,
    }

    impl MockSink {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn sent(&self) -> Vec<ProgressUpdate> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgressSink for MockSink {
        async fn send(&self, update: &ProgressUpdate) -> Result<Value, SinkError> {
            self.sent.lock().unwrap().push(update.clone());
            if self.fail {
                Err(SinkError::Rejected("503 Service Unavailable".to_string()))
            } else {
                Ok(json!({ "status": "ok" }))
            }
        }
    }

    fn update(notifier: &ProgressNotifier, slide: SlideNumber, extra: ProgressExtra) -> ProgressUpdate {
        notifier.compose(slide, slide, CmiStore::new().snapshot(), extra)
    }

    #[tokio::test]
    async fn test_parent_first_then_remote() {
        let channel = Arc::new(RecordingChannel::new());
        let sink = MockSink::new(false);
        let notifier = ProgressNotifier::new(10)
            .with_channel(channel.clone())
            .with_sink(sink.clone());

        let handle = notifier.notify(update(&notifier, 3, ProgressExtra::None));

        // The parent already has the update, the remote send has not run yet
        assert_eq!(channel.kinds(), vec!["slideChange"]);

        handle.unwrap().await.unwrap();
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].current_slide, 3);
        assert_eq!(sent[0].completion_percentage, 30);

        let messages = channel.messages();
        assert_eq!(
            messages[1],
            ParentMessage::log("Progress saved", Some(json!({ "status": "ok" })))
        );
    }

    #[tokio::test]
    async fn test_remote_failure_is_only_logged() {
        let channel = Arc::new(RecordingChannel::new());
        let notifier = ProgressNotifier::new(4)
            .with_channel(channel.clone())
            .with_sink(MockSink::new(true));

        notifier
            .notify(update(&notifier, 1, ProgressExtra::Finished))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            channel.messages().last(),
            Some(&ParentMessage::log(
                "Progress save failed",
                Some(json!("rejected: 503 Service Unavailable"))
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_sink_still_reaches_parent() {
        let channel = Arc::new(RecordingChannel::new());
        let notifier = ProgressNotifier::new(4).with_channel(channel.clone());

        assert!(notifier.notify(update(&notifier, 2, ProgressExtra::None)).is_none());
        assert_eq!(
            channel.messages(),
            vec![
                ParentMessage::slide_change(update(&notifier, 2, ProgressExtra::None)),
                ParentMessage::log("No progress URL configured", None),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_channel_still_reaches_sink() {
        let sink = MockSink::new(false);
        let notifier = ProgressNotifier::new(4).with_sink(sink.clone());

        notifier
            .notify(update(&notifier, 2, ProgressExtra::ContentCompleted))
            .unwrap()
            .await
            .unwrap();

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].is_content_completed());
    }

    #[test]
    fn test_no_runtime_drops_remote_send() {
        let channel = Arc::new(RecordingChannel::new());
        let sink = MockSink::new(false);
        let notifier = ProgressNotifier::new(4)
            .with_channel(channel.clone())
            .with_sink(sink.clone());

        assert!(notifier.notify(update(&notifier, 1, ProgressExtra::None)).is_none());
        assert!(sink.sent().is_empty());
        assert_eq!(channel.kinds(), vec!["slideChange", "scormLog"]);
    }

    #[test]
    fn test_from_config() {
        let notifier = ProgressNotifier::from_config(&RuntimeConfig::default().with_total_slides(9));
        assert_eq!(notifier.total_slides(), 9);
        assert!(!notifier.has_sink());

        let config = RuntimeConfig::default().with_progress_url("http://lms.local/progress/");
        assert!(ProgressNotifier::from_config(&config).has_sink());
    }

    /// In-memory log output.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a subscriber and return what it logged.
    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_debug_log_is_written_through_tracing() {
        let channel = Arc::new(RecordingChannel::new());
        let notifier = ProgressNotifier::new(1)
            .with_channel(channel.clone())
            .with_debug(true);

        let output = capture_logs(|| {
            notifier.log("LMSSetValue", Some(json!("cmi.suspend_data = x")));
        });

        assert!(output.contains("INFO"));
        assert!(output.contains("scorm_api"));
        assert!(output.contains("LMSSetValue \"cmi.suspend_data = x\""));
        assert_eq!(channel.kinds(), vec!["scormLog"]);
    }

    #[test]
    fn test_log_is_quiet_without_debug() {
        let channel = Arc::new(RecordingChannel::new());
        let notifier = ProgressNotifier::new(1).with_channel(channel.clone());

        let output = capture_logs(|| notifier.log("LMSInitialize", Some(json!(""))));

        assert!(output.is_empty());
        // Still mirrored to the embedding context
        assert_eq!(channel.kinds(), vec!["scormLog"]);
    }

    #[test]
    fn test_log_without_channel_is_silent() {
        let notifier = ProgressNotifier::new(0).with_debug(true);
        notifier.log("LMSInitialize", Some(json!("")));
        notifier.post(ParentMessage::ScormInitialize);
    }
}
