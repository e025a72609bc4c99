//! SCORM 1.2 run-time API (`API`).
//!
//! Owns the shared session and translates data-model writes into progress
//! notifications.

use crate::api::{ApiStandard, RuntimeApi, TRUE};
use crate::session::{RuntimeSession, SessionState};
use scormbridge_core::cmi::{is_completion_status, parse_score};
use scormbridge_core::{
    describe_error, parse_slide_number, CmiSnapshot, ParentMessage, ProgressExtra, RuntimeConfig,
    SessionId, SlideNumber, TrackedField,
};
use scormbridge_progress::{EmbeddingChannel, ProgressNotifier};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// The 1.2 API.
///
/// Cloning yields another handle onto the same session; the 2004 API holds
/// such a handle.
#[derive(Clone)]
pub struct Scorm12Api {
    session: Arc<Mutex<RuntimeSession>>,
    notifier: ProgressNotifier,
}

impl Scorm12Api {
    /// Create an API over a session.
    pub fn new(session: RuntimeSession, notifier: ProgressNotifier) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            notifier,
        }
    }

    /// Create an API from host configuration.
    pub fn from_config(config: &RuntimeConfig, channel: Option<Arc<dyn EmbeddingChannel>>) -> Self {
        let notifier = ProgressNotifier::from_config(config);
        let notifier = match channel {
            Some(channel) => notifier.with_channel(channel),
            None => notifier,
        };
        let session = RuntimeSession::from_config(config);
        debug!(
            "Created runtime session {} for course {}",
            session.id(),
            config.interactive_id.as_deref().unwrap_or("-")
        );
        Self::new(session, notifier)
    }

    fn session(&self) -> MutexGuard<'_, RuntimeSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The notifier used for outbound messages.
    pub fn notifier(&self) -> &ProgressNotifier {
        &self.notifier
    }

    /// Session identifier.
    pub fn session_id(&self) -> SessionId {
        self.session().id()
    }

    /// Position and lifecycle.
    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    /// Copy of the data model.
    pub fn snapshot(&self) -> CmiSnapshot {
        self.session().snapshot()
    }

    fn log(&self, message: &str, data: impl Into<Value>) {
        self.notifier.log(message, Some(data.into()));
    }

    /// Notify both consumers about `slide`. The session lock is released
    /// before any channel runs.
    fn notify(&self, slide: SlideNumber, extra: ProgressExtra) {
        let update = {
            let session = self.session();
            self.notifier.compose(
                slide,
                session.state().highest_slide_reached,
                session.snapshot(),
                extra,
            )
        };
        // Detached; the outcome is only logged.
        let _ = self.notifier.notify(update);
    }

    fn notify_current(&self, extra: ProgressExtra) {
        let slide = self.state().current_slide;
        self.notify(slide, extra);
    }

    /// `LMSInitialize`
    pub fn lms_initialize(&self, param: &str) -> String {
        self.log("LMSInitialize", param);
        {
            let mut session = self.session();
            session.set_initialized(true);
            session.store_mut().clear_error();
        }
        self.notifier.post(ParentMessage::ScormInitialize);
        TRUE.to_string()
    }

    /// `LMSFinish`
    pub fn lms_finish(&self, param: &str) -> String {
        self.log("LMSFinish", param);
        self.notify_current(ProgressExtra::Finished);
        self.notifier.post(ParentMessage::ScormFinish);
        self.session().set_initialized(false);
        TRUE.to_string()
    }

    /// `LMSGetValue`
    pub fn lms_get_value(&self, element: &str) -> String {
        self.log("LMSGetValue", element);
        self.session().store_mut().get(element)
    }

    /// `LMSSetValue`
    pub fn lms_set_value(&self, element: &str, value: &str) -> String {
        self.log("LMSSetValue", format!("{} = {}", element, value));
        self.session().store_mut().set(element, value);

        match TrackedField::of(element) {
            Some(TrackedField::Bookmark) => {
                let slide = parse_slide_number(value);
                let recorded = self.session().record_slide(slide);
                if recorded {
                    self.notify(slide, ProgressExtra::None);
                }
            }
            Some(TrackedField::Status) => {
                if is_completion_status(value) {
                    self.notify_current(ProgressExtra::ContentCompleted);
                    self.notifier.post(ParentMessage::Complete { completed: true });
                }
            }
            Some(field @ (TrackedField::RawScore | TrackedField::ScaledScore)) => {
                let mut score = parse_score(value);
                if field == TrackedField::ScaledScore {
                    score = score.map(|s| s * 100.0);
                }
                self.notify_current(ProgressExtra::QuizScore(score));
                self.notifier.post(ParentMessage::QuizScore { score });
            }
            None => {}
        }

        TRUE.to_string()
    }

    /// `LMSCommit`
    pub fn lms_commit(&self, param: &str) -> String {
        self.log("LMSCommit", param);
        self.notify_current(ProgressExtra::None);
        TRUE.to_string()
    }

    /// `LMSGetLastError`
    pub fn lms_get_last_error(&self) -> String {
        self.session().store().last_error().to_string()
    }

    /// `LMSGetErrorString`
    pub fn lms_get_error_string(&self, code: &str) -> String {
        describe_error(code).to_string()
    }

    /// `LMSGetDiagnostic`
    pub fn lms_get_diagnostic(&self, code: &str) -> String {
        self.lms_get_error_string(code)
    }
}

impl RuntimeApi for Scorm12Api {
    fn standard(&self) -> ApiStandard {
        ApiStandard::Scorm12
    }

    fn initialize(&self, param: &str) -> String {
        self.lms_initialize(param)
    }

    fn terminate(&self, param: &str) -> String {
        self.lms_finish(param)
    }

    fn get_value(&self, element: &str) -> String {
        self.lms_get_value(element)
    }

    fn set_value(&self, element: &str, value: &str) -> String {
        self.lms_set_value(element, value)
    }

    fn commit(&self, param: &str) -> String {
        self.lms_commit(param)
    }

    fn get_last_error(&self) -> String {
        self.lms_get_last_error()
    }

    fn get_error_string(&self, code: &str) -> String {
        self.lms_get_error_string(code)
    }

    fn get_diagnostic(&self, code: &str) -> String {
        self.lms_get_diagnostic(code)
    }
}
