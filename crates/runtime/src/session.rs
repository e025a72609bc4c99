//! Runtime session state.

use scormbridge_core::{CmiSnapshot, CmiStore, RuntimeConfig, SessionId, SlideNumber};

/// Position and lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Slide of the most recently resolved bookmark
    pub current_slide: SlideNumber,

    /// Furthest slide ever resolved; never decreases
    pub highest_slide_reached: SlideNumber,

    /// Between Initialize and Terminate
    pub initialized: bool,
}

/// Everything one launched course mutates: the data model and the session
/// counters.
#[derive(Debug, Clone)]
pub struct RuntimeSession {
    id: SessionId,
    store: CmiStore,
    state: SessionState,
}

impl Default for RuntimeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeSession {
    /// Create a session with a default store.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            store: CmiStore::new(),
            state: SessionState::default(),
        }
    }

    /// Create a session, seeding learner fields from configuration.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut session = Self::new();
        session
            .store
            .seed_learner(config.student_id.as_deref(), config.student_name.as_deref());
        session
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The data model.
    pub fn store(&self) -> &CmiStore {
        &self.store
    }

    /// The data model, mutably.
    pub fn store_mut(&mut self) -> &mut CmiStore {
        &mut self.store
    }

    /// Position and lifecycle.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Copy of the data model.
    pub fn snapshot(&self) -> CmiSnapshot {
        self.store.snapshot()
    }

    /// Mark the session initialized or not.
    pub fn set_initialized(&mut self, initialized: bool) {
        self.state.initialized = initialized;
    }

    /// Record a resolved bookmark.
    ///
    /// Zero carries no position and is ignored. Returns whether the position
    /// was recorded.
    pub fn record_slide(&mut self, slide: SlideNumber) -> bool {
        if slide == 0 {
            return false;
        }
        self.state.current_slide = slide;
        self.state.highest_slide_reached = self.state.highest_slide_reached.max(slide);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scormbridge_core::cmi::keys;

    #[test]
    fn test_new_session_defaults() {
        let session = RuntimeSession::new();
        assert_eq!(session.state(), SessionState::default());
        assert!(!session.state().initialized);
        assert_eq!(session.store().len(), 18);
    }

    #[test]
    fn test_watermark_never_decreases() {
        let mut session = RuntimeSession::new();
        for (slide, current, highest) in [(3, 3, 3), (7, 7, 7), (2, 2, 7), (7, 7, 7), (9, 9, 9), (1, 1, 9)] {
            assert!(session.record_slide(slide));
            assert_eq!(session.state().current_slide, current);
            assert_eq!(session.state().highest_slide_reached, highest);
        }
    }

    #[test]
    fn test_zero_slide_is_ignored() {
        let mut session = RuntimeSession::new();
        session.record_slide(4);
        assert!(!session.record_slide(0));
        assert_eq!(session.state().current_slide, 4);
        assert_eq!(session.state().highest_slide_reached, 4);
    }

    #[test]
    fn test_from_config_seeds_learner() {
        let config = RuntimeConfig {
            student_id: Some("jdoe".to_string()),
            student_name: Some("Doe, Jane".to_string()),
            ..Default::default()
        };
        let session = RuntimeSession::from_config(&config);
        assert_eq!(session.store().lookup(keys::CORE_STUDENT_ID), Some("jdoe"));
        assert_eq!(session.store().lookup(keys::CORE_STUDENT_NAME), Some("Doe, Jane"));
    }
}
