//! SCORM 2004 run-time API (`API_1484_11`).
//!
//! A renaming adapter over [`Scorm12Api`]: every call is forwarded unchanged,
//! so both generations share one session and emit identical notifications.

use crate::api::{ApiStandard, RuntimeApi};
use crate::scorm12::Scorm12Api;

/// The 2004 API.
#[derive(Clone)]
pub struct Scorm2004Api {
    api: Scorm12Api,
}

impl Scorm2004Api {
    /// Create an adapter sharing `api`'s session.
    pub fn new(api: &Scorm12Api) -> Self {
        Self { api: api.clone() }
    }

    /// The underlying 1.2 API.
    pub fn inner(&self) -> &Scorm12Api {
        &self.api
    }
}

impl RuntimeApi for Scorm2004Api {
    fn standard(&self) -> ApiStandard {
        ApiStandard::Scorm2004
    }

    fn initialize(&self, param: &str) -> String {
        self.api.lms_initialize(param)
    }

    fn terminate(&self, param: &str) -> String {
        self.api.lms_finish(param)
    }

    fn get_value(&self, element: &str) -> String {
        self.api.lms_get_value(element)
    }

    fn set_value(&self, element: &str, value: &str) -> String {
        self.api.lms_set_value(element, value)
    }

    fn commit(&self, param: &str) -> String {
        self.api.lms_commit(param)
    }

    fn get_last_error(&self) -> String {
        self.api.lms_get_last_error()
    }

    fn get_error_string(&self, code: &str) -> String {
        self.api.lms_get_error_string(code)
    }

    fn get_diagnostic(&self, code: &str) -> String {
        self.api.lms_get_diagnostic(code)
    }
}
