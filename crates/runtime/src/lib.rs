//! Run-time API emulation.
//!
//! The SCORM 1.2 and 2004 call surfaces course content talks to, built on the
//! CMI store and the progress notifier.

#![warn(missing_docs)]

pub mod api;
pub mod session;
pub mod scorm12;
pub mod scorm2004;
pub mod bootstrap;

pub use api::{ApiMethod, ApiStandard, RuntimeApi, API_VERSION, TRUE};
pub use session::{RuntimeSession, SessionState};
pub use scorm12::Scorm12Api;
pub use scorm2004::Scorm2004Api;
pub use bootstrap::{
    expose, find_api, ContextScope, ExecutionContext, ExposeError, ExposedApis, READY_MESSAGE,
};
