//! ScormBridge core data models.
//!
//! This crate defines the run-time data model emulated for course content:
//! the CMI store, error codes, bookmark parsing, and the payloads sent to
//! progress observers.

#![warn(missing_docs)]

// Identities
mod id;

// Data model
pub mod cmi;
mod error;
pub mod location;

// Outbound payloads
mod event;

// Host configuration
mod config;

// Re-exports
pub use id::SessionId;

pub use cmi::{CmiSnapshot, CmiStore, TrackedField};
pub use error::{describe as describe_error, ErrorCode, UNKNOWN_ERROR};
pub use location::{parse_slide_number, BookmarkFormat, SlideNumber};

pub use event::{completion_percentage, ParentMessage, ProgressExtra, ProgressUpdate};

pub use config::{ConfigError, RuntimeConfig};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
