//! The CMI data model store.
//!
//! A fixed set of dotted field paths, covering both the 1.2 (`cmi.core.*`)
//! and 2004 (`cmi.*`) schema generations, mapped to string values. The key set
//! never grows: writes to unknown fields are recorded as errors and dropped.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known field paths.
pub mod keys {
    /// 1.2 bookmark
    pub const CORE_LESSON_LOCATION: &str = "cmi.core.lesson_location";
    /// 1.2 lesson status
    pub const CORE_LESSON_STATUS: &str = "cmi.core.lesson_status";
    /// 1.2 raw score
    pub const CORE_SCORE_RAW: &str = "cmi.core.score.raw";
    /// 1.2 minimum score
    pub const CORE_SCORE_MIN: &str = "cmi.core.score.min";
    /// 1.2 maximum score
    pub const CORE_SCORE_MAX: &str = "cmi.core.score.max";
    /// 1.2 session time
    pub const CORE_SESSION_TIME: &str = "cmi.core.session_time";
    /// 1.2 total time
    pub const CORE_TOTAL_TIME: &str = "cmi.core.total_time";
    /// Suspend data (shared)
    pub const SUSPEND_DATA: &str = "cmi.suspend_data";
    /// 1.2 exit mode
    pub const CORE_EXIT: &str = "cmi.core.exit";
    /// 1.2 entry mode
    pub const CORE_ENTRY: &str = "cmi.core.entry";
    /// 1.2 learner id
    pub const CORE_STUDENT_ID: &str = "cmi.core.student_id";
    /// 1.2 learner name
    pub const CORE_STUDENT_NAME: &str = "cmi.core.student_name";
    /// 2004 bookmark
    pub const LOCATION: &str = "cmi.location";
    /// 2004 completion status
    pub const COMPLETION_STATUS: &str = "cmi.completion_status";
    /// 2004 success status
    pub const SUCCESS_STATUS: &str = "cmi.success_status";
    /// 2004 scaled score (0..1)
    pub const SCORE_SCALED: &str = "cmi.score.scaled";
    /// 2004 raw score
    pub const SCORE_RAW: &str = "cmi.score.raw";
    /// 2004 progress measure
    pub const PROGRESS_MEASURE: &str = "cmi.progress_measure";
}

/// Initial contents of a fresh store.
pub const DEFAULT_FIELDS: [(&str, &str); 18] = [
    (keys::CORE_LESSON_LOCATION, ""),
    (keys::CORE_LESSON_STATUS, "not attempted"),
    (keys::CORE_SCORE_RAW, ""),
    (keys::CORE_SCORE_MIN, "0"),
    (keys::CORE_SCORE_MAX, "100"),
    (keys::CORE_SESSION_TIME, "0000:00:00"),
    (keys::CORE_TOTAL_TIME, "0000:00:00"),
    (keys::SUSPEND_DATA, ""),
    (keys::CORE_EXIT, ""),
    (keys::CORE_ENTRY, "ab-initio"),
    (keys::CORE_STUDENT_ID, ""),
    (keys::CORE_STUDENT_NAME, ""),
    (keys::LOCATION, ""),
    (keys::COMPLETION_STATUS, "not attempted"),
    (keys::SUCCESS_STATUS, "unknown"),
    (keys::SCORE_SCALED, ""),
    (keys::SCORE_RAW, ""),
    (keys::PROGRESS_MEASURE, ""),
];

/// An owned copy of every field, ordered by path.
pub type CmiSnapshot = BTreeMap<String, String>;

/// Which tracked concern a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedField {
    /// A bookmark (`lesson_location` / `location`)
    Bookmark,
    /// A completion status (`lesson_status` / `completion_status`)
    Status,
    /// A score already on a 0-100 scale
    RawScore,
    /// A score on a 0-1 scale
    ScaledScore,
}

impl TrackedField {
    /// Classify a field path. Untracked fields yield `None`.
    pub fn of(key: &str) -> Option<Self> {
        match key {
            keys::CORE_LESSON_LOCATION | keys::LOCATION => Some(Self::Bookmark),
            keys::CORE_LESSON_STATUS | keys::COMPLETION_STATUS => Some(Self::Status),
            keys::CORE_SCORE_RAW | keys::SCORE_RAW => Some(Self::RawScore),
            keys::SCORE_SCALED => Some(Self::ScaledScore),
            _ => None,
        }
    }
}

/// Status values that count as finishing the content.
pub fn is_completion_status(value: &str) -> bool {
    matches!(value, "completed" | "passed")
}

/// Read a score the way course content expects it to be read: leading
/// whitespace is skipped and the longest numeric prefix wins, so `"82"`,
/// `" 82.5pts"` and `"1e2"` all parse. `None` when no number leads the value.
pub fn parse_score(value: &str) -> Option<f64> {
    let text = value.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        let infinity = if text.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some(infinity);
    }

    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - fraction_start;
        end = fraction_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

/// The mutable data model plus the last-error register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmiStore {
    values: CmiSnapshot,
    last_error: ErrorCode,
}

impl Default for CmiStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CmiStore {
    /// Create a store holding the default field set.
    pub fn new() -> Self {
        Self {
            values: DEFAULT_FIELDS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            last_error: ErrorCode::NoError,
        }
    }

    /// Seed learner identity fields. `None` leaves a field untouched.
    pub fn seed_learner(&mut self, student_id: Option<&str>, student_name: Option<&str>) {
        if let Some(id) = student_id {
            self.values.insert(keys::CORE_STUDENT_ID.to_string(), id.to_string());
        }
        if let Some(name) = student_name {
            self.values.insert(keys::CORE_STUDENT_NAME.to_string(), name.to_string());
        }
    }

    /// Whether a field path is part of the data model.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Read a field without touching the error register.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Read a field.
    ///
    /// Unknown fields return an empty string and record
    /// [`ErrorCode::NotImplemented`].
    pub fn get(&mut self, key: &str) -> String {
        self.last_error = ErrorCode::NoError;
        match self.values.get(key) {
            Some(value) => value.clone(),
            None => {
                self.last_error = ErrorCode::NotImplemented;
                String::new()
            }
        }
    }

    /// Write a field.
    ///
    /// Known fields store the raw value unconditionally. Unknown fields record
    /// [`ErrorCode::NotImplemented`] and store nothing. Both report success.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        self.last_error = ErrorCode::NoError;
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value.to_string();
            }
            None => {
                self.last_error = ErrorCode::NotImplemented;
            }
        }
        true
    }

    /// The last recorded error.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    /// Clear the error register.
    pub fn clear_error(&mut self) {
        self.last_error = ErrorCode::NoError;
    }

    /// Copy every field.
    pub fn snapshot(&self) -> CmiSnapshot {
        self.values.clone()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; the field set is fixed and non-empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
