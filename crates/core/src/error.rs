//! Run-time error codes reported to course content.
//!
//! The code set is closed and shared by both API generations. Only
//! [`ErrorCode::NoError`] and [`ErrorCode::NotImplemented`] are produced by the
//! data model today; the rest exist so lookups report them correctly.

use serde::{Deserialize, Serialize};

/// A standardized run-time error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
    /// 0
    #[default]
    NoError,
    /// 101
    GeneralException,
    /// 201
    InvalidArgument,
    /// 202
    ElementCannotHaveChildren,
    /// 203
    ElementNotAnArray,
    /// 301
    NotInitialized,
    /// 401
    NotImplemented,
    /// 402
    InvalidSetValue,
    /// 403
    ReadOnlyElement,
    /// 404
    WriteOnlyElement,
    /// 405
    IncorrectDataType,
}

impl ErrorCode {
    /// Every known code, in ascending numeric order.
    pub const ALL: [ErrorCode; 11] = [
        ErrorCode::NoError,
        ErrorCode::GeneralException,
        ErrorCode::InvalidArgument,
        ErrorCode::ElementCannotHaveChildren,
        ErrorCode::ElementNotAnArray,
        ErrorCode::NotInitialized,
        ErrorCode::NotImplemented,
        ErrorCode::InvalidSetValue,
        ErrorCode::ReadOnlyElement,
        ErrorCode::WriteOnlyElement,
        ErrorCode::IncorrectDataType,
    ];

    /// Numeric value of the code.
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::NoError => 0,
            ErrorCode::GeneralException => 101,
            ErrorCode::InvalidArgument => 201,
            ErrorCode::ElementCannotHaveChildren => 202,
            ErrorCode::ElementNotAnArray => 203,
            ErrorCode::NotInitialized => 301,
            ErrorCode::NotImplemented => 401,
            ErrorCode::InvalidSetValue => 402,
            ErrorCode::ReadOnlyElement => 403,
            ErrorCode::WriteOnlyElement => 404,
            ErrorCode::IncorrectDataType => 405,
        }
    }

    /// Look up a code by its numeric value.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Human-readable description.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::NoError => "No error",
            ErrorCode::GeneralException => "General exception",
            ErrorCode::InvalidArgument => "Invalid argument error",
            ErrorCode::ElementCannotHaveChildren => "Element cannot have children",
            ErrorCode::ElementNotAnArray => "Element not an array",
            ErrorCode::NotInitialized => "Not initialized",
            ErrorCode::NotImplemented => "Not implemented error",
            ErrorCode::InvalidSetValue => "Invalid set value",
            ErrorCode::ReadOnlyElement => "Element is read only",
            ErrorCode::WriteOnlyElement => "Element is write only",
            ErrorCode::IncorrectDataType => "Incorrect data type",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or_else(|| format!("unknown error code {}", value))
    }
}

/// Text returned for codes outside the closed set.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Describe an error code as passed in by course content.
///
/// Content hands the code back as a string (usually whatever
/// `GetLastError` returned); anything that is not exactly a known code maps
/// to [`UNKNOWN_ERROR`].
pub fn describe(code: &str) -> &'static str {
    code.parse::<u16>()
        .ok()
        .filter(|n| n.to_string() == code)
        .and_then(ErrorCode::from_code)
        .map(ErrorCode::message)
        .unwrap_or(UNKNOWN_ERROR)
}
