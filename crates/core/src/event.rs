//! Outbound progress payloads and embedding-context messages.

use crate::cmi::CmiSnapshot;
use crate::location::SlideNumber;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Event-specific fields appended to a progress update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProgressExtra {
    /// Plain position update
    #[default]
    None,
    /// The session is terminating
    Finished,
    /// Content reported a completion status
    ContentCompleted,
    /// Content reported a score on a 0-100 scale. `None` when the reported
    /// value was not numeric.
    QuizScore(Option<f64>),
}

impl ProgressExtra {
    /// Render as payload fields.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            ProgressExtra::None => {}
            ProgressExtra::Finished => {
                fields.insert("finished".to_string(), Value::Bool(true));
            }
            ProgressExtra::ContentCompleted => {
                fields.insert("content_completed".to_string(), Value::Bool(true));
            }
            ProgressExtra::QuizScore(score) => {
                fields.insert("quiz_score".to_string(), score_value(score));
            }
        }
        fields
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Render a score. Whole numbers are emitted as integers (`75`, not `75.0`).
fn score_value(score: Option<f64>) -> Value {
    match score {
        Some(score) if score.fract() == 0.0 && score.abs() <= MAX_EXACT_INTEGER => {
            Value::from(score as i64)
        }
        Some(score) => serde_json::Number::from_f64(score)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        None => Value::Null,
    }
}

fn serialize_score<S: Serializer>(score: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    score_value(*score).serialize(serializer)
}

/// The update sent to both channels whenever tracked state changes.
///
/// Always carries the full store so a consumer that missed earlier updates
/// can rebuild state from the latest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Slide the update refers to
    pub current_slide: SlideNumber,

    /// Furthest slide ever reached
    pub highest_slide_reached: SlideNumber,

    /// `round(highest / total * 100)`, 0 when total is 0
    pub completion_percentage: u32,

    /// Slides in the course
    pub total_slides: u32,

    /// Copy of the whole data model
    pub scorm_data: CmiSnapshot,

    /// Event-specific fields (`finished`, `content_completed`, `quiz_score`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressUpdate {
    /// Build an update.
    pub fn new(
        current_slide: SlideNumber,
        highest_slide_reached: SlideNumber,
        total_slides: u32,
        scorm_data: CmiSnapshot,
        extra: ProgressExtra,
    ) -> Self {
        Self {
            current_slide,
            highest_slide_reached,
            completion_percentage: completion_percentage(highest_slide_reached, total_slides),
            total_slides,
            scorm_data,
            extra: extra.into_fields(),
        }
    }

    /// Whether this update marks the end of the session.
    pub fn is_finished(&self) -> bool {
        self.extra.get("finished") == Some(&Value::Bool(true))
    }

    /// Whether this update reports content completion.
    pub fn is_content_completed(&self) -> bool {
        self.extra.get("content_completed") == Some(&Value::Bool(true))
    }

    /// The reported quiz score, if this is a score update with a numeric value.
    pub fn quiz_score(&self) -> Option<f64> {
        self.extra.get("quiz_score").and_then(Value::as_f64)
    }
}

/// Completion percentage of a watermark, rounded half away from zero.
pub fn completion_percentage(highest: SlideNumber, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let percentage = (f64::from(highest) / f64::from(total) * 100.0).round();
    // Watermarks past the last slide exceed 100; saturate rather than wrap
    percentage.min(f64::from(u32::MAX)) as u32
}

/// A message posted to the embedding context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParentMessage {
    /// Mirrored log line
    #[serde(rename = "scormLog")]
    ScormLog {
        /// Log text
        message: String,
        /// Optional structured detail
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },

    /// Content called Initialize
    #[serde(rename = "scormInitialize")]
    ScormInitialize,

    /// A progress update
    #[serde(rename = "slideChange")]
    SlideChange {
        /// Slide the update refers to
        #[serde(rename = "slideNumber")]
        slide_number: SlideNumber,
        /// Furthest slide reached
        #[serde(rename = "highestSlideReached")]
        highest_slide_reached: SlideNumber,
        /// Full update payload
        data: ProgressUpdate,
    },

    /// Content called Terminate
    #[serde(rename = "scormFinish")]
    ScormFinish,

    /// Content reported completion
    #[serde(rename = "complete")]
    Complete {
        /// Always true
        completed: bool,
    },

    /// Content reported a score
    #[serde(rename = "quizScore")]
    QuizScore {
        /// Score on a 0-100 scale, null when not numeric
        #[serde(serialize_with = "serialize_score")]
        score: Option<f64>,
    },
}

impl ParentMessage {
    /// Create a log message.
    pub fn log(message: impl Into<String>, data: Option<Value>) -> Self {
        ParentMessage::ScormLog {
            message: message.into(),
            data,
        }
    }

    /// Create a slide-change message carrying an update.
    pub fn slide_change(update: ProgressUpdate) -> Self {
        ParentMessage::SlideChange {
            slide_number: update.current_slide,
            highest_slide_reached: update.highest_slide_reached,
            data: update,
        }
    }

    /// The message's `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ParentMessage::ScormLog { .. } => "scormLog",
            ParentMessage::ScormInitialize => "scormInitialize",
            ParentMessage::SlideChange { .. } => "slideChange",
            ParentMessage::ScormFinish => "scormFinish",
            ParentMessage::Complete { .. } => "complete",
            ParentMessage::QuizScore { .. } => "quizScore",
        }
    }
}
