//! Bookmark parsing.
//!
//! Authoring tools disagree on what they store in `lesson_location`. This
//! module turns whatever string they chose into a best-guess slide number.

use regex::Regex;
use std::sync::OnceLock;

/// A slide number resolved from a bookmark. Zero means "no positional
/// information".
pub type SlideNumber = u32;

/// Bookmark conventions, tried in this order. The first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkFormat {
    /// `"5"`
    Plain,
    /// `"slide_5"`, `"Slide5"`
    Slide,
    /// `"m1s5"`: module 1, slide 5
    ModuleSlide,
    /// `"frame_5"`
    Frame,
}

struct Patterns {
    plain: Regex,
    slide: Regex,
    module_slide: Regex,
    frame: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        // ASCII digits only; `\d` would also accept other scripts
        plain: compile(r"^[0-9]+$"),
        slide: compile(r"(?i)slide_?([0-9]+)"),
        module_slide: compile(r"(?i)m[0-9]+s([0-9]+)"),
        frame: compile(r"(?i)frame_?([0-9]+)"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid built-in bookmark pattern")
}

/// Classify a bookmark and extract its digit group.
///
/// Returns the matching format and the raw digits, or `None` when no
/// convention applies.
pub fn classify(location: &str) -> Option<(BookmarkFormat, &str)> {
    if location.is_empty() {
        return None;
    }

    let p = patterns();
    if p.plain.is_match(location) {
        return Some((BookmarkFormat::Plain, location));
    }

    [
        (BookmarkFormat::Slide, &p.slide),
        (BookmarkFormat::ModuleSlide, &p.module_slide),
        (BookmarkFormat::Frame, &p.frame),
    ]
    .into_iter()
    .find_map(|(format, re)| {
        re.captures(location)
            .and_then(|c| c.get(1))
            .map(|m| (format, m.as_str()))
    })
}

/// Resolve a bookmark string to a slide number.
///
/// Never fails: empty, unrecognised, or out-of-range input yields 0.
pub fn parse_slide_number(location: &str) -> SlideNumber {
    classify(location)
        .and_then(|(_, digits)| digits.parse().ok())
        .unwrap_or(0)
}
