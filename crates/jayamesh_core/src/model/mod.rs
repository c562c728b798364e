//! Domain model for projects and everything they own.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repositories.
//! - Own per-record validation rules shared by write paths and imports.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Timestamps are UTC with millisecond precision, matching storage.
//! - Hierarchy: Project -> Section -> {Goal, Task, Note}.

use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod focus;
pub mod goal;
pub mod note;
pub mod project;
pub mod section;
pub mod task;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"));

/// Lowest accepted priority value (most urgent).
pub const PRIORITY_MIN: u8 = 1;
/// Highest accepted priority value.
pub const PRIORITY_MAX: u8 = 5;

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Identifier is the nil UUID.
    NilId,
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Color is not `#rrggbb`.
    InvalidColor(String),
    /// Priority is outside `PRIORITY_MIN..=PRIORITY_MAX`.
    PriorityOutOfRange(u8),
    /// Goal target must be strictly positive.
    NonPositiveTarget(f64),
    /// Numeric field must not be negative.
    NegativeValue { field: &'static str, value: f64 },
    /// Focus level is outside `1..=5`.
    FocusLevelOutOfRange(u8),
    /// Session ended before it started.
    InvalidSessionWindow,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "id must not be nil"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidColor(value) => write!(f, "color `{value}` must be #rrggbb"),
            Self::PriorityOutOfRange(value) => write!(
                f,
                "priority {value} must be within {PRIORITY_MIN}..={PRIORITY_MAX}"
            ),
            Self::NonPositiveTarget(value) => write!(f, "goal target {value} must be > 0"),
            Self::NegativeValue { field, value } => {
                write!(f, "{field} ({value}) must not be negative")
            }
            Self::FocusLevelOutOfRange(value) => {
                write!(f, "focus level {value} must be within 1..=5")
            }
            Self::InvalidSessionWindow => write!(f, "session end must not precede its start"),
        }
    }
}

impl Error for ValidationError {}

/// Current time truncated to the millisecond precision used by storage.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub(crate) fn ensure_id(id: &uuid::Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::NilId);
    }
    Ok(())
}

pub(crate) fn ensure_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn ensure_color(value: &str) -> Result<(), ValidationError> {
    if !HEX_COLOR_RE.is_match(value) {
        return Err(ValidationError::InvalidColor(value.to_string()));
    }
    Ok(())
}

pub(crate) fn ensure_priority(value: u8) -> Result<(), ValidationError> {
    if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&value) {
        return Err(ValidationError::PriorityOutOfRange(value));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_color, ensure_priority, timestamp_now, ValidationError};

    #[test]
    fn color_accepts_hex_and_rejects_names() {
        assert!(ensure_color("#f59e0b").is_ok());
        assert_eq!(
            ensure_color("orange"),
            Err(ValidationError::InvalidColor("orange".to_string()))
        );
    }

    #[test]
    fn priority_bounds_are_inclusive() {
        assert!(ensure_priority(1).is_ok());
        assert!(ensure_priority(5).is_ok());
        assert!(ensure_priority(0).is_err());
        assert!(ensure_priority(6).is_err());
    }

    #[test]
    fn timestamp_now_has_millisecond_precision() {
        let now = timestamp_now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
