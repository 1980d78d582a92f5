//! Error types for occurrence-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::event::EventId;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("End time must be after start time (start {start}, end {end})")]
    InvalidTimeRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Event title must not be empty")]
    EmptyTitle,

    #[error("Recurrence interval must be a positive integer, got {0}")]
    InvalidInterval(u32),

    #[error("Invalid weekday index {0} (expected 0=Sunday..6=Saturday)")]
    InvalidWeekday(u8),

    #[error("Invalid date-time: {0}")]
    InvalidInstant(String),

    #[error("Event conflict detected with \"{title}\" ({id}). Please choose a different time.")]
    Conflict { id: EventId, title: String },

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("An event with id {0} already exists")]
    DuplicateId(EventId),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed event data: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
