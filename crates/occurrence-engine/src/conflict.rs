//! Detect overlaps between a candidate time slot and an event set.
//!
//! The event set is expanded before comparison, so a candidate is checked against
//! every materialized instance of every recurring event. Adjacent intervals
//! (where one ends exactly when another starts) are NOT conflicts.

use chrono::NaiveDateTime;

use crate::event::{EventDefinition, EventId, Occurrence};
use crate::expander::expand_all;
use crate::search::{materialize, SearchFilter};

/// Anything with a half-open `[start, end)` interval that can take part in a
/// conflict check.
pub trait Span {
    /// Identifier used to exclude an event's own instances. `None` excludes nothing.
    fn id(&self) -> Option<&EventId>;
    fn start(&self) -> NaiveDateTime;
    fn end(&self) -> NaiveDateTime;
}

impl Span for EventDefinition {
    fn id(&self) -> Option<&EventId> {
        Some(&self.id)
    }

    fn start(&self) -> NaiveDateTime {
        self.start
    }

    fn end(&self) -> NaiveDateTime {
        self.end
    }
}

impl Span for Occurrence {
    fn id(&self) -> Option<&EventId> {
        Some(&self.event.id)
    }

    fn start(&self) -> NaiveDateTime {
        self.event.start
    }

    fn end(&self) -> NaiveDateTime {
        self.event.end
    }
}

/// A bare time slot, optionally on behalf of an existing event.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: Option<EventId>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: None,
            start,
            end,
        }
    }

    /// Treat the slot as a proposed new time for `id`, so that event's own
    /// instances are ignored.
    pub fn for_event(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }
}

impl Span for Slot {
    fn id(&self) -> Option<&EventId> {
        self.id.as_ref()
    }

    fn start(&self) -> NaiveDateTime {
        self.start
    }

    fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// A detected overlap between the candidate and one existing occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub occurrence: Occurrence,
    pub overlap_minutes: i64,
}

/// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Span + ?Sized,
    B: Span + ?Sized,
{
    a.start() < b.end() && b.start() < a.end()
}

fn is_rival<C: Span + ?Sized>(candidate: &C, occurrence: &Occurrence) -> bool {
    let same_event = candidate.id() == Some(occurrence.id());
    !same_event && overlaps(candidate, occurrence)
}

/// Whether `candidate` overlaps any instance of any definition other than its own.
///
/// Checks the full event set; an active search filter does not hide events
/// from conflict detection.
pub fn has_conflict<C: Span + ?Sized>(candidate: &C, definitions: &[EventDefinition]) -> bool {
    let found = expand_all(definitions)
        .iter()
        .any(|occurrence| is_rival(candidate, occurrence));
    tracing::debug!(
        start = %candidate.start(),
        end = %candidate.end(),
        conflict = found,
        "checked candidate slot"
    );
    found
}

/// Like [`has_conflict`], but only occurrences visible under `filter` count.
pub fn has_conflict_in_view<C: Span + ?Sized>(
    candidate: &C,
    definitions: &[EventDefinition],
    filter: &SearchFilter,
) -> bool {
    materialize(definitions, filter)
        .iter()
        .any(|occurrence| is_rival(candidate, occurrence))
}

/// Find every occurrence that overlaps `candidate`, in expansion order.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts<C: Span + ?Sized>(
    candidate: &C,
    definitions: &[EventDefinition],
) -> Vec<Conflict> {
    expand_all(definitions)
        .into_iter()
        .filter(|occurrence| is_rival(candidate, occurrence))
        .map(|occurrence| {
            let overlap_start = candidate.start().max(occurrence.start());
            let overlap_end = candidate.end().min(occurrence.end());
            Conflict {
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                occurrence,
            }
        })
        .collect()
}
