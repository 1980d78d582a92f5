//! Display filter over materialized occurrences.

use crate::event::{EventDefinition, Occurrence};
use crate::expander::expand_all;

/// Case-insensitive substring match against an occurrence's title or description.
/// An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    /// The filter that keeps every occurrence.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, occurrence: &Occurrence) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let event = &occurrence.event;
        event.title.to_lowercase().contains(&self.needle)
            || event
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&self.needle))
    }
}

/// Expand every definition, concatenate in definition order, and keep the
/// occurrences the filter matches.
pub fn materialize(definitions: &[EventDefinition], filter: &SearchFilter) -> Vec<Occurrence> {
    let mut occurrences = expand_all(definitions);
    occurrences.retain(|o| filter.matches(o));
    occurrences
}
