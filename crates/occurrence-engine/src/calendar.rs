//! The owned, mutable event set and its guarded write operations.
//!
//! Every write validates the incoming definition and checks it for conflicts
//! against the full event set before committing. A rejected write leaves the
//! set exactly as it was.

use chrono::NaiveDateTime;

use crate::conflict::find_conflicts;
use crate::error::{CalendarError, Result};
use crate::event::{EventDefinition, EventId, Occurrence};
use crate::search::{materialize, SearchFilter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    events: Vec<EventDefinition>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-stored event set. Stored events are trusted as-is.
    pub fn from_events(events: Vec<EventDefinition>) -> Self {
        Self { events }
    }

    pub fn definitions(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn into_events(self) -> Vec<EventDefinition> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &EventId) -> Option<&EventDefinition> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Match a user-typed id against the stored ids. An exact match wins;
    /// otherwise `42` and `"42"` are treated as the same id.
    pub fn resolve_id(&self, typed: &EventId) -> Option<EventId> {
        if self.get(typed).is_some() {
            return Some(typed.clone());
        }
        let alternate = match typed {
            EventId::Int(n) => EventId::Text(n.to_string()),
            EventId::Text(s) => EventId::Int(s.trim().parse().ok()?),
        };
        self.get(&alternate).map(|e| e.id.clone())
    }

    /// One past the largest integer id in use, starting at 1.
    pub fn next_id(&self) -> EventId {
        let max = self
            .events
            .iter()
            .filter_map(|e| match e.id {
                EventId::Int(n) => Some(n),
                EventId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        EventId::Int(max.saturating_add(1))
    }

    /// The display list: every definition expanded and filtered by `filter`.
    pub fn occurrences(&self, filter: &SearchFilter) -> Vec<Occurrence> {
        materialize(&self.events, filter)
    }

    /// Add a new event.
    ///
    /// # Errors
    /// - Validation errors from [`EventDefinition::validate`].
    /// - [`CalendarError::DuplicateId`] if the id is already taken.
    /// - [`CalendarError::Conflict`] if the event overlaps an existing one.
    pub fn create(&mut self, definition: EventDefinition) -> Result<&EventDefinition> {
        let definition = definition.normalized();
        definition.validate()?;
        if self.get(&definition.id).is_some() {
            return Err(CalendarError::DuplicateId(definition.id));
        }
        self.ensure_free(&definition)?;

        tracing::info!(id = %definition.id, title = %definition.title, "created event");
        self.events.push(definition);
        let last = self.events.len() - 1;
        Ok(&self.events[last])
    }

    /// Replace the stored event that has `definition.id`.
    ///
    /// # Errors
    /// - [`CalendarError::NotFound`] if no event has that id.
    /// - Validation and conflict errors as for [`Calendar::create`]; the
    ///   event's own previous instances never count as conflicts.
    pub fn update(&mut self, definition: EventDefinition) -> Result<&EventDefinition> {
        let definition = definition.normalized();
        let position = self.position(&definition.id)?;
        definition.validate()?;
        self.ensure_free(&definition)?;

        tracing::info!(id = %definition.id, "updated event");
        self.events[position] = definition;
        Ok(&self.events[position])
    }

    /// Reschedule an event to a new start and end, keeping everything else.
    ///
    /// # Errors
    /// Same as [`Calendar::update`].
    pub fn move_event(
        &mut self,
        id: &EventId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<&EventDefinition> {
        let position = self.position(id)?;
        let mut moved = self.events[position].clone();
        moved.start = start;
        moved.end = end;
        self.update(moved)
    }

    /// Remove an event and return it.
    ///
    /// # Errors
    /// [`CalendarError::NotFound`] if no event has that id.
    pub fn delete(&mut self, id: &EventId) -> Result<EventDefinition> {
        let position = self.position(id)?;
        tracing::info!(id = %id, "deleted event");
        Ok(self.events.remove(position))
    }

    fn position(&self, id: &EventId) -> Result<usize> {
        self.events
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| CalendarError::NotFound(id.clone()))
    }

    fn ensure_free(&self, candidate: &EventDefinition) -> Result<()> {
        match find_conflicts(candidate, &self.events).into_iter().next() {
            Some(conflict) => {
                tracing::debug!(
                    id = %candidate.id,
                    rival = %conflict.occurrence.key(),
                    overlap_minutes = conflict.overlap_minutes,
                    "rejected conflicting write"
                );
                Err(CalendarError::Conflict {
                    id: conflict.occurrence.event.id,
                    title: conflict.occurrence.event.title,
                })
            }
            None => Ok(()),
        }
    }
}
