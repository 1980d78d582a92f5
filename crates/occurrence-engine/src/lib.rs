//! # occurrence-engine
//!
//! Bounded recurrence expansion and overlap detection for a personal event calendar.
//!
//! An [`EventDefinition`] is the compact, persisted form of an event: one
//! start/end pair plus a recurrence rule. The engine materializes it into at
//! most [`MAX_OCCURRENCES`] concrete [`Occurrence`]s and answers whether a
//! proposed time slot overlaps anything already on the calendar. All times are
//! naive local instants.
//!
//! ## Modules
//!
//! - [`event`] — definitions, occurrences, ids and recurrence kinds
//! - [`expander`] — definition → ordered list of occurrences
//! - [`conflict`] — detect overlaps between a candidate slot and the event set
//! - [`search`] — case-insensitive title/description display filter
//! - [`calendar`] — owned event set with validated, conflict-checked writes
//! - [`store`] — load/save collaborators (JSON file, in-memory)
//! - [`error`] — Error types

pub mod calendar;
pub mod conflict;
pub mod error;
pub mod event;
pub mod expander;
pub mod search;
pub mod store;

pub use calendar::Calendar;
pub use conflict::{find_conflicts, has_conflict, has_conflict_in_view, Conflict, Slot, Span};
pub use error::CalendarError;
pub use event::{parse_instant, EventDefinition, EventId, Occurrence, OccurrenceKey, Recurrence};
pub use expander::{expand, expand_all, MAX_OCCURRENCES};
pub use search::{materialize, SearchFilter};
pub use store::{load_or_empty, save_logged, EventStore, JsonFileStore, MemoryStore};
