//! Persistence collaborators for the event set.
//!
//! The store format is the serialized [`EventDefinition`] list as a JSON array.
//! The engine itself never calls a store; hosts load before and save after
//! working with a [`crate::Calendar`].

use std::cell::RefCell;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::event::EventDefinition;

/// Load and save the full event set.
pub trait EventStore {
    /// # Errors
    /// Returns an error when the backing data cannot be read or is malformed.
    fn load(&self) -> Result<Vec<EventDefinition>>;

    /// # Errors
    /// Returns an error when the event set cannot be written.
    fn save(&self, events: &[EventDefinition]) -> Result<()>;

    /// Keep a copy of backing data that failed to load, so a later save
    /// cannot destroy it. Returns where the copy went, if one was made.
    ///
    /// # Errors
    /// Returns an error when the copy cannot be written.
    fn preserve_unreadable(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// A pretty-printed JSON array on disk. A missing file loads as an empty set.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<path>.bak`, next to the store file.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }
}

impl EventStore for JsonFileStore {
    fn load(&self) -> Result<Vec<EventDefinition>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, events: &[EventDefinition]) -> Result<()> {
        let json = serde_json::to_string_pretty(events)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn preserve_unreadable(&self) -> Result<Option<PathBuf>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let backup = self.backup_path();
        std::fs::copy(&self.path, &backup)?;
        Ok(Some(backup))
    }
}

/// An in-process store, useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RefCell<Vec<EventDefinition>>,
}

impl MemoryStore {
    pub fn new(events: Vec<EventDefinition>) -> Self {
        Self {
            events: RefCell::new(events),
        }
    }
}

impl EventStore for MemoryStore {
    fn load(&self) -> Result<Vec<EventDefinition>> {
        Ok(self.events.borrow().clone())
    }

    fn save(&self, events: &[EventDefinition]) -> Result<()> {
        *self.events.borrow_mut() = events.to_vec();
        Ok(())
    }
}

/// Load the event set, falling back to an empty set (and logging) on any failure.
///
/// Unreadable data is copied aside first via [`EventStore::preserve_unreadable`].
pub fn load_or_empty<S: EventStore + ?Sized>(store: &S) -> Vec<EventDefinition> {
    match store.load() {
        Ok(events) => {
            tracing::debug!(count = events.len(), "loaded events");
            events
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load events, starting with an empty calendar");
            match store.preserve_unreadable() {
                Ok(Some(backup)) => {
                    tracing::warn!(backup = %backup.display(), "kept a copy of the unreadable events");
                }
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "failed to keep a copy of the unreadable events"),
            }
            Vec::new()
        }
    }
}

/// Save the event set, logging instead of propagating a failure.
///
/// Returns whether the write succeeded.
pub fn save_logged<S: EventStore + ?Sized>(store: &S, events: &[EventDefinition]) -> bool {
    match store.save(events) {
        Ok(()) => {
            tracing::debug!(count = events.len(), "saved events");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to save events");
            false
        }
    }
}
