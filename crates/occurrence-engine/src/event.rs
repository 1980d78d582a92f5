//! Event records: the persisted [`EventDefinition`] and the derived [`Occurrence`].
//!
//! All instants are naive local date-times. On the wire they are ISO-8601
//! strings (`2024-06-03T09:00:00`); RFC 3339 strings with an offset are also
//! accepted on load and keep their written wall-clock time.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CalendarError;

const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Stable identifier of an event definition. Stored data may use either
/// integers or strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Int(n) => write!(f, "{n}"),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EventId {
    fn from(n: i64) -> Self {
        EventId::Int(n)
    }
}

impl From<i32> for EventId {
    fn from(n: i32) -> Self {
        EventId::Int(i64::from(n))
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        EventId::Text(s.to_string())
    }
}

impl FromStr for EventId {
    type Err = Infallible;

    /// Integers parse as [`EventId::Int`], anything else is kept as text.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(raw
            .parse::<i64>()
            .map(EventId::Int)
            .unwrap_or_else(|_| EventId::Text(raw.to_string())))
    }
}

/// How an event repeats.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    /// Every `recurrence_interval` weeks.
    Custom,
    /// A value this engine does not know. Kept verbatim so it survives a
    /// load/save cycle; expands like [`Recurrence::None`].
    Unrecognized(String),
}

impl Recurrence {
    /// Case-insensitive parse. Empty input means `None`; unknown input is
    /// preserved as [`Recurrence::Unrecognized`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Recurrence::None,
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            "monthly" => Recurrence::Monthly,
            "custom" => Recurrence::Custom,
            _ => Recurrence::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Custom => "custom",
            Recurrence::Unrecognized(raw) => raw,
        }
    }

    /// Whether expansion produces more than the single pass-through instance.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None | Recurrence::Unrecognized(_))
    }
}

impl FromStr for Recurrence {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Recurrence::parse(raw))
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|r| Recurrence::parse(&r)).unwrap_or_default())
    }
}

fn default_interval() -> u32 {
    1
}

/// The persisted source of truth for one calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub id: EventId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "instant")]
    pub start: NaiveDateTime,
    #[serde(with = "instant")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Step multiplier for weekly, monthly and custom cadences.
    #[serde(default = "default_interval")]
    pub recurrence_interval: u32,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday. Only read for weekly rules.
    #[serde(default)]
    pub recurrence_days: Vec<u8>,
}

impl EventDefinition {
    /// A non-recurring event.
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            start,
            end,
            recurrence: Recurrence::None,
            recurrence_interval: 1,
            recurrence_days: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence, interval: u32) -> Self {
        self.recurrence = recurrence;
        self.recurrence_interval = interval;
        self
    }

    pub fn with_days(mut self, days: Vec<u8>) -> Self {
        self.recurrence_days = days;
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check the invariants a definition must satisfy before it is stored.
    ///
    /// # Errors
    /// - [`CalendarError::EmptyTitle`] for a blank title.
    /// - [`CalendarError::InvalidTimeRange`] when `end <= start`.
    /// - [`CalendarError::InvalidInterval`] for a zero interval on a recurring event.
    /// - [`CalendarError::InvalidWeekday`] for a weekly day index outside 0..=6.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.title.trim().is_empty() {
            return Err(CalendarError::EmptyTitle);
        }
        if self.end <= self.start {
            return Err(CalendarError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.recurrence.is_recurring() && self.recurrence_interval == 0 {
            return Err(CalendarError::InvalidInterval(self.recurrence_interval));
        }
        if self.recurrence == Recurrence::Weekly {
            if let Some(&bad) = self.recurrence_days.iter().find(|&&d| d > 6) {
                return Err(CalendarError::InvalidWeekday(bad));
            }
        }
        Ok(())
    }

    /// Drop weekday selections that only weekly rules use.
    pub fn normalized(mut self) -> Self {
        if self.recurrence != Recurrence::Weekly {
            self.recurrence_days.clear();
        }
        self
    }
}

/// Unambiguous address of one materialized instance: the parent id plus the
/// instance's position in the expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub id: EventId,
    pub index: usize,
}

impl fmt::Display for OccurrenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.index)
    }
}

/// One concrete instance of an [`EventDefinition`]. Never persisted.
///
/// `event` is a copy of the parent with `start`/`end` replaced, so every
/// instance of a recurring event carries the parent's id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    #[serde(flatten)]
    pub event: EventDefinition,
    pub is_recurring: bool,
    pub index: usize,
}

impl Occurrence {
    pub fn id(&self) -> &EventId {
        &self.event.id
    }

    pub fn start(&self) -> NaiveDateTime {
        self.event.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.event.end
    }

    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey {
            id: self.event.id.clone(),
            index: self.index,
        }
    }
}

/// Parse a user- or storage-supplied instant.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS[.fff]]` (a space may replace the `T`), RFC 3339
/// with an offset (the written wall-clock time is kept), and a bare date
/// (midnight).
///
/// # Errors
/// Returns [`CalendarError::InvalidInstant`] when no format matches.
pub fn parse_instant(raw: &str) -> crate::error::Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(CalendarError::InvalidInstant(raw.to_string()))
}

mod instant {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.format(super::INSTANT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw).map_err(serde::de::Error::custom)
    }
}
