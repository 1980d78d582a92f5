//! `calendar` CLI — manage a local event calendar from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Add a weekly event on Mondays and Wednesdays
//! calendar add --title "Gym" --start 2024-06-03T18:00 --end 2024-06-03T19:00 \
//!     --recurrence weekly --days 1,3
//!
//! # List all occurrences in June matching "gym"
//! calendar list --search gym --from 2024-06-01 --to 2024-06-30
//!
//! # Drag-reschedule an event
//! calendar move 1 --start 2024-06-03T19:00 --end 2024-06-03T20:00
//!
//! # Ask whether a slot is free
//! calendar check --start 2024-06-05T18:30 --end 2024-06-05T19:30
//! ```
//!
//! Events are stored as a JSON array at `--store` (or `$CALENDAR_STORE`).

use std::io::IsTerminal;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use occurrence_engine::{
    has_conflict, load_or_empty, parse_instant, save_logged, Calendar, EventDefinition, EventId,
    JsonFileStore, Occurrence, Recurrence, SearchFilter, Slot,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calendar", version, about = "Personal event calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path of the JSON event store
    #[arg(long, env = "CALENDAR_STORE", default_value = "calendar_events.json", global = true)]
    store: String,

    /// Log filter (e.g. "warn", "occurrence_engine=debug")
    #[arg(long, env = "CALENDAR_LOG", default_value = "warn", global = true)]
    log: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List materialized occurrences, sorted by start
    List {
        /// Only show occurrences whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// First day to show (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to show (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Print occurrences as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a new event and print its id
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = instant)]
        start: NaiveDateTime,
        #[arg(long, value_parser = instant)]
        end: NaiveDateTime,
        #[command(flatten)]
        details: Details,
    },
    /// Edit an existing event; omitted fields keep their value
    Edit {
        #[arg(value_parser = event_id)]
        id: EventId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = instant)]
        start: Option<NaiveDateTime>,
        #[arg(long, value_parser = instant)]
        end: Option<NaiveDateTime>,
        #[command(flatten)]
        details: Details,
    },
    /// Move an event to a new time slot
    Move {
        #[arg(value_parser = event_id)]
        id: EventId,
        #[arg(long, value_parser = instant)]
        start: NaiveDateTime,
        #[arg(long, value_parser = instant)]
        end: NaiveDateTime,
    },
    /// Delete an event
    Delete {
        #[arg(value_parser = event_id)]
        id: EventId,
    },
    /// Report whether a time slot is free
    Check {
        #[arg(long, value_parser = instant)]
        start: NaiveDateTime,
        #[arg(long, value_parser = instant)]
        end: NaiveDateTime,
        /// Check on behalf of this event, ignoring its own occurrences
        #[arg(long, value_parser = event_id)]
        id: Option<EventId>,
    },
}

#[derive(Args)]
struct Details {
    #[arg(long)]
    description: Option<String>,
    /// none, daily, weekly, monthly or custom (every N weeks)
    #[arg(long)]
    recurrence: Option<Recurrence>,
    /// Repeat every N weeks/months
    #[arg(long)]
    interval: Option<u32>,
    /// Weekday indices for weekly events, 0=Sunday..6=Saturday (e.g. 1,3)
    #[arg(long, value_delimiter = ',')]
    days: Option<Vec<u8>>,
}

impl Details {
    fn apply(self, mut event: EventDefinition) -> EventDefinition {
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(recurrence) = self.recurrence {
            event.recurrence = recurrence;
        }
        if let Some(interval) = self.interval {
            event.recurrence_interval = interval;
        }
        if let Some(days) = self.days {
            event.recurrence_days = days;
        }
        event
    }
}

fn instant(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_instant(raw).map_err(|e| e.to_string())
}

/// Integers become [`EventId::Int`], so ids created by `add` are found.
fn event_id(raw: &str) -> std::result::Result<EventId, String> {
    raw.parse::<EventId>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let store = JsonFileStore::new(&cli.store);
    let mut calendar = Calendar::from_events(load_or_empty(&store));
    tracing::debug!(store = %cli.store, events = calendar.len(), "opened calendar");

    match cli.command {
        Commands::List {
            search,
            from,
            to,
            json,
        } => {
            let filter = SearchFilter::new(search.as_deref().unwrap_or(""));
            let occurrences = visible(calendar.occurrences(&filter), from, to);
            if json {
                println!("{}", serde_json::to_string_pretty(&occurrences)?);
            } else {
                for occurrence in &occurrences {
                    println!("{}", describe(occurrence));
                }
            }
        }
        Commands::Add {
            title,
            start,
            end,
            details,
        } => {
            let id = calendar.next_id();
            let event = details.apply(EventDefinition::new(id, title, start, end));
            let created = calendar.create(event).context("Failed to add event")?;
            println!("{}", created.id);
            save_logged(&store, calendar.definitions());
        }
        Commands::Edit {
            id,
            title,
            start,
            end,
            details,
        } => {
            let id = calendar.resolve_id(&id).unwrap_or(id);
            let mut event = calendar
                .get(&id)
                .cloned()
                .with_context(|| format!("Event not found: {id}"))?;
            if let Some(title) = title {
                event.title = title;
            }
            if let Some(start) = start {
                event.start = start;
            }
            if let Some(end) = end {
                event.end = end;
            }
            calendar
                .update(details.apply(event))
                .context("Failed to edit event")?;
            save_logged(&store, calendar.definitions());
        }
        Commands::Move { id, start, end } => {
            let id = calendar.resolve_id(&id).unwrap_or(id);
            calendar
                .move_event(&id, start, end)
                .context("Failed to move event")?;
            save_logged(&store, calendar.definitions());
        }
        Commands::Delete { id } => {
            let id = calendar.resolve_id(&id).unwrap_or(id);
            calendar.delete(&id).context("Failed to delete event")?;
            save_logged(&store, calendar.definitions());
        }
        Commands::Check { start, end, id } => {
            if end <= start {
                anyhow::bail!("End time must be after start time");
            }
            let mut slot = Slot::new(start, end);
            if let Some(id) = id {
                slot = slot.for_event(calendar.resolve_id(&id).unwrap_or(id));
            }
            if has_conflict(&slot, calendar.definitions()) {
                println!("conflict");
            } else {
                println!("free");
            }
        }
    }

    Ok(())
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Sort by start and keep occurrences that touch the `[from, to]` day range.
fn visible(
    mut occurrences: Vec<Occurrence>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Occurrence> {
    let window_start = from.map(|d| d.and_time(NaiveTime::MIN));
    let window_end = to
        .and_then(|d| d.succ_opt())
        .map(|d| d.and_time(NaiveTime::MIN));

    occurrences.retain(|o| {
        window_start.map_or(true, |s| o.end() > s) && window_end.map_or(true, |e| o.start() < e)
    });
    occurrences.sort_by_key(|o| o.start());
    occurrences
}

fn describe(occurrence: &Occurrence) -> String {
    let event = &occurrence.event;
    let mut line = format!(
        "{}  {}  [{}] {}",
        event.start.format("%Y-%m-%d %H:%M"),
        event.end.format("%Y-%m-%d %H:%M"),
        event.id,
        event.title
    );
    if occurrence.is_recurring {
        line.push_str(&format!(" ({})", event.recurrence));
    }
    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!(" - {description}"));
    }
    line
}
