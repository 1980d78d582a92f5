//! Recurrence expansion -- converts one event definition into its concrete occurrences.
//!
//! Expansion is pure and total: it never reads the wall clock, never fails, and
//! never produces more than [`MAX_OCCURRENCES`] instances for one definition.

use chrono::{Datelike, Days, Duration, Months, NaiveDateTime};

use crate::event::{EventDefinition, Occurrence, Recurrence};

/// Upper bound on the occurrences generated from a single definition.
pub const MAX_OCCURRENCES: usize = 50;

/// Upper bound on weekly cycles. Every valid weekday yields one instance per
/// cycle after the first, so the cap is always reached before this when at
/// least one valid day is selected.
const MAX_WEEKLY_CYCLES: usize = MAX_OCCURRENCES + 1;

/// Expand a definition into its ordered occurrences.
///
/// - `none` and unrecognized rules return the definition itself, not marked recurring.
/// - `daily` steps one calendar day at a time; the interval is not applied.
/// - `monthly` steps `recurrence_interval` calendar months, clamping to month end.
/// - `custom` steps `recurrence_interval` weeks.
/// - `weekly` walks Monday-anchored weeks and emits the selected weekdays that
///   fall on or after the original start.
///
/// Every occurrence keeps the original duration. Instances that would fall
/// outside chrono's representable range end the sequence early.
pub fn expand(definition: &EventDefinition) -> Vec<Occurrence> {
    let occurrences = match definition.recurrence {
        Recurrence::None | Recurrence::Unrecognized(_) => {
            return vec![Occurrence {
                event: definition.clone(),
                is_recurring: false,
                index: 0,
            }];
        }
        Recurrence::Daily => stepped(definition, |i| {
            definition.start.checked_add_days(Days::new(i as u64))
        }),
        Recurrence::Monthly => {
            let interval = interval_of(definition);
            stepped(definition, |i| {
                let months = u32::try_from(i).ok()?.checked_mul(interval)?;
                definition.start.checked_add_months(Months::new(months))
            })
        }
        Recurrence::Custom => {
            let interval = u64::from(interval_of(definition));
            stepped(definition, |i| {
                let days = (i as u64).checked_mul(7)?.checked_mul(interval)?;
                definition.start.checked_add_days(Days::new(days))
            })
        }
        Recurrence::Weekly => weekly(definition),
    };

    tracing::debug!(
        id = %definition.id,
        recurrence = %definition.recurrence,
        count = occurrences.len(),
        "expanded event"
    );
    occurrences
}

/// Expand every definition and concatenate the results in input order.
pub fn expand_all(definitions: &[EventDefinition]) -> Vec<Occurrence> {
    definitions.iter().flat_map(expand).collect()
}

/// Zero would make every step land on the same instant.
fn interval_of(definition: &EventDefinition) -> u32 {
    definition.recurrence_interval.max(1)
}

/// Emit up to [`MAX_OCCURRENCES`] instances whose i-th start is `start_at(i)`.
fn stepped<F>(definition: &EventDefinition, start_at: F) -> Vec<Occurrence>
where
    F: Fn(usize) -> Option<NaiveDateTime>,
{
    let duration = definition.duration();
    let mut occurrences = Vec::with_capacity(MAX_OCCURRENCES);

    for i in 0..MAX_OCCURRENCES {
        let Some(occurrence) = start_at(i).and_then(|start| instance(definition, start, duration, i))
        else {
            break;
        };
        occurrences.push(occurrence);
    }

    occurrences
}

fn weekly(definition: &EventDefinition) -> Vec<Occurrence> {
    let duration = definition.duration();
    let interval = u64::from(interval_of(definition)) * 7;
    let time_of_day = definition.start.time();
    let original = definition.start.date();

    let Some(mut week_start) = original.checked_sub_days(Days::new(u64::from(
        original.weekday().num_days_from_monday(),
    ))) else {
        return Vec::new();
    };

    let mut occurrences = Vec::with_capacity(MAX_OCCURRENCES);

    'cycles: for _ in 0..MAX_WEEKLY_CYCLES {
        for &day in &definition.recurrence_days {
            if day > 6 {
                tracing::debug!(id = %definition.id, day, "skipping invalid weekday index");
                continue;
            }
            // Indices count from Sunday, weeks from Monday.
            let offset = (u64::from(day) + 6) % 7;
            let Some(date) = week_start.checked_add_days(Days::new(offset)) else {
                break 'cycles;
            };
            let candidate = date.and_time(time_of_day);
            if candidate < definition.start {
                continue;
            }
            let Some(occurrence) = instance(definition, candidate, duration, occurrences.len())
            else {
                break 'cycles;
            };
            occurrences.push(occurrence);
            if occurrences.len() >= MAX_OCCURRENCES {
                break 'cycles;
            }
        }

        match week_start.checked_add_days(Days::new(interval)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    occurrences
}

fn instance(
    definition: &EventDefinition,
    start: NaiveDateTime,
    duration: Duration,
    index: usize,
) -> Option<Occurrence> {
    let end = start.checked_add_signed(duration)?;
    let mut event = definition.clone();
    event.start = start;
    event.end = end;
    Some(Occurrence {
        event,
        is_recurring: true,
        index,
    })
}
