//! Stepping an occurrence rule one occurrence at a time.
//!
//! [`OccurrenceState`] is the small record a caller keeps between
//! evaluations. [`next_occurrence_state`] is a pure transition from one
//! state to the next; [`Occurrences`] drives it lazily as an iterator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::CalendarDate;
use crate::clock::Clock;
use crate::error::Result;
use crate::occurrence::{OccurrenceDefinition, OccurrenceRule};
use crate::resolver;

/// How far a rule has been stepped.
///
/// The default state has never been evaluated. Once `all_done` is set the
/// state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_occurrence_date: Option<CalendarDate>,
    #[serde(default)]
    pub occurrence_count: u32,
    #[serde(default)]
    pub all_done: bool,
}

impl OccurrenceState {
    /// A state positioned at `last_occurrence_date` after `occurrence_count`
    /// occurrences.
    pub fn at(last_occurrence_date: CalendarDate, occurrence_count: u32) -> Self {
        Self {
            last_occurrence_date: Some(last_occurrence_date),
            occurrence_count,
            all_done: false,
        }
    }
}

/// Computes the state after the next occurrence of `rule`.
///
/// The reference date is the previous state's last occurrence, or
/// `clock.today()` when there is none. When the rule is exhausted the
/// previous date and count are kept and only `all_done` is set.
pub fn next_occurrence_state<C: Clock + ?Sized>(
    rule: &OccurrenceRule,
    previous: Option<&OccurrenceState>,
    clock: &C,
) -> OccurrenceState {
    let previous = previous.copied().unwrap_or_default();
    if previous.all_done {
        return previous;
    }

    let reference = previous
        .last_occurrence_date
        .unwrap_or_else(|| clock.today());

    match resolver::next_date(rule, reference, previous.occurrence_count) {
        Some(date) => {
            debug!(
                occurrence_type = %rule.occurrence_type(),
                %reference,
                next = %date,
                occurrence_count = previous.occurrence_count.saturating_add(1),
                "occurrence advanced"
            );
            OccurrenceState {
                last_occurrence_date: Some(date),
                occurrence_count: previous.occurrence_count.saturating_add(1),
                all_done: false,
            }
        }
        None => {
            debug!(
                occurrence_type = %rule.occurrence_type(),
                %reference,
                occurrence_count = previous.occurrence_count,
                "occurrences all done"
            );
            OccurrenceState {
                all_done: true,
                ..previous
            }
        }
    }
}

impl OccurrenceDefinition {
    /// Validates the definition and steps it once.
    ///
    /// # Errors
    /// Any validation error of [`crate::validate_occurrence_definition`].
    pub fn next_state<C: Clock + ?Sized>(
        &self,
        previous: Option<&OccurrenceState>,
        clock: &C,
    ) -> Result<OccurrenceState> {
        let rule = OccurrenceRule::try_from(self)?;
        Ok(next_occurrence_state(&rule, previous, clock))
    }
}

impl OccurrenceRule {
    /// Lazily yields successive occurrence dates starting from `state`.
    ///
    /// Unbounded repeats never finish on their own; bound them with
    /// [`Iterator::take`] or a final date.
    pub fn occurrences<C: Clock>(&self, state: OccurrenceState, clock: C) -> Occurrences<C> {
        Occurrences {
            rule: *self,
            state,
            clock,
        }
    }
}

/// Iterator returned by [`OccurrenceRule::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences<C> {
    rule: OccurrenceRule,
    state: OccurrenceState,
    clock: C,
}

impl<C: Clock> Occurrences<C> {
    /// The state after the most recently yielded occurrence, ready to be
    /// stored and resumed later.
    pub fn state(&self) -> OccurrenceState {
        self.state
    }
}

impl<C: Clock> Iterator for Occurrences<C> {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<CalendarDate> {
        self.state = next_occurrence_state(&self.rule, Some(&self.state), &self.clock);
        if self.state.all_done {
            None
        } else {
            self.state.last_occurrence_date
        }
    }
}
