//! Next-date resolution for each occurrence placement.
//!
//! Every placement follows the same shape: advance the reference date with
//! the rule's repeat policy, place the date within the anchor's week, month
//! or year, and when the rule must not move backwards (no repeat, or the
//! first occurrence of a repeat) push a placement that landed before the
//! anchor one natural cycle later.
//!
//! The day-of-week placement is the exception: it places within the
//! reference's Sunday-started week first and advances by the repeat after,
//! so a weekly repeat from a Tuesday to a Monday lands on the Monday of the
//! following week rather than two weeks later.

use tracing::trace;

use crate::calendar::CalendarDate;
use crate::occurrence::{Cycle, OccurrenceRule, Placement};
use crate::repeat;

/// Computes the next occurrence date after `reference`, given how many
/// occurrences have already happened.
///
/// Returns `None` once the rule is exhausted: a non-repeating rule that has
/// already occurred, a repeat that reached its maximum count, or one whose
/// next repetition would pass its final date.
pub fn next_date(
    rule: &OccurrenceRule,
    reference: CalendarDate,
    occurrence_count: u32,
) -> Option<CalendarDate> {
    let forward_only = !rule.is_repeating() || occurrence_count == 0;
    let placement = rule.placement;

    if let Placement::DayOfWeek { .. } = placement {
        let mut placed = place(placement, reference);
        if forward_only && placed < reference {
            placed = placed.add_days(7);
        }
        trace!(%reference, %placed, "placed day of week");
        return repeat::advance(rule.repeat.as_ref(), placed, occurrence_count);
    }

    let anchor = repeat::advance(rule.repeat.as_ref(), reference, occurrence_count)?;
    let placed = place(placement, anchor);
    if forward_only && placed < anchor {
        let shifted = shift_cycle(placement.occurrence_type().cycle(), placed);
        let corrected = place(placement, shifted);
        trace!(%anchor, %placed, %corrected, "placement before anchor, moved one cycle on");
        return Some(corrected);
    }

    trace!(%anchor, %placed, "placed occurrence");
    Some(placed)
}

/// Lands on the placement's date within the period containing `anchor`.
fn place(placement: Placement, anchor: CalendarDate) -> CalendarDate {
    match placement {
        Placement::DayOfWeek { weekday } => {
            let delta = i64::from(weekday.num_days_from_sunday()) - i64::from(anchor.day_of_week());
            anchor.add_days(delta)
        }
        Placement::DayOfMonth { offset } => anchor.with_day(i64::from(offset) + 1),
        Placement::DayEndOfMonth { offset } => {
            anchor.with_day(i64::from(anchor.last_day_of_month()) - i64::from(offset))
        }
        Placement::DowOfMonth { nth, weekday } => anchor.nth_weekday_of_month(nth_forward(nth), weekday),
        Placement::DowEndOfMonth { nth, weekday } => {
            anchor.nth_weekday_of_month(nth_backward(nth), weekday)
        }
        Placement::DayOfSpecificMonth { offset, month } => {
            first_of_month(anchor, month).with_day(i64::from(offset) + 1)
        }
        Placement::DayEndOfSpecificMonth { offset, month } => {
            let first = first_of_month(anchor, month);
            first.with_day(i64::from(first.last_day_of_month()) - i64::from(offset))
        }
        Placement::DowOfSpecificMonth {
            nth,
            weekday,
            month,
        } => first_of_month(anchor, month).nth_weekday_of_month(nth_forward(nth), weekday),
        Placement::DowEndOfSpecificMonth {
            nth,
            weekday,
            month,
        } => first_of_month(anchor, month).nth_weekday_of_month(nth_backward(nth), weekday),
        Placement::DayOfYear { offset } => first_of_month(anchor, 0).add_days(i64::from(offset)),
        Placement::DayEndOfYear { offset } => {
            first_of_month(anchor, 11).with_day(31).add_days(-i64::from(offset))
        }
        Placement::DowOfYear { nth, weekday } => anchor.nth_weekday_of_year(nth_forward(nth), weekday),
        Placement::DowEndOfYear { nth, weekday } => {
            anchor.nth_weekday_of_year(nth_backward(nth), weekday)
        }
    }
}

fn shift_cycle(cycle: Cycle, date: CalendarDate) -> CalendarDate {
    match cycle {
        Cycle::Week => date.add_days(7),
        Cycle::Month => date.add_months(1),
        Cycle::Year => date.add_years(1),
    }
}

/// First day of `month0` in `anchor`'s year.
fn first_of_month(anchor: CalendarDate, month0: u32) -> CalendarDate {
    anchor
        .with_day(1)
        .add_months(i64::from(month0) - i64::from(anchor.month0()))
}

fn nth_forward(nth: u32) -> i32 {
    i32::try_from(nth).unwrap_or(i32::MAX)
}

fn nth_backward(nth: u32) -> i32 {
    -nth_forward(nth)
}
