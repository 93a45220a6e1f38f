//! A volunteer's upcoming dates: their own slots, their substitution
//! pickups, and their ad-hoc jobs, merged into one short list.
//!
//! The walk is bounded twice over. Grid slots are projected month by
//! month until enough rows are gathered or the configured lookahead
//! runs out; substitutions are only searched as far as the last
//! projected slot (or six months when the volunteer holds no slots at
//! all). The merged list is then trimmed to the leading distinct dates,
//! keeping every row sharing the final date so one day's workload is
//! never shown half.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::context::EngineContext;
use crate::roster::{Roster, RosterError};

/// Stop gathering grid rows once this many are in hand.
const GATHER_LIMIT: usize = 15;
/// At most this many substitution pickups are listed.
const SUBSTITUTION_LIMIT: usize = 10;
/// Distinct dates kept in the final list.
const KEEP_DATES: usize = 5;

/// One upcoming date for one volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub date: NaiveDate,
    /// The job's id.
    pub job: String,
    /// True for a pickup on someone else's assignment.
    pub is_substitution: bool,
}

pub fn upcoming_commitments(
    roster: &Roster,
    volunteer: &str,
    ctx: &EngineContext,
) -> Result<Vec<Commitment>, RosterError> {
    roster.volunteer(volunteer)?;
    let today = ctx.today;
    let horizon = ctx.lookahead_limit();

    let mut rows: Vec<Commitment> = Vec::new();
    let mut cursor = today;
    while rows.len() < GATHER_LIMIT && cursor < horizon {
        for assignment in roster.assignments_for_volunteer(volunteer) {
            let slot = match assignment.slot() {
                Some(slot) => slot,
                None => continue,
            };
            let date = match slot.to_date(cursor.year(), cursor.month()) {
                Some(date) if date >= today => date,
                _ => continue,
            };
            // A substitution on the date, covered or not, takes the
            // day off this volunteer's plate.
            if roster.substitution_on(&assignment.id, date) {
                continue;
            }
            rows.push(Commitment {
                date,
                job: assignment.job.clone(),
                is_substitution: false,
            });
        }
        cursor = match cursor.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    rows.sort_by_key(|row| row.date);

    // Substitutions only matter up to the last projected slot; a
    // volunteer with no slots gets a flat six-month window instead.
    let sub_end = rows
        .last()
        .map(|row| row.date)
        .or_else(|| today.checked_add_months(Months::new(6)))
        .unwrap_or(horizon);
    let pickups: Vec<Commitment> = roster
        .substitutions_for_volunteer(volunteer)
        .filter(|substitution| substitution.date >= today && substitution.date <= sub_end)
        .filter_map(|substitution| {
            let parent = roster.find_assignment(&substitution.assignment)?;
            Some(Commitment {
                date: substitution.date,
                job: parent.job.clone(),
                is_substitution: true,
            })
        })
        .take(SUBSTITUTION_LIMIT)
        .collect();
    rows.extend(pickups);

    for assignment in roster.assignments_for_volunteer(volunteer) {
        if !assignment.is_ad_hoc() {
            continue;
        }
        let recurrence = match roster
            .find_job(&assignment.job)
            .and_then(|job| job.recurrence.as_ref())
        {
            Some(recurrence) => recurrence,
            None => continue,
        };
        let month_ahead = today
            .checked_add_months(Months::new(1))
            .unwrap_or(horizon);
        for date in recurrence.between_days(today, month_ahead, ctx.config.rule_epoch) {
            rows.push(Commitment {
                date,
                job: assignment.job.clone(),
                is_substitution: false,
            });
        }
    }

    rows.sort_by_key(|row| row.date);
    Ok(trim_to_leading_dates(rows, KEEP_DATES))
}

/// Keeps rows for the first `keep` distinct dates, ties on the last
/// date included. Expects `rows` sorted by date.
fn trim_to_leading_dates(rows: Vec<Commitment>, keep: usize) -> Vec<Commitment> {
    let mut dates_seen = 0;
    let mut last: Option<NaiveDate> = None;
    rows.into_iter()
        .take_while(|row| {
            if last != Some(row.date) {
                dates_seen += 1;
                last = Some(row.date);
            }
            dates_seen <= keep
        })
        .collect()
}
