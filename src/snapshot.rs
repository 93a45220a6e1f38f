//! The daily snapshot: freezing today into records and shedding old
//! rows.
//!
//! Run once per day, ideally early morning. The writer reconciles
//! rather than appends, so re-running it for the same day is harmless:
//! rows already matching the resolved state are left alone, superseded
//! rows are cleared, and missing rows are written. It is not safe to
//! run two snapshots concurrently against the same roster.
//!
//! Failures are isolated per row. A row the store refuses is logged
//! and counted in [`SnapshotReport::row_failures`]; the rest of the
//! snapshot proceeds.
//!
//! [`run_daily_snapshot`] orchestrates the three phases:
//!
//! 1. [`write_customer_records`]: one meal record per customer due a
//!    delivery today, cleared again if the customer stopped being due.
//! 2. [`write_volunteer_records`]: the resolver's answer for today,
//!    reconciled against whatever records the day already has.
//! 3. [`prune_expired`]: rows older than the retention window go away.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::actuals::{ActualsQuery, QueryError};
use crate::context::EngineContext;
use crate::eligibility::num_meals_on_day;
use crate::models::{Actual, Customer};
use crate::roster::Roster;

/// Counters for one snapshot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub customer_records_written: u32,
    pub customer_records_cleared: u32,
    pub volunteer_records_written: u32,
    pub volunteer_records_cleared: u32,
    pub customer_records_pruned: u32,
    pub volunteer_records_pruned: u32,
    pub substitutions_pruned: u32,
    pub date_ranges_pruned: u32,
    pub announcements_pruned: u32,
    /// Rows the store refused; each is logged and skipped.
    pub row_failures: u32,
}

impl SnapshotReport {
    /// Records written or cleared for the snapshot day.
    pub fn rows_touched(&self) -> u32 {
        self.customer_records_written
            + self.customer_records_cleared
            + self.volunteer_records_written
            + self.volunteer_records_cleared
    }

    /// Rows removed by retention.
    pub fn rows_pruned(&self) -> u32 {
        self.customer_records_pruned
            + self.volunteer_records_pruned
            + self.substitutions_pruned
            + self.date_ranges_pruned
            + self.announcements_pruned
    }
}

/// Writes today's meal record for every customer due a delivery, and
/// clears today's record for every customer no longer due one.
pub fn write_customer_records(
    roster: &mut Roster,
    ctx: &EngineContext,
    report: &mut SnapshotReport,
) {
    let customers: Vec<Customer> = roster.customers().cloned().collect();
    for customer in customers {
        let meals = num_meals_on_day(roster, &customer, ctx.today, ctx);
        if meals > 0 {
            match roster.upsert_customer_record(&customer, ctx.today, meals) {
                Ok(true) => {
                    report.customer_records_written += 1;
                    info!(customer = %customer.id, meals, "wrote meal record");
                }
                Ok(false) => {}
                Err(error) => {
                    report.row_failures += 1;
                    warn!(customer = %customer.id, %error, "meal record refused, row skipped");
                }
            }
        } else if let Some(record) = roster.customer_record_for(&customer.id, ctx.today) {
            let id = record.id.clone();
            if roster.remove_customer_record(&id).is_ok() {
                report.customer_records_cleared += 1;
                info!(customer = %customer.id, "cleared meal record, no longer due today");
            }
        }
    }
}

/// Reconciles today's volunteer records against the resolver.
///
/// Covered rows only: an open slot is a gap in the day, not a fact
/// worth freezing. Clears run before writes so a swapped row never
/// collides with its own replacement.
pub fn write_volunteer_records(
    roster: &mut Roster,
    ctx: &EngineContext,
    report: &mut SnapshotReport,
) -> Result<(), QueryError> {
    let resolved = ActualsQuery::on(ctx.today)
        .exclude_unfilled()
        .run(roster, ctx)?;
    let resolved_set: HashSet<Actual> = resolved.iter().cloned().collect();
    let existing: HashSet<Actual> = roster
        .volunteer_records_on(ctx.today)
        .map(Actual::from_record)
        .collect();

    let stale: Vec<String> = existing
        .iter()
        .filter(|actual| !resolved_set.contains(actual))
        .filter_map(|actual| roster.volunteer_record_matching(actual))
        .map(|record| record.id.clone())
        .collect();
    for id in stale {
        if roster.remove_volunteer_record(&id).is_ok() {
            report.volunteer_records_cleared += 1;
            info!(record = %id, "cleared superseded volunteer record");
        }
    }

    for actual in &resolved {
        if existing.contains(actual) {
            continue;
        }
        let id = roster.allocate_id("volunteer-record");
        match roster.insert_volunteer_record(actual.to_record(&id)) {
            Ok(()) => {
                report.volunteer_records_written += 1;
                info!(record = %id, date = %actual.date, "wrote volunteer record");
            }
            Err(error) => {
                report.row_failures += 1;
                warn!(record = %id, %error, "volunteer record refused, row skipped");
            }
        }
    }
    Ok(())
}

/// Removes rows older than the retention window.
///
/// A pause range survives as long as either endpoint is inside the
/// window; an announcement with no display date never expires.
pub fn prune_expired(roster: &mut Roster, ctx: &EngineContext, report: &mut SnapshotReport) {
    let cutoff = ctx.retention_cutoff();

    let stale: Vec<String> = roster
        .customer_records()
        .filter(|record| record.date < cutoff)
        .map(|record| record.id.clone())
        .collect();
    for id in stale {
        if roster.remove_customer_record(&id).is_ok() {
            report.customer_records_pruned += 1;
        }
    }

    let stale: Vec<String> = roster
        .volunteer_records()
        .filter(|record| record.date < cutoff)
        .map(|record| record.id.clone())
        .collect();
    for id in stale {
        if roster.remove_volunteer_record(&id).is_ok() {
            report.volunteer_records_pruned += 1;
        }
    }

    let stale: Vec<String> = roster
        .substitutions()
        .filter(|substitution| substitution.date < cutoff)
        .map(|substitution| substitution.id.clone())
        .collect();
    for id in stale {
        if roster.remove_substitution(&id).is_ok() {
            report.substitutions_pruned += 1;
        }
    }

    let stale: Vec<String> = roster
        .date_ranges()
        .filter(|range| range.start < cutoff && range.end < cutoff)
        .map(|range| range.id.clone())
        .collect();
    for id in stale {
        if roster.remove_date_range(&id).is_ok() {
            report.date_ranges_pruned += 1;
        }
    }

    let stale: Vec<String> = roster
        .announcements()
        .filter(|notice| notice.display_until.is_some_and(|until| until < cutoff))
        .map(|notice| notice.id.clone())
        .collect();
    for id in stale {
        if roster.remove_announcement(&id).is_ok() {
            report.announcements_pruned += 1;
        }
    }

    if report.rows_pruned() > 0 {
        info!(cutoff = %cutoff, pruned = report.rows_pruned(), "pruned expired rows");
    }
}

/// Runs the whole snapshot for `ctx.today` and reports what changed.
pub fn run_daily_snapshot(
    roster: &mut Roster,
    ctx: &EngineContext,
) -> Result<SnapshotReport, QueryError> {
    let mut report = SnapshotReport::default();
    write_customer_records(roster, ctx, &mut report);
    write_volunteer_records(roster, ctx, &mut report)?;
    prune_expired(roster, ctx, &mut report);
    info!(
        touched = report.rows_touched(),
        pruned = report.rows_pruned(),
        failures = report.row_failures,
        "daily snapshot complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use crate::models::{
        Assignment, CustomerRecord, DateRange, DayOfMonth, Job, JobKind, ManagerAnnouncement,
        Recurrence, Substitution, Volunteer, VolunteerRecord,
    };

    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn slot(day: u8, week: u8) -> DayOfMonth {
        DayOfMonth::new(day, week).unwrap()
    }

    /// Monday, first week of March 2020.
    fn today() -> NaiveDate {
        ymd(2020, 3, 2)
    }

    fn ctx() -> EngineContext {
        EngineContext::on(today())
    }

    /// Ava covers Route 7 on the first Monday; Grace takes one meal
    /// every Monday.
    fn sample_roster() -> Roster {
        let mut roster = Roster::new();
        roster
            .insert_volunteer(Volunteer::new("ava", "Ava", "Price"))
            .unwrap();
        roster
            .insert_volunteer(Volunteer::new("ben", "Ben", "Kim"))
            .unwrap();
        roster
            .insert_volunteer(Volunteer::new("cleo", "Cleo", "Alvarez"))
            .unwrap();
        roster.insert_job(Job::route("route7", "Route 7", 7)).unwrap();
        roster
            .insert_assignment(Assignment::grid("a1", "route7", slot(1, 1)).with_volunteer("ava"))
            .unwrap();
        roster
            .insert_customer(
                Customer::new("c1", "Grace", "Hopper")
                    .activated()
                    .with_recurrence(Recurrence::weekly([Weekday::Mon])),
            )
            .unwrap();
        roster
    }

    #[test]
    fn test_reruns_for_the_same_day_change_nothing() {
        let mut roster = sample_roster();
        let first = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(first.customer_records_written, 1);
        assert_eq!(first.volunteer_records_written, 1);
        assert_eq!(first.rows_touched(), 2);
        assert_eq!(first.row_failures, 0);

        let again = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(again, SnapshotReport::default());
        assert_eq!(roster.customer_records().count(), 1);
        assert_eq!(roster.volunteer_records().count(), 1);
    }

    #[test]
    fn test_pause_added_between_runs_clears_the_meal_record() {
        let mut roster = sample_roster();
        run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert!(roster.customer_record_for("c1", today()).is_some());

        roster
            .insert_date_range(DateRange::new("dr1", "c1", ymd(2020, 3, 1), ymd(2020, 3, 3)))
            .unwrap();
        let report = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(report.customer_records_cleared, 1);
        assert!(roster.customer_record_for("c1", today()).is_none());
    }

    #[test]
    fn test_substitution_added_between_runs_swaps_the_record() {
        let mut roster = sample_roster();
        run_daily_snapshot(&mut roster, &ctx()).unwrap();

        roster
            .insert_substitution(
                Substitution::request("s1", "a1", today()).with_volunteer("cleo"),
            )
            .unwrap();
        let report = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(report.volunteer_records_cleared, 1);
        assert_eq!(report.volunteer_records_written, 1);

        let records: Vec<&VolunteerRecord> = roster.volunteer_records_on(today()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].volunteer.as_deref(), Some("cleo"));
        assert_eq!(records[0].original.as_deref(), Some("ava"));
        assert!(records[0].is_substitution);
    }

    #[test]
    fn test_open_slots_are_never_recorded() {
        let mut roster = Roster::new();
        roster.insert_job(Job::route("route7", "Route 7", 7)).unwrap();
        roster
            .insert_assignment(Assignment::grid("a1", "route7", slot(1, 1)))
            .unwrap();
        let report = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(report, SnapshotReport::default());
        assert_eq!(roster.volunteer_records().count(), 0);
    }

    #[test]
    fn test_pruning_respects_retention_and_range_ends() {
        let mut roster = sample_roster();
        roster
            .insert_job(Job::new("shuttle", "North Shuttle", JobKind::Shuttle))
            .unwrap();
        roster
            .insert_assignment(Assignment::grid("a2", "shuttle", slot(2, 1)).with_volunteer("ben"))
            .unwrap();

        // Today is 2020-03-02 and retention is 180 days, so the cutoff
        // falls on 2019-09-04.
        roster
            .insert_customer_record(CustomerRecord::new("cr_old", "c1", ymd(2019, 9, 3), 2))
            .unwrap();
        roster
            .insert_customer_record(CustomerRecord::new("cr_edge", "c1", ymd(2019, 9, 4), 2))
            .unwrap();
        roster
            .insert_volunteer_record(
                VolunteerRecord::new("vr_old", "route7", ymd(2019, 9, 3)).with_volunteer("ava"),
            )
            .unwrap();
        // 2019-09-03 was the first Tuesday of its month.
        roster
            .insert_substitution(
                Substitution::request("s_old", "a2", ymd(2019, 9, 3)).with_volunteer("cleo"),
            )
            .unwrap();
        roster
            .insert_date_range(DateRange::new("dr_old", "c1", ymd(2018, 1, 1), ymd(2019, 9, 3)))
            .unwrap();
        roster
            .insert_date_range(DateRange::new("dr_keep", "c1", ymd(2019, 1, 1), ymd(2020, 2, 1)))
            .unwrap();
        roster
            .insert_announcement(
                ManagerAnnouncement::new("ann_old", "Freezer moved")
                    .with_display_until(ymd(2019, 9, 3)),
            )
            .unwrap();
        roster
            .insert_announcement(
                ManagerAnnouncement::new("ann_live", "Kitchen closed Friday")
                    .with_display_until(ymd(2020, 3, 1)),
            )
            .unwrap();
        roster
            .insert_announcement(ManagerAnnouncement::new("ann_undated", "Welcome aboard"))
            .unwrap();

        let report = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(report.customer_records_pruned, 1);
        assert_eq!(report.volunteer_records_pruned, 1);
        assert_eq!(report.substitutions_pruned, 1);
        assert_eq!(report.date_ranges_pruned, 1);
        assert_eq!(report.announcements_pruned, 1);
        assert_eq!(report.rows_pruned(), 5);

        assert!(roster.customer_records().any(|record| record.id == "cr_edge"));
        assert!(roster.date_ranges().any(|range| range.id == "dr_keep"));
        assert_eq!(roster.announcements().count(), 2);
    }

    #[test]
    fn test_a_refused_row_is_counted_and_skipped() {
        let mut roster = sample_roster();
        // Ben also covers Route 7 on the first Monday, and Ava
        // substitutes for him today. The resolver then offers two rows
        // for (ava, route7, today); the store takes the first and
        // refuses the second.
        roster
            .insert_assignment(Assignment::grid("a2", "route7", slot(1, 1)).with_volunteer("ben"))
            .unwrap();
        roster
            .insert_substitution(
                Substitution::request("s1", "a2", today()).with_volunteer("ava"),
            )
            .unwrap();

        let report = run_daily_snapshot(&mut roster, &ctx()).unwrap();
        assert_eq!(report.volunteer_records_written, 1);
        assert_eq!(report.row_failures, 1);

        let records: Vec<&VolunteerRecord> = roster.volunteer_records_on(today()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].volunteer.as_deref(), Some("ava"));
        assert!(!records[0].is_substitution);
    }
}
