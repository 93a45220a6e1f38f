//! Recurring-schedule rules.
//!
//! Rules use the familiar iCalendar text form, one rule per line:
//!
//! ```text
//! RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR
//! EXRULE:FREQ=MONTHLY;BYDAY=-1FR
//! ```
//!
//! Only the weekly and monthly-by-position shapes the roster needs are
//! accepted. A weekly `BYDAY` entry is a bare weekday; a monthly entry
//! prefixes the weekday with an ordinal, 1 through 5 or -1 for the last
//! occurrence in the month. Anything else in the grammar (counts, until
//! dates, hourly frequencies) is rejected up front rather than silently
//! ignored, so a rule that parses is a rule the engine fully honors.
//!
//! Two consumers read these rules:
//!
//! - [`Recurrence::day_positions`] flattens a rule set into the grid
//!   positions it covers, which is how a recurring signup becomes
//!   concrete assignment rows.
//! - [`Recurrence::occurs_on`] answers day-level containment, which is
//!   how ad-hoc jobs and customer delivery schedules fire.
//!
//! The two deliberately disagree about `-1`: the grid has no "last"
//! slot, so the splitter files it under week five, while containment
//! checks the true last occurrence of the weekday in the month.
//!
//! # Examples
//!
//! ```
//! use u_roster::models::{DayOfMonth, Recurrence};
//!
//! let rule: Recurrence = "RRULE:FREQ=MONTHLY;BYDAY=4TU".parse().unwrap();
//! let positions: Vec<DayOfMonth> = rule.day_positions().collect();
//! assert_eq!(positions, vec![DayOfMonth::new(2, 4).unwrap()]);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::day_of_month::DayOfMonth;

/// Failure to parse or evaluate a recurrence rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    /// Rule text that fits no accepted shape.
    #[error("malformed recurrence rule: {0:?}")]
    Malformed(String),
    /// A frequency other than WEEKLY or MONTHLY.
    #[error("unsupported frequency {0:?}")]
    UnknownFreq(String),
    /// A BYDAY token whose weekday code is not MO through SU.
    #[error("unknown weekday code {0:?}")]
    UnknownWeekday(String),
    /// An ISO weekday number outside 1 through 7.
    #[error("weekday number {0} outside 1..=7")]
    WeekdayOutOfRange(i64),
    /// A week ordinal outside 1 through 5 (or -1 for "last").
    #[error("week ordinal {0} outside 1..=5 (-1 means last)")]
    OrdinalOutOfRange(i64),
    /// A rule parameter the engine would otherwise silently drop.
    #[error("unsupported rule parameter {0:?}")]
    UnsupportedParam(String),
    /// A rule with no BYDAY entries at all.
    #[error("rule has no BYDAY entries")]
    MissingByDay,
}

/// Rule frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freq {
    /// Fires every week on the listed weekdays.
    Weekly,
    /// Fires once a month per listed (ordinal, weekday) pair.
    Monthly,
}

impl Freq {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freq::Weekly => "WEEKLY",
            Freq::Monthly => "MONTHLY",
        }
    }
}

/// One BYDAY entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    /// Week ordinal. `None` on weekly entries; `Some(1..=5)` or
    /// `Some(-1)` on monthly entries.
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

/// A single RRULE or EXRULE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub freq: Freq,
    pub by_day: Vec<ByDay>,
}

impl RuleSpec {
    /// A weekly rule over the given weekdays.
    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            freq: Freq::Weekly,
            by_day: days
                .into_iter()
                .map(|weekday| ByDay {
                    ordinal: None,
                    weekday,
                })
                .collect(),
        }
    }

    /// A monthly rule over the given (ordinal, weekday) pairs.
    pub fn monthly(entries: impl IntoIterator<Item = (i8, Weekday)>) -> Self {
        Self {
            freq: Freq::Monthly,
            by_day: entries
                .into_iter()
                .map(|(ordinal, weekday)| ByDay {
                    ordinal: Some(ordinal),
                    weekday,
                })
                .collect(),
        }
    }

    /// Whether this rule fires on the concrete date.
    fn matches_date(&self, date: NaiveDate) -> bool {
        self.by_day.iter().any(|entry| {
            if entry.weekday != date.weekday() {
                return false;
            }
            match (self.freq, entry.ordinal) {
                (Freq::Weekly, _) => true,
                (Freq::Monthly, Some(-1)) => is_last_weekday_of_month(date),
                (Freq::Monthly, Some(ordinal)) => {
                    i64::from(DayOfMonth::from_date(date).week_of_month) == i64::from(ordinal)
                }
                (Freq::Monthly, None) => false,
            }
        })
    }

    /// Whether this rule, used as an exclusion, suppresses a grid
    /// position. A weekly exclusion blankets its weekday across every
    /// ordinal; a monthly one hits the exact position only.
    fn excludes_position(&self, position: DayOfMonth) -> bool {
        self.by_day.iter().any(|entry| {
            if entry.weekday != position.weekday() {
                return false;
            }
            match self.freq {
                Freq::Weekly => true,
                Freq::Monthly => entry.ordinal.map(last_to_fifth) == Some(position.week_of_month),
            }
        })
    }
}

fn last_to_fifth(ordinal: i8) -> u8 {
    if ordinal == -1 {
        5
    } else {
        ordinal as u8
    }
}

fn is_last_weekday_of_month(date: NaiveDate) -> bool {
    match date.checked_add_days(Days::new(7)) {
        Some(next) => next.month() != date.month(),
        None => true,
    }
}

/// A full rule set: inclusion rules minus exclusion rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recurrence {
    pub rules: Vec<RuleSpec>,
    pub exrules: Vec<RuleSpec>,
}

impl Recurrence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_exrule(mut self, rule: RuleSpec) -> Self {
        self.exrules.push(rule);
        self
    }

    /// Shorthand for a single weekly rule.
    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self::new().with_rule(RuleSpec::weekly(days))
    }

    /// Shorthand for a single monthly rule.
    pub fn monthly(entries: impl IntoIterator<Item = (i8, Weekday)>) -> Self {
        Self::new().with_rule(RuleSpec::monthly(entries))
    }

    /// True when the rule set contains no rules at all. An empty set
    /// never fires and expands to no positions.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.exrules.is_empty()
    }

    /// The grid positions this rule set covers.
    ///
    /// Weekly entries span all five week ordinals. Monthly entries name
    /// one, with -1 filed under the fifth week, the closest slot the
    /// grid has to "last". Exclusions are applied to the expanded
    /// positions, so a weekly exclusion also suppresses positions that
    /// a monthly rule contributed for that weekday.
    ///
    /// The iterator makes no ordering or uniqueness promise; collect
    /// into a set when comparing.
    pub fn day_positions(&self) -> impl Iterator<Item = DayOfMonth> + '_ {
        self.rules
            .iter()
            .flat_map(|rule| {
                let freq = rule.freq;
                rule.by_day.iter().copied().flat_map(move |entry| {
                    let weeks = match (freq, entry.ordinal) {
                        (Freq::Weekly, _) => 1..=5,
                        (Freq::Monthly, Some(ordinal)) => {
                            let week = last_to_fifth(ordinal);
                            week..=week
                        }
                        // A monthly entry without an ordinal never parses;
                        // expand hand-built ones to nothing.
                        (Freq::Monthly, None) => 1..=0,
                    };
                    weeks.map(move |week| DayOfMonth::nth(week, entry.weekday))
                })
            })
            .filter(move |position| !self.excludes(*position))
    }

    fn excludes(&self, position: DayOfMonth) -> bool {
        self.exrules
            .iter()
            .any(|exrule| exrule.excludes_position(position))
    }

    /// Whether the schedule fires on `date`.
    ///
    /// Dates before `epoch` never fire; the epoch anchors evaluation
    /// the way a series start date would. An exclusion rule matching
    /// the date suppresses it even when an inclusion rule covers it.
    /// Here -1 means the true last occurrence of the weekday in the
    /// month, whichever week it falls in.
    pub fn occurs_on(&self, date: NaiveDate, epoch: NaiveDate) -> bool {
        if date < epoch {
            return false;
        }
        self.rules.iter().any(|rule| rule.matches_date(date))
            && !self.exrules.iter().any(|exrule| exrule.matches_date(date))
    }

    /// Every date in `[start, end]` (inclusive) on which the schedule
    /// fires.
    pub fn between_days(&self, start: NaiveDate, end: NaiveDate, epoch: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut day = start;
        while day <= end {
            if self.occurs_on(day, epoch) {
                days.push(day);
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        days
    }
}

// ============================================================
// Text form
// ============================================================

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_weekday(code: &str) -> Result<Weekday, RecurrenceError> {
    match code {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(RecurrenceError::UnknownWeekday(other.to_string())),
    }
}

fn parse_by_day(freq: Freq, token: &str) -> Result<ByDay, RecurrenceError> {
    if !token.is_ascii() || token.len() < 2 {
        return Err(RecurrenceError::Malformed(token.to_string()));
    }
    let (prefix, code) = token.split_at(token.len() - 2);
    let weekday = parse_weekday(code)?;
    match freq {
        Freq::Weekly => {
            if !prefix.is_empty() {
                return Err(RecurrenceError::Malformed(format!(
                    "weekly BYDAY takes no ordinal: {token:?}"
                )));
            }
            Ok(ByDay {
                ordinal: None,
                weekday,
            })
        }
        Freq::Monthly => {
            if prefix.is_empty() {
                return Err(RecurrenceError::Malformed(format!(
                    "monthly BYDAY needs an ordinal: {token:?}"
                )));
            }
            let ordinal: i64 = prefix
                .trim_start_matches('+')
                .parse()
                .map_err(|_| RecurrenceError::Malformed(token.to_string()))?;
            if ordinal != -1 && !(1..=5).contains(&ordinal) {
                return Err(RecurrenceError::OrdinalOutOfRange(ordinal));
            }
            Ok(ByDay {
                ordinal: Some(ordinal as i8),
                weekday,
            })
        }
    }
}

fn parse_rule(params: &str) -> Result<RuleSpec, RecurrenceError> {
    let mut freq = None;
    let mut by_day = None;
    for param in params.split(';') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| RecurrenceError::Malformed(param.to_string()))?;
        match key {
            "FREQ" => {
                freq = Some(match value {
                    "WEEKLY" => Freq::Weekly,
                    "MONTHLY" => Freq::Monthly,
                    other => return Err(RecurrenceError::UnknownFreq(other.to_string())),
                });
            }
            "BYDAY" => by_day = Some(value),
            // Serializers commonly emit these with their no-op values.
            "INTERVAL" if value == "1" => {}
            "WKST" => {}
            other => return Err(RecurrenceError::UnsupportedParam(other.to_string())),
        }
    }
    let freq = freq.ok_or_else(|| RecurrenceError::Malformed("missing FREQ".to_string()))?;
    let by_day = by_day.ok_or(RecurrenceError::MissingByDay)?;
    let entries = by_day
        .split(',')
        .map(|token| parse_by_day(freq, token.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    if entries.is_empty() {
        return Err(RecurrenceError::MissingByDay);
    }
    Ok(RuleSpec {
        freq,
        by_day: entries,
    })
}

impl FromStr for Recurrence {
    type Err = RecurrenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut recurrence = Recurrence::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(params) = line.strip_prefix("RRULE:") {
                recurrence.rules.push(parse_rule(params)?);
            } else if let Some(params) = line.strip_prefix("EXRULE:") {
                recurrence.exrules.push(parse_rule(params)?);
            } else if line.starts_with("DTSTART") {
                // The evaluation epoch comes from configuration, not rule text.
                continue;
            } else {
                return Err(RecurrenceError::Malformed(line.to_string()));
            }
        }
        Ok(recurrence)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut write_line = |f: &mut fmt::Formatter<'_>, label: &str, rule: &RuleSpec| {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{label}:FREQ={};BYDAY=", rule.freq.as_str())?;
            for (index, entry) in rule.by_day.iter().enumerate() {
                if index > 0 {
                    write!(f, ",")?;
                }
                if let Some(ordinal) = entry.ordinal {
                    write!(f, "{ordinal}")?;
                }
                write!(f, "{}", weekday_code(entry.weekday))?;
            }
            Ok(())
        };
        for rule in &self.rules {
            write_line(f, "RRULE", rule)?;
        }
        for exrule in &self.exrules {
            write_line(f, "EXRULE", exrule)?;
        }
        Ok(())
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn positions(text: &str) -> BTreeSet<DayOfMonth> {
        let recurrence: Recurrence = text.parse().unwrap();
        recurrence.day_positions().collect()
    }

    fn grid(days: &[u8], weeks: &[u8]) -> BTreeSet<DayOfMonth> {
        let mut set = BTreeSet::new();
        for &day in days {
            for &week in weeks {
                set.insert(DayOfMonth::new(day, week).unwrap());
            }
        }
        set
    }

    // ---------- splitting ----------

    #[test]
    fn test_weekly_rule_spans_all_five_weeks() {
        let actual = positions("RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR");
        assert_eq!(actual, grid(&[1, 3, 5], &[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_monthly_rule_names_one_position() {
        let actual = positions("RRULE:FREQ=MONTHLY;BYDAY=4TU");
        assert_eq!(actual, grid(&[2], &[4]));
    }

    #[test]
    fn test_mixed_rules_union_their_positions() {
        let actual = positions("RRULE:FREQ=MONTHLY;BYDAY=4TU\nRRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR");
        let mut expected = grid(&[1, 3, 5], &[1, 2, 3, 4, 5]);
        expected.insert(DayOfMonth::new(2, 4).unwrap());
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_exclusion_only_rule_yields_nothing() {
        assert!(positions("EXRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR").is_empty());
        assert!(positions(
            "RRULE:FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR\nEXRULE:FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR"
        )
        .is_empty());
    }

    #[test]
    fn test_monthly_exclusion_hits_exact_position() {
        let actual = positions("RRULE:FREQ=MONTHLY;BYDAY=4TU,4TH\nEXRULE:FREQ=MONTHLY;BYDAY=4TU");
        assert_eq!(actual, grid(&[4], &[4]));
    }

    #[test]
    fn test_weekly_exclusion_blankets_monthly_positions_too() {
        let actual = positions(
            "RRULE:FREQ=MONTHLY;BYDAY=4TU,4TH\n\
             RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\n\
             EXRULE:FREQ=WEEKLY;BYDAY=TU\n\
             EXRULE:FREQ=MONTHLY;BYDAY=3MO",
        );
        let mut expected = grid(&[1, 3, 5], &[1, 2, 3, 4, 5]);
        expected.insert(DayOfMonth::new(4, 4).unwrap());
        expected.remove(&DayOfMonth::new(1, 3).unwrap());
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_last_ordinal_lands_in_week_five() {
        let actual = positions("RRULE:FREQ=MONTHLY;BYDAY=-1FR\nEXRULE:FREQ=MONTHLY;BYDAY=4FR");
        assert_eq!(actual, grid(&[5], &[5]));
    }

    #[test]
    fn test_typed_builders_match_parsed_rules() {
        let built = Recurrence::weekly([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        let parsed: Recurrence = "RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR".parse().unwrap();
        assert_eq!(built, parsed);

        let built = Recurrence::monthly([(4, Weekday::Tue), (-1, Weekday::Fri)]);
        let parsed: Recurrence = "RRULE:FREQ=MONTHLY;BYDAY=4TU,-1FR".parse().unwrap();
        assert_eq!(built, parsed);
    }

    // ---------- parsing failures ----------

    #[test]
    fn test_rejects_unsupported_frequency() {
        let err = "RRULE:FREQ=DAILY;BYDAY=MO".parse::<Recurrence>().unwrap_err();
        assert_eq!(err, RecurrenceError::UnknownFreq("DAILY".to_string()));
    }

    #[test]
    fn test_rejects_unknown_weekday_code() {
        let err = "RRULE:FREQ=WEEKLY;BYDAY=XX".parse::<Recurrence>().unwrap_err();
        assert_eq!(err, RecurrenceError::UnknownWeekday("XX".to_string()));
    }

    #[test]
    fn test_rejects_out_of_range_ordinals() {
        assert_eq!(
            "RRULE:FREQ=MONTHLY;BYDAY=6MO".parse::<Recurrence>().unwrap_err(),
            RecurrenceError::OrdinalOutOfRange(6)
        );
        assert_eq!(
            "RRULE:FREQ=MONTHLY;BYDAY=0MO".parse::<Recurrence>().unwrap_err(),
            RecurrenceError::OrdinalOutOfRange(0)
        );
        assert_eq!(
            "RRULE:FREQ=MONTHLY;BYDAY=-2MO".parse::<Recurrence>().unwrap_err(),
            RecurrenceError::OrdinalOutOfRange(-2)
        );
    }

    #[test]
    fn test_rejects_ordinal_on_weekly_and_missing_ordinal_on_monthly() {
        assert!("RRULE:FREQ=WEEKLY;BYDAY=2MO".parse::<Recurrence>().is_err());
        assert!("RRULE:FREQ=MONTHLY;BYDAY=MO".parse::<Recurrence>().is_err());
    }

    #[test]
    fn test_rejects_params_that_would_change_meaning() {
        assert_eq!(
            "RRULE:FREQ=WEEKLY;BYDAY=MO;COUNT=10".parse::<Recurrence>().unwrap_err(),
            RecurrenceError::UnsupportedParam("COUNT".to_string())
        );
        assert_eq!(
            "RRULE:FREQ=WEEKLY;BYDAY=MO;INTERVAL=2".parse::<Recurrence>().unwrap_err(),
            RecurrenceError::UnsupportedParam("INTERVAL".to_string())
        );
    }

    #[test]
    fn test_rejects_rules_without_byday() {
        assert_eq!(
            "RRULE:FREQ=WEEKLY".parse::<Recurrence>().unwrap_err(),
            RecurrenceError::MissingByDay
        );
    }

    #[test]
    fn test_rejects_unrecognized_lines() {
        assert!("RDATE:20200101".parse::<Recurrence>().is_err());
    }

    #[test]
    fn test_tolerates_noise_the_serializer_emits() {
        let parsed: Recurrence = "DTSTART:20200101T000000Z\nRRULE:FREQ=WEEKLY;BYDAY=MO;INTERVAL=1;WKST=MO"
            .parse()
            .unwrap();
        assert_eq!(parsed, Recurrence::weekly([Weekday::Mon]));
    }

    #[test]
    fn test_empty_text_parses_to_empty_rule_set() {
        let parsed: Recurrence = "".parse().unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.day_positions().count(), 0);
        assert!(!parsed.occurs_on(ymd(2020, 3, 2), ymd(1970, 1, 1)));
    }

    // ---------- containment ----------

    #[test]
    fn test_weekly_containment_checks_weekday_only() {
        let rule = Recurrence::weekly([Weekday::Mon, Weekday::Fri]);
        let epoch = ymd(1970, 1, 1);
        assert!(rule.occurs_on(ymd(2019, 11, 4), epoch));
        assert!(rule.occurs_on(ymd(2019, 11, 29), epoch));
        assert!(!rule.occurs_on(ymd(2019, 11, 5), epoch));
    }

    #[test]
    fn test_monthly_containment_checks_week_ordinal() {
        let rule = Recurrence::monthly([(2, Weekday::Tue)]);
        let epoch = ymd(1970, 1, 1);
        assert!(rule.occurs_on(ymd(2019, 11, 12), epoch));
        assert!(!rule.occurs_on(ymd(2019, 11, 5), epoch));
        assert!(!rule.occurs_on(ymd(2019, 11, 19), epoch));
    }

    #[test]
    fn test_last_ordinal_containment_tracks_true_last_occurrence() {
        let rule = Recurrence::monthly([(-1, Weekday::Fri)]);
        let epoch = ymd(1970, 1, 1);
        // November 2019 has five Fridays; the last is the 29th.
        assert!(rule.occurs_on(ymd(2019, 11, 29), epoch));
        assert!(!rule.occurs_on(ymd(2019, 11, 22), epoch));
        // December 2019 has four; the last is the 27th, in week four.
        assert!(rule.occurs_on(ymd(2019, 12, 27), epoch));
        assert!(!rule.occurs_on(ymd(2019, 12, 20), epoch));
    }

    #[test]
    fn test_dates_before_the_epoch_never_fire() {
        let rule = Recurrence::weekly([Weekday::Mon]);
        let epoch = ymd(2020, 1, 1);
        assert!(!rule.occurs_on(ymd(2019, 12, 30), epoch));
        assert!(rule.occurs_on(ymd(2020, 1, 6), epoch));
    }

    #[test]
    fn test_exclusions_suppress_containment() {
        let rule = Recurrence::weekly([Weekday::Mon, Weekday::Wed])
            .with_exrule(RuleSpec::monthly([(1, Weekday::Mon)]));
        let epoch = ymd(1970, 1, 1);
        assert!(!rule.occurs_on(ymd(2019, 11, 4), epoch));
        assert!(rule.occurs_on(ymd(2019, 11, 11), epoch));
        assert!(rule.occurs_on(ymd(2019, 11, 6), epoch));
    }

    #[test]
    fn test_between_days_is_inclusive_of_both_ends() {
        let rule = Recurrence::weekly([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        let days = rule.between_days(ymd(2019, 11, 4), ymd(2019, 11, 8), ymd(1970, 1, 1));
        assert_eq!(days, vec![ymd(2019, 11, 4), ymd(2019, 11, 6), ymd(2019, 11, 8)]);
    }

    // ---------- text round-trips ----------

    #[test]
    fn test_display_round_trips_through_parse() {
        let texts = [
            "RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR",
            "RRULE:FREQ=MONTHLY;BYDAY=4TU,-1FR",
            "RRULE:FREQ=MONTHLY;BYDAY=4TU,4TH\nEXRULE:FREQ=MONTHLY;BYDAY=4TU",
        ];
        for text in texts {
            let parsed: Recurrence = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
            let reparsed: Recurrence = parsed.to_string().parse().unwrap();
            assert_eq!(reparsed, parsed);
        }
    }

    #[test]
    fn test_serde_uses_the_text_form() {
        let rule = Recurrence::monthly([(4, Weekday::Tue)]);
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, "\"RRULE:FREQ=MONTHLY;BYDAY=4TU\"");
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}
