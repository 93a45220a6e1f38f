//! Evaluation context: configuration bound to a concrete calendar day.
//!
//! Every date-sensitive rule in the engine reads its knobs from
//! [`EngineConfig`] and its notion of "today" from [`EngineContext`]
//! instead of consulting hidden globals or the wall clock directly.
//! Production callers build a context from the local clock once per
//! run; tests pin an arbitrary date and get fully reproducible answers.

use chrono::{Days, Local, NaiveDate, Weekday};

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Anchor for recurrence evaluation; rules never fire before it.
    pub rule_epoch: NaiveDate,
    /// How long history rows are kept, in days.
    pub retention_days: u32,
    /// Weekday whose deliveries carry the weekend-bonus meals.
    pub bonus_weekday: Weekday,
    /// Widest range, in days, a single resolver query may cover.
    pub max_range_days: i64,
    /// How far ahead the commitments walk looks, in days.
    pub lookahead_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_epoch: NaiveDate::default(),
            retention_days: 180,
            bonus_weekday: Weekday::Fri,
            max_range_days: 366,
            lookahead_days: 90,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule_epoch(mut self, epoch: NaiveDate) -> Self {
        self.rule_epoch = epoch;
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_bonus_weekday(mut self, weekday: Weekday) -> Self {
        self.bonus_weekday = weekday;
        self
    }

    pub fn with_max_range_days(mut self, days: i64) -> Self {
        self.max_range_days = days;
        self
    }

    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.lookahead_days = days;
        self
    }
}

/// Configuration plus the date the engine treats as today.
///
/// The split between frozen history and live resolution runs through
/// `today`: strictly earlier dates answer from records, `today` and
/// later from live data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineContext {
    pub config: EngineConfig,
    pub today: NaiveDate,
}

impl EngineContext {
    /// A context evaluating as of the given day with default
    /// configuration.
    pub fn on(today: NaiveDate) -> Self {
        Self {
            config: EngineConfig::default(),
            today,
        }
    }

    /// A context reading today from the local clock.
    pub fn now() -> Self {
        Self::on(Local::now().date_naive())
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Oldest date the retention window still keeps.
    pub fn retention_cutoff(&self) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(u64::from(self.config.retention_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Exclusive far edge of the commitments walk.
    pub fn lookahead_limit(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(u64::from(self.config.lookahead_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

// ============================================================
// Tests
// ============================================================
