//! Roster and recurrence engine for a volunteer meal-delivery
//! operation.
//!
//! Volunteers hold recurring assignments on a day-of-month grid
//! ("first Monday"), swap dates through substitutions, and leave a
//! frozen trail of records behind them; customers take meals on
//! recurrence rules softened by pause ranges. This crate answers the
//! operational questions those rows pose: who is actually doing what
//! on a given day, who gets how many meals, and what each volunteer
//! has coming up.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Volunteer`, `Customer`, `Job`,
//!   `Assignment`, `Substitution`, `Recurrence`, `DayOfMonth`, and the
//!   frozen record rows
//! - **`roster`**: In-memory relational store with reference,
//!   uniqueness, and cascade semantics
//! - **`actuals`**: The three-source resolver behind every "who is
//!   doing what on day X" question
//! - **`eligibility`**: Customer meal decisions, day by day
//! - **`commitments`**: A volunteer's upcoming dates
//! - **`snapshot`**: The daily record writer and retention pruning
//! - **`context`**: Engine configuration and the evaluation clock
//! - **`validation`**: Integrity checks for rosters loaded from stored
//!   data
//!
//! # Architecture
//!
//! Everything here is synchronous and in-memory. [`roster::Roster`]
//! stands in for a relational database and keeps that database's
//! semantics: nullable references, composite uniqueness that only binds
//! fully-set keys, and per-relation delete cascades. Persistence,
//! transport, and the scheduling of the daily snapshot belong to the
//! caller.
//!
//! # References
//!
//! - RFC 5545 (iCalendar), §3.3.10 "Recurrence Rule", for the rule text
//!   format the recurrence parser accepts

pub mod actuals;
pub mod commitments;
pub mod context;
pub mod eligibility;
pub mod models;
pub mod roster;
pub mod snapshot;
pub mod validation;
