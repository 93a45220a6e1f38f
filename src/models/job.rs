//! Jobs: the recurring work volunteers sign up for.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::recurrence::Recurrence;

/// Broad category of a job. Listings group by this after route number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// A delivery route, driven in route-number order.
    Route,
    /// A meal-packing shift in the kitchen.
    Packer,
    /// A shuttle run between kitchen and depot.
    Shuttle,
    /// Anything else, labeled free-form.
    Custom(String),
}

impl JobKind {
    pub fn as_str(&self) -> &str {
        match self {
            JobKind::Route => "Route",
            JobKind::Packer => "Packer",
            JobKind::Shuttle => "Shuttle",
            JobKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring piece of work.
///
/// Most jobs live on the day-of-month grid through their assignments
/// and carry no schedule of their own. A job with its own `recurrence`
/// runs outside the grid: its ad-hoc assignments fire whenever the
/// rule says so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Unique human-facing name.
    pub name: String,
    pub kind: JobKind,
    /// Volunteers needed each time the job runs.
    pub num_vols_required: u32,
    /// Position in delivery order; set on routes only.
    pub route_number: Option<i32>,
    /// Own schedule for jobs that run outside the grid.
    pub recurrence: Option<Recurrence>,
}

impl Job {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            num_vols_required: 1,
            route_number: None,
            recurrence: None,
        }
    }

    /// A delivery route with its place in the route order.
    pub fn route(id: impl Into<String>, name: impl Into<String>, number: i32) -> Self {
        let mut job = Self::new(id, name, JobKind::Route);
        job.route_number = Some(number);
        job
    }

    pub fn with_vols_required(mut self, num: u32) -> Self {
        self.num_vols_required = num;
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Sort key for listings: routes in route-number order first, then
    /// everything else by kind and name.
    pub fn order_key(&self) -> (bool, i32, String, String) {
        (
            self.route_number.is_none(),
            self.route_number.unwrap_or(0),
            self.kind.as_str().to_string(),
            self.name.clone(),
        )
    }
}

// ============================================================
// Tests
// ============================================================
