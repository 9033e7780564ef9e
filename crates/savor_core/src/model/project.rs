//! Project record: one top-level logged activity session.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Row of `project_log`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Record id assigned by the spreadsheet source (`rec...`).
    pub airtable_id: Option<String>,
    pub time_in: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub location: Option<String>,
    /// References to the engagements logged during this project.
    pub engage_log: Vec<String>,
    pub time_out: Option<NaiveDateTime>,
    /// Computed upstream; stored as given.
    pub duration: Option<i64>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
}

impl Project {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Whether the session has both ends recorded.
    pub fn is_closed(&self) -> bool {
        self.time_in.is_some() && self.time_out.is_some()
    }
}
