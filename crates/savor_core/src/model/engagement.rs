//! Engagement record.
//!
//! # Responsibility
//! - Hold one sub-activity of a project with its categorical descriptors.
//!
//! # Invariants
//! - Descriptor lists keep source order and may contain duplicates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Row of `engage_log`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub id: i64,
    pub name: Option<String>,
    pub time_in: Option<NaiveDateTime>,
    pub mental: Vec<String>,
    pub physical: Vec<String>,
    pub tags: Vec<String>,
    /// Sub-location within the project location.
    pub subloc: Vec<String>,
    pub mental_note: Option<String>,
    pub physical_note: Option<String>,
    /// References to moments logged inside this engagement.
    pub moment_log: Vec<String>,
    /// Participants.
    pub who: Vec<String>,
    pub dose: Vec<String>,
    pub project_location: Option<String>,
    pub location: Option<String>,
    pub money: Vec<String>,
    pub todo: Vec<String>,
    pub idea: Vec<String>,
    pub time_out: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    /// Back-reference to the owning project.
    pub project_log: Option<String>,
    pub id_num: Option<i64>,
    pub wishlist: Vec<String>,
}

impl Engagement {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
