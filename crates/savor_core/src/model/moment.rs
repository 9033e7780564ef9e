//! Moment record: a fine-grained event inside an engagement.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Row of `moment_log`.
///
/// Same descriptor shape as `Engagement`, without location and moment
/// references, plus a free-form `title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moment {
    pub id: i64,
    pub name: Option<String>,
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub title: Option<String>,
    pub physical: Vec<String>,
    pub physical_note: Option<String>,
    pub dose: Vec<String>,
    pub mental: Vec<String>,
    pub subloc: Vec<String>,
    pub mental_note: Option<String>,
    pub tags: Vec<String>,
    pub todo: Vec<String>,
    pub money: Vec<String>,
    pub who: Vec<String>,
    pub idea: Vec<String>,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    pub project_log: Option<String>,
    pub id_num: Option<i64>,
    pub wishlist: Vec<String>,
}

impl Moment {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
