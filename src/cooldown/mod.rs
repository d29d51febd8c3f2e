use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

pub mod db;
pub mod manager;

/// A rest window after an assignment, keyed by participant so a new batch
/// overwrites the previous record (last-write-wins).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Cooldown {
    #[serde(rename = "_id")]
    pub participant_id: ParticipantId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub until: DateTime<Utc>,
    pub duration_hours: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Cooldown {
    /// Expired records are left in place and simply stop counting.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.until
    }
}
