use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type ParticipantId = TypedId<Participant>;

/// Engagement rate assumed for participants with no tracked history yet.
pub const DEFAULT_ENGAGEMENT_RATE: f64 = 5.0;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Participant {
    #[serde(rename = "_id")]
    pub id: ParticipantId,
    pub display_name: String,
    pub chat_id: i64,
    pub social_handle: Option<String>,
    pub handle_verified: bool,
    pub active: bool,
    pub engagement_rate: f64,
    pub last_participation_at: Option<DateTime<Utc>>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
    pub profile: Option<Profile>,
    pub profile_completed: bool,
}

impl Participant {
    /// Participation recency is measured from the last assignment, falling
    /// back to the registration time for first-timers.
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_participation_at.unwrap_or(self.registered_at)
    }

    pub fn authenticity_score(&self) -> Option<i32> {
        self.profile.as_ref().map(|profile| profile.authenticity_score)
    }
}

impl TypedIdMarker for Participant {
    fn tag() -> &'static str {
        "PCT"
    }
}

/// Self-reported persona used for payout bonuses and initiator preference.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Profile {
    pub label: String,
    pub spending_power: SpendingPower,
    pub authenticity_score: i32,
    pub recommended_types: Vec<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SpendingPower {
    Low,
    Medium,
    High,
}
