use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::participant::ParticipantId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod content;
pub mod db;
pub mod endpoints;
pub mod engine;
pub mod manager;
pub use endpoints::*;

pub type AssignmentId = TypedId<Assignment>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Assignment {
    #[serde(rename = "_id")]
    pub id: AssignmentId,
    pub campaign_id: CampaignId,
    pub participant_id: ParticipantId,
    pub role: Role,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub scheduled_at: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub suggested_content: String,
    pub estimated_earning: i64,
    pub actual_earning: Option<i64>,
    pub profile_match: bool,
    pub metrics: EngagementMetrics,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Assignment {
    fn tag() -> &'static str {
        "ASG"
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Role {
    Initiator,
    Replier,
    Retweeter,
    Quoter,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Initiator, Role::Replier, Role::Retweeter, Role::Quoter];

    /// Target share of a batch, per role. Shares sum to 1; per-role counts
    /// are rounded up and reconciled against the batch size afterwards.
    pub fn target_share(self) -> f64 {
        match self {
            Role::Initiator => 0.20,
            Role::Replier => 0.40,
            Role::Retweeter => 0.25,
            Role::Quoter => 0.15,
        }
    }

    /// Payout weight relative to the replier baseline of 200.
    pub fn payout_weight(self) -> i64 {
        match self {
            Role::Initiator => 300,
            Role::Replier => 200,
            Role::Retweeter => 100,
            Role::Quoter => 250,
        }
    }

    /// Base posting delay so a batch reads like a conversation: initiators
    /// post first, replies and amplification trail behind.
    pub fn base_delay_minutes(self) -> i64 {
        match self {
            Role::Initiator => 0,
            Role::Replier => 30,
            Role::Retweeter => 60,
            Role::Quoter => 90,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum AssignmentStatus {
    Pending,
    Executed,
    Completed,
    Failed,
    Skipped,
}

/// Post-hoc engagement numbers, filled in by an external collector.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize)]
pub struct EngagementMetrics {
    pub likes: i64,
    pub retweets: i64,
    pub replies: i64,
    pub impressions: i64,
}

impl EngagementMetrics {
    /// Impressions are reach, not engagement, so they stay out of the sum.
    pub fn engagement_total(&self) -> i64 {
        self.likes + self.retweets + self.replies
    }
}
