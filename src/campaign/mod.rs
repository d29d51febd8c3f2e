use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::{ParticipantId, SpendingPower};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub brand_name: String,
    pub description: String,
    pub target_audience: String,
    pub package: PackageTier,
    pub budget: i64,
    pub duration_hours: i64,
    pub estimated_participants: i64,
    pub estimated_reach: i64,
    pub status: CampaignStatus,
    pub participant_ids: Vec<ParticipantId>,
    pub total_engagements: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// Brand-supplied fields of a new campaign, before validation.
#[derive(Clone, Debug)]
pub struct CampaignDraft {
    pub brand_name: String,
    pub description: String,
    pub target_audience: String,
    pub package: PackageTier,
    pub budget: i64,
    pub duration_hours: i64,
    pub estimated_participants: i64,
    pub estimated_reach: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum CampaignStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum PackageTier {
    Starter,
    Standard,
    Premium,
}

impl PackageTier {
    /// The spending-power bracket a package is pitched at, used when judging
    /// whether a participant persona matches the campaign.
    pub fn aligned_spending_power(self) -> SpendingPower {
        match self {
            PackageTier::Starter => SpendingPower::Low,
            PackageTier::Standard => SpendingPower::Medium,
            PackageTier::Premium => SpendingPower::High,
        }
    }
}
