use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::{ParticipantId, SpendingPower};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

/// Conversations that stall are reset to Idle by the session sweeper.
pub const SESSION_TIMEOUT_MINUTES: i64 = 15;

/// Where a participant currently is in the chat onboarding conversation,
/// keyed by participant so there is exactly one session per person.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OnboardingSession {
    #[serde(rename = "_id")]
    pub participant_id: ParticipantId,
    pub state: OnboardingState,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl OnboardingSession {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.state != OnboardingState::Idle
            && now - self.updated_at >= Duration::minutes(SESSION_TIMEOUT_MINUTES)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING-KEBAB-CASE")]
pub enum OnboardingState {
    Idle,
    AwaitingHandle,
    AwaitingBioUpdate {
        code: String,
    },
    AwaitingProfileAnswer {
        step: ProfileStep,
        draft: ProfileDraft,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ProfileStep {
    Label,
    SpendingPower,
    RecommendedTypes,
}

/// Answers collected so far while walking the profile questions.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct ProfileDraft {
    pub label: Option<String>,
    pub spending_power: Option<SpendingPower>,
}
