use chrono::Utc;

use crate::database::Database;
use crate::error::Error;

use super::{Participant, ParticipantId, Profile, DEFAULT_ENGAGEMENT_RATE};

#[tracing::instrument(skip(db))]
pub async fn register_participant(
    db: &dyn Database,
    display_name: String,
    chat_id: i64,
) -> Result<Participant, Error> {
    let now = Utc::now();
    let participant = Participant {
        id: ParticipantId::new(),
        display_name,
        chat_id,
        social_handle: None,
        handle_verified: false,
        active: true,
        engagement_rate: DEFAULT_ENGAGEMENT_RATE,
        last_participation_at: None,
        registered_at: now,
        created_at: now,
        modified_at: now,
        profile: None,
        profile_completed: false,
    };

    db.participants().insert_participant(&participant).await?;

    Ok(participant)
}

#[tracing::instrument(skip(db))]
pub async fn get_participants(db: &dyn Database) -> Result<Vec<Participant>, Error> {
    let participants = db.participants().fetch_participants().await?;

    Ok(participants)
}

#[tracing::instrument(skip(db))]
pub async fn get_participant_by_id(
    db: &dyn Database,
    participant_id: ParticipantId,
) -> Result<Option<Participant>, Error> {
    let participant = db
        .participants()
        .fetch_participant_by_id(participant_id)
        .await?;

    Ok(participant)
}

#[tracing::instrument(skip(db))]
pub async fn expect_participant_by_id(
    db: &dyn Database,
    participant_id: ParticipantId,
) -> Result<Participant, Error> {
    let participant = db
        .participants()
        .fetch_participant_by_id(participant_id)
        .await?
        .ok_or(Error::ParticipantDoesNotExist { participant_id })?;

    Ok(participant)
}

#[tracing::instrument(skip(db))]
pub async fn set_social_handle(
    db: &dyn Database,
    participant: Participant,
    social_handle: String,
    handle_verified: bool,
) -> Result<Participant, Error> {
    let participant = db
        .participants()
        .update_participant_handle(participant, social_handle, handle_verified)
        .await?;

    Ok(participant)
}

#[tracing::instrument(skip(db))]
pub async fn complete_profile(
    db: &dyn Database,
    participant: Participant,
    profile: Profile,
) -> Result<Participant, Error> {
    let participant = db
        .participants()
        .update_participant_profile(participant, profile)
        .await?;

    Ok(participant)
}

#[tracing::instrument(skip(db))]
pub async fn deactivate_participant(
    db: &dyn Database,
    participant_id: ParticipantId,
) -> Result<Participant, Error> {
    let participant = expect_participant_by_id(db, participant_id).await?;
    let participant = db
        .participants()
        .update_participant_active(participant, false)
        .await?;

    Ok(participant)
}
