use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson;

use crate::database::MongoParticipantStore;
use crate::error::Error;

use super::{Participant, ParticipantId, Profile};

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn insert_participant(&self, participant: &Participant) -> Result<(), Error>;

    async fn fetch_participants(&self) -> Result<Vec<Participant>, Error>;

    async fn fetch_participant_by_id(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Participant>, Error>;

    async fn update_participant_handle(
        &self,
        participant: Participant,
        social_handle: String,
        handle_verified: bool,
    ) -> Result<Participant, Error>;

    async fn update_participant_profile(
        &self,
        participant: Participant,
        profile: Profile,
    ) -> Result<Participant, Error>;

    async fn update_participant_active(
        &self,
        participant: Participant,
        active: bool,
    ) -> Result<Participant, Error>;

    async fn update_participant_last_participation(
        &self,
        participant_id: ParticipantId,
        last_participation_at: DateTime<Utc>,
    ) -> Result<(), Error>;
}

pub async fn initialize(_db: &mongodb::Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
impl ParticipantStore for MongoParticipantStore {
    #[tracing::instrument(skip(self))]
    async fn insert_participant(&self, participant: &Participant) -> Result<(), Error> {
        self.insert_one(participant, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_participants(&self) -> Result<Vec<Participant>, Error> {
        let participants: Vec<Participant> =
            self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(participants)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_participant_by_id(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Participant>, Error> {
        let participant: Option<Participant> = self
            .find_one(bson::doc! { "_id": participant_id }, None)
            .await?;

        Ok(participant)
    }

    #[tracing::instrument(skip(self))]
    async fn update_participant_handle(
        &self,
        mut participant: Participant,
        social_handle: String,
        handle_verified: bool,
    ) -> Result<Participant, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(participant.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": participant.id, "modified_at": old_modified_at },
                bson::doc! { "$set": {
                    "social_handle": &social_handle,
                    "handle_verified": handle_verified,
                    "modified_at": new_modified_at,
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        participant.modified_at = now;
        participant.social_handle = Some(social_handle);
        participant.handle_verified = handle_verified;

        Ok(participant)
    }

    #[tracing::instrument(skip(self))]
    async fn update_participant_profile(
        &self,
        mut participant: Participant,
        profile: Profile,
    ) -> Result<Participant, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(participant.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);
        let new_profile = bson::to_document(&profile)?;

        let result = self
            .update_one(
                bson::doc! { "_id": participant.id, "modified_at": old_modified_at },
                bson::doc! { "$set": {
                    "profile": new_profile,
                    "profile_completed": true,
                    "modified_at": new_modified_at,
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        participant.modified_at = now;
        participant.profile = Some(profile);
        participant.profile_completed = true;

        Ok(participant)
    }

    #[tracing::instrument(skip(self))]
    async fn update_participant_active(
        &self,
        mut participant: Participant,
        active: bool,
    ) -> Result<Participant, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(participant.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": participant.id, "modified_at": old_modified_at },
                bson::doc! { "$set": { "active": active, "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        participant.modified_at = now;
        participant.active = active;

        Ok(participant)
    }

    #[tracing::instrument(skip(self))]
    async fn update_participant_last_participation(
        &self,
        participant_id: ParticipantId,
        last_participation_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let new_modified_at = bson::DateTime::from_chrono(Utc::now());
        let new_last_participation = bson::to_bson(&last_participation_at)?;

        self.update_one(
            bson::doc! { "_id": participant_id },
            bson::doc! { "$set": {
                "last_participation_at": new_last_participation,
                "modified_at": new_modified_at,
            } },
            None,
        )
        .await?;

        Ok(())
    }
}
