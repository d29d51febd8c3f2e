use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::UpdateOptions;

use crate::database::MongoCooldownStore;
use crate::error::Error;
use crate::participant::ParticipantId;

use super::Cooldown;

#[async_trait]
pub trait CooldownStore: Send + Sync {
    async fn upsert_cooldown(&self, cooldown: &Cooldown) -> Result<(), Error>;

    async fn fetch_cooldowns(&self) -> Result<Vec<Cooldown>, Error>;

    async fn fetch_cooldown_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Cooldown>, Error>;
}

pub async fn initialize(_db: &mongodb::Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
impl CooldownStore for MongoCooldownStore {
    #[tracing::instrument(skip(self))]
    async fn upsert_cooldown(&self, cooldown: &Cooldown) -> Result<(), Error> {
        let new_until = bson::DateTime::from_chrono(cooldown.until);
        let new_created_at = bson::DateTime::from_chrono(cooldown.created_at);

        self.update_one(
            bson::doc! { "_id": cooldown.participant_id },
            bson::doc! { "$set": {
                "until": new_until,
                "duration_hours": cooldown.duration_hours,
                "created_at": new_created_at,
            } },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_cooldowns(&self) -> Result<Vec<Cooldown>, Error> {
        let cooldowns: Vec<Cooldown> = self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(cooldowns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_cooldown_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<Cooldown>, Error> {
        let cooldown: Option<Cooldown> = self
            .find_one(bson::doc! { "_id": participant_id }, None)
            .await?;

        Ok(cooldown)
    }
}
