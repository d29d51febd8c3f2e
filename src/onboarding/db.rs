use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::ReplaceOptions;

use crate::database::MongoOnboardingStore;
use crate::error::Error;
use crate::participant::ParticipantId;

use super::OnboardingSession;

#[async_trait]
pub trait OnboardingStore: Send + Sync {
    async fn upsert_session(&self, session: &OnboardingSession) -> Result<(), Error>;

    async fn fetch_sessions(&self) -> Result<Vec<OnboardingSession>, Error>;

    async fn fetch_session_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<OnboardingSession>, Error>;
}

pub async fn initialize(_db: &mongodb::Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
impl OnboardingStore for MongoOnboardingStore {
    #[tracing::instrument(skip(self))]
    async fn upsert_session(&self, session: &OnboardingSession) -> Result<(), Error> {
        self.replace_one(
            bson::doc! { "_id": session.participant_id },
            session,
            ReplaceOptions::builder().upsert(true).build(),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_sessions(&self) -> Result<Vec<OnboardingSession>, Error> {
        let sessions: Vec<OnboardingSession> =
            self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(sessions)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_session_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Option<OnboardingSession>, Error> {
        let session: Option<OnboardingSession> = self
            .find_one(bson::doc! { "_id": participant_id }, None)
            .await?;

        Ok(session)
    }
}
