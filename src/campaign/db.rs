use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson;

use crate::database::MongoCampaignStore;
use crate::error::Error;
use crate::participant::ParticipantId;

use super::{Campaign, CampaignId, CampaignStatus};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn update_campaign_status(
        &self,
        campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error>;

    async fn update_campaign_assigned(
        &self,
        campaign: Campaign,
        participant_ids: Vec<ParticipantId>,
    ) -> Result<Campaign, Error>;

    async fn increment_campaign_engagements(
        &self,
        campaign_id: CampaignId,
        amount: i64,
    ) -> Result<(), Error>;
}

pub async fn initialize(_db: &mongodb::Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = self.find(bson::doc! {}, None).await?.try_collect().await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> =
            self.find_one(bson::doc! { "_id": campaign_id }, None).await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_status(
        &self,
        mut campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(campaign.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);
        let new_status = bson::to_bson(&status)?;

        let result = self
            .update_one(
                bson::doc! { "_id": campaign.id, "modified_at": old_modified_at },
                bson::doc! { "$set": { "status": new_status, "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        campaign.modified_at = now;
        campaign.status = status;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_assigned(
        &self,
        mut campaign: Campaign,
        participant_ids: Vec<ParticipantId>,
    ) -> Result<Campaign, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(campaign.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);
        let new_status = bson::to_bson(&CampaignStatus::Active)?;
        let new_participants = bson::to_bson(&participant_ids)?;

        let result = self
            .update_one(
                bson::doc! { "_id": campaign.id, "modified_at": old_modified_at },
                bson::doc! { "$set": {
                    "status": new_status,
                    "participant_ids": new_participants,
                    "modified_at": new_modified_at,
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        campaign.modified_at = now;
        campaign.status = CampaignStatus::Active;
        campaign.participant_ids = participant_ids;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_campaign_engagements(
        &self,
        campaign_id: CampaignId,
        amount: i64,
    ) -> Result<(), Error> {
        self.update_one(
            bson::doc! { "_id": campaign_id },
            bson::doc! { "$inc": { "total_engagements": amount } },
            None,
        )
        .await?;

        Ok(())
    }
}
