use chrono::Utc;

use crate::database::Database;
use crate::error::Error;
use crate::jobs::AssignmentQueue;

use super::{Campaign, CampaignDraft, CampaignId, CampaignStatus};

/// The brand and money fields of a campaign are immutable once created, so
/// they are validated up front; the assignment engine assumes positive
/// numbers and divides by `estimated_participants`.
fn validate_draft(draft: &CampaignDraft) -> Result<(), Error> {
    if draft.budget < 1 {
        return Err(Error::CampaignBudgetInvalid {
            budget: draft.budget,
        });
    }
    if draft.estimated_participants < 1 {
        return Err(Error::CampaignParticipantTargetInvalid {
            estimated_participants: draft.estimated_participants,
        });
    }
    if draft.duration_hours < 1 {
        return Err(Error::CampaignDurationInvalid {
            duration_hours: draft.duration_hours,
        });
    }

    Ok(())
}

#[tracing::instrument(skip(db, queue))]
pub async fn create_campaign(
    db: &dyn Database,
    queue: &AssignmentQueue,
    draft: CampaignDraft,
) -> Result<Campaign, Error> {
    validate_draft(&draft)?;

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        brand_name: draft.brand_name,
        description: draft.description,
        target_audience: draft.target_audience,
        package: draft.package,
        budget: draft.budget,
        duration_hours: draft.duration_hours,
        estimated_participants: draft.estimated_participants,
        estimated_reach: draft.estimated_reach,
        status: CampaignStatus::Pending,
        participant_ids: vec![],
        total_engagements: 0,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;
    queue.enqueue(campaign.id)?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn complete_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = get_campaign_by_id(db, campaign_id).await?;
    if campaign.status != CampaignStatus::Active {
        return Err(Error::CampaignNotActive {
            campaign_id,
            status: campaign.status,
        });
    }

    let campaign = db
        .campaigns()
        .update_campaign_status(campaign, CampaignStatus::Completed)
        .await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn cancel_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = get_campaign_by_id(db, campaign_id).await?;
    if campaign.status != CampaignStatus::Pending {
        return Err(Error::CampaignNotPending {
            campaign_id,
            status: campaign.status,
        });
    }

    let campaign = db
        .campaigns()
        .update_campaign_status(campaign, CampaignStatus::Cancelled)
        .await?;

    Ok(campaign)
}
