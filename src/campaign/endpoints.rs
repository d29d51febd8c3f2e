use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentBody;
use crate::database::Database;
use crate::error::Error;
use crate::jobs::AssignmentQueue;
use crate::participant::ParticipantId;

use super::{manager, Campaign, CampaignDraft, CampaignId, CampaignStatus, PackageTier};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateCampaignBody {
    pub brand_name: String,
    pub description: String,
    pub target_audience: String,
    pub package: PackageTier,
    pub budget: i64,
    pub duration_hours: i64,
    pub estimated_participants: i64,
    pub estimated_reach: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignBody {
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
    pub assignments: Vec<AssignmentBody>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub async fn render(db: &dyn Database, campaign: Campaign) -> Result<CampaignBody, Error> {
        let assignments = db
            .assignments()
            .fetch_assignments_by_campaign(campaign.id)
            .await?;

        Ok(CampaignBody {
            id: campaign.id,
            brand_name: campaign.brand_name,
            description: campaign.description,
            target_audience: campaign.target_audience,
            package: campaign.package,
            budget: campaign.budget,
            duration_hours: campaign.duration_hours,
            estimated_participants: campaign.estimated_participants,
            estimated_reach: campaign.estimated_reach,
            status: campaign.status,
            participant_ids: campaign.participant_ids,
            total_engagements: campaign.total_engagements,
            assignments: assignments.into_iter().map(AssignmentBody::render).collect(),
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        })
    }
}

#[post("/campaigns")]
#[tracing::instrument(skip(db, queue))]
async fn create_campaign(
    db: Data<Box<dyn Database>>,
    queue: Data<AssignmentQueue>,
    body: Json<CreateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let body = body.into_inner();

    let draft = CampaignDraft {
        brand_name: body.brand_name,
        description: body.description,
        target_audience: body.target_audience,
        package: body.package,
        budget: body.budget,
        duration_hours: body.duration_hours,
        estimated_participants: body.estimated_participants,
        estimated_reach: body.estimated_reach,
    };
    let campaign = manager::create_campaign(db.as_ref().as_ref(), &queue, draft).await?;

    Ok(Json(CampaignBody {
        id: campaign.id,
        brand_name: campaign.brand_name,
        description: campaign.description,
        target_audience: campaign.target_audience,
        package: campaign.package,
        budget: campaign.budget,
        duration_hours: campaign.duration_hours,
        estimated_participants: campaign.estimated_participants,
        estimated_reach: campaign.estimated_reach,
        status: campaign.status,
        participant_ids: vec![],
        total_engagements: 0,
        assignments: vec![],
        created_at: campaign.created_at,
        modified_at: campaign.modified_at,
    }))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(db: Data<Box<dyn Database>>) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(db.as_ref().as_ref()).await?;

    let body = stream::iter(campaigns)
        .then(|campaign| CampaignBody::render(db.as_ref().as_ref(), campaign))
        .try_collect()
        .await?;

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::get_campaign_by_id(db.as_ref().as_ref(), campaign_id).await?;

    Ok(Json(CampaignBody::render(db.as_ref().as_ref(), campaign).await?))
}

#[post("/campaigns/{campaign_id}/complete")]
#[tracing::instrument(skip(db))]
async fn complete_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::complete_campaign(db.as_ref().as_ref(), campaign_id).await?;

    Ok(Json(CampaignBody::render(db.as_ref().as_ref(), campaign).await?))
}

#[post("/campaigns/{campaign_id}/cancel")]
#[tracing::instrument(skip(db))]
async fn cancel_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::cancel_campaign(db.as_ref().as_ref(), campaign_id).await?;

    Ok(Json(CampaignBody::render(db.as_ref().as_ref(), campaign).await?))
}
