use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::{self, CampaignId};
use crate::database::Database;
use crate::error::Error;
use crate::participant::ParticipantId;

use super::{manager, Assignment, AssignmentId, AssignmentStatus, EngagementMetrics, Role};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AssignmentBody {
    pub id: AssignmentId,
    pub campaign_id: CampaignId,
    pub participant_id: ParticipantId,
    pub role: Role,
    pub scheduled_at: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub suggested_content: String,
    pub estimated_earning: i64,
    pub actual_earning: Option<i64>,
    pub profile_match: bool,
    pub metrics: EngagementMetrics,
}

impl AssignmentBody {
    pub fn render(assignment: Assignment) -> AssignmentBody {
        AssignmentBody {
            id: assignment.id,
            campaign_id: assignment.campaign_id,
            participant_id: assignment.participant_id,
            role: assignment.role,
            scheduled_at: assignment.scheduled_at,
            status: assignment.status,
            suggested_content: assignment.suggested_content,
            estimated_earning: assignment.estimated_earning,
            actual_earning: assignment.actual_earning,
            profile_match: assignment.profile_match,
            metrics: assignment.metrics,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateAssignmentStatusBody {
    pub status: AssignmentStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RecordMetricsBody {
    pub likes: i64,
    pub retweets: i64,
    pub replies: i64,
    pub impressions: i64,
    pub actual_earning: Option<i64>,
}

#[get("/campaigns/{campaign_id}/assignments")]
#[tracing::instrument(skip(db))]
async fn get_assignments_in_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<Vec<AssignmentBody>>, Error> {
    let campaign_id = params.into_inner();

    let campaign = campaign::manager::get_campaign_by_id(db.as_ref().as_ref(), campaign_id).await?;
    let assignments =
        manager::get_assignments_by_campaign(db.as_ref().as_ref(), campaign.id).await?;

    let body = assignments.into_iter().map(AssignmentBody::render).collect();

    Ok(Json(body))
}

#[post("/assignments/{assignment_id}/status")]
#[tracing::instrument(skip(db))]
async fn update_assignment_status(
    db: Data<Box<dyn Database>>,
    params: Path<AssignmentId>,
    body: Json<UpdateAssignmentStatusBody>,
) -> Result<Json<AssignmentBody>, Error> {
    let assignment_id = params.into_inner();
    let body = body.into_inner();

    let assignment =
        manager::update_assignment_status(db.as_ref().as_ref(), assignment_id, body.status).await?;

    Ok(Json(AssignmentBody::render(assignment)))
}

#[post("/assignments/{assignment_id}/metrics")]
#[tracing::instrument(skip(db))]
async fn record_assignment_metrics(
    db: Data<Box<dyn Database>>,
    params: Path<AssignmentId>,
    body: Json<RecordMetricsBody>,
) -> Result<Json<AssignmentBody>, Error> {
    let assignment_id = params.into_inner();
    let body = body.into_inner();

    let metrics = EngagementMetrics {
        likes: body.likes,
        retweets: body.retweets,
        replies: body.replies,
        impressions: body.impressions,
    };
    let assignment = manager::record_assignment_metrics(
        db.as_ref().as_ref(),
        assignment_id,
        metrics,
        body.actual_earning,
    )
    .await?;

    Ok(Json(AssignmentBody::render(assignment)))
}
