use actix_web::web::{Data, Json, Path};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{manager, Participant, ParticipantId, Profile};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RegisterParticipantBody {
    pub display_name: String,
    pub chat_id: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ParticipantBody {
    pub id: ParticipantId,
    pub display_name: String,
    pub social_handle: Option<String>,
    pub handle_verified: bool,
    pub active: bool,
    pub engagement_rate: f64,
    pub last_participation_at: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
    pub profile: Option<Profile>,
    pub profile_completed: bool,
}

impl ParticipantBody {
    pub fn render(participant: Participant) -> ParticipantBody {
        ParticipantBody {
            id: participant.id,
            display_name: participant.display_name,
            social_handle: participant.social_handle,
            handle_verified: participant.handle_verified,
            active: participant.active,
            engagement_rate: participant.engagement_rate,
            last_participation_at: participant.last_participation_at,
            registered_at: participant.registered_at,
            profile: participant.profile,
            profile_completed: participant.profile_completed,
        }
    }
}

#[post("/participants")]
#[tracing::instrument(skip(db))]
async fn register_participant(
    db: Data<Box<dyn Database>>,
    body: Json<RegisterParticipantBody>,
) -> Result<Json<ParticipantBody>, Error> {
    let body = body.into_inner();

    let participant =
        manager::register_participant(db.as_ref().as_ref(), body.display_name, body.chat_id)
            .await?;

    Ok(Json(ParticipantBody::render(participant)))
}

#[get("/participants")]
#[tracing::instrument(skip(db))]
async fn get_participants(
    db: Data<Box<dyn Database>>,
) -> Result<Json<Vec<ParticipantBody>>, Error> {
    let participants = manager::get_participants(db.as_ref().as_ref()).await?;

    let body = participants
        .into_iter()
        .map(ParticipantBody::render)
        .collect();

    Ok(Json(body))
}

#[get("/participants/{participant_id}")]
#[tracing::instrument(skip(db))]
async fn get_participant_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<ParticipantId>,
) -> Result<Json<ParticipantBody>, Error> {
    let participant_id = params.into_inner();

    let participant =
        manager::expect_participant_by_id(db.as_ref().as_ref(), participant_id).await?;

    Ok(Json(ParticipantBody::render(participant)))
}

#[post("/participants/{participant_id}/deactivate")]
#[tracing::instrument(skip(db))]
async fn deactivate_participant(
    db: Data<Box<dyn Database>>,
    params: Path<ParticipantId>,
) -> Result<Json<ParticipantBody>, Error> {
    let participant_id = params.into_inner();

    let participant =
        manager::deactivate_participant(db.as_ref().as_ref(), participant_id).await?;

    Ok(Json(ParticipantBody::render(participant)))
}
