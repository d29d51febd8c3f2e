use std::sync::Arc;

use actix_web::web::{Data, Json, Path};
use actix_web::post;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::participant::ParticipantId;
use crate::verification::BioVerifier;

use super::manager;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessageBody {
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessageReplyBody {
    pub reply: String,
}

/// Inbound chat messages from the messaging bridge; the response body is
/// what the bridge should send back to the participant.
#[post("/participants/{participant_id}/messages")]
#[tracing::instrument(skip(db, verifier, body))]
async fn handle_participant_message(
    db: Data<Box<dyn Database>>,
    verifier: Data<Arc<dyn BioVerifier>>,
    params: Path<ParticipantId>,
    body: Json<MessageBody>,
) -> Result<Json<MessageReplyBody>, Error> {
    let participant_id = params.into_inner();
    let body = body.into_inner();

    let reply = manager::handle_message(
        db.as_ref().as_ref(),
        verifier.as_ref().as_ref(),
        participant_id,
        &body.text,
        Utc::now(),
    )
    .await?;

    Ok(Json(MessageReplyBody { reply }))
}
