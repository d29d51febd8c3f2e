use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::assignment::AssignmentId;
use crate::campaign::{CampaignId, CampaignStatus};
use crate::participant::ParticipantId;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    CampaignBudgetInvalid {
        budget: i64,
    },
    CampaignParticipantTargetInvalid {
        estimated_participants: i64,
    },
    CampaignDurationInvalid {
        duration_hours: i64,
    },

    // 404
    PathDoesNotExist,
    CampaignDoesNotExist {
        campaign_id: CampaignId,
    },
    ParticipantDoesNotExist {
        participant_id: ParticipantId,
    },
    AssignmentDoesNotExist {
        assignment_id: AssignmentId,
    },

    // 409
    ConcurrentModificationDetected,
    CampaignNotPending {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },
    CampaignNotActive {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },
    ParticipantInactive {
        participant_id: ParticipantId,
    },
    ParticipantHandleMissing {
        participant_id: ParticipantId,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::InvalidQuery(_) => "E4001003",
            Error::CampaignBudgetInvalid { .. } => "E4001004",
            Error::CampaignParticipantTargetInvalid { .. } => "E4001005",
            Error::CampaignDurationInvalid { .. } => "E4001006",
            Error::PathDoesNotExist => "E4041000",
            Error::CampaignDoesNotExist { .. } => "E4041001",
            Error::ParticipantDoesNotExist { .. } => "E4041002",
            Error::AssignmentDoesNotExist { .. } => "E4041003",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::CampaignNotPending { .. } => "E4091001",
            Error::CampaignNotActive { .. } => "E4091002",
            Error::ParticipantInactive { .. } => "E4091003",
            Error::ParticipantHandleMissing { .. } => "E4091004",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::CampaignBudgetInvalid { .. } => "The campaign budget must be a positive amount",
            Error::CampaignParticipantTargetInvalid { .. } => {
                "The campaign must target at least one participant"
            }
            Error::CampaignDurationInvalid { .. } => {
                "The campaign duration must be at least one hour"
            }
            Error::PathDoesNotExist => "The requested path was not found",
            Error::CampaignDoesNotExist { .. } => "The requested campaign was not found",
            Error::ParticipantDoesNotExist { .. } => "The requested participant was not found",
            Error::AssignmentDoesNotExist { .. } => "The requested assignment was not found",
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::CampaignNotPending { .. } => {
                "The requested campaign is no longer awaiting assignment"
            }
            Error::CampaignNotActive { .. } => "The requested campaign is not active",
            Error::ParticipantInactive { .. } => "The requested participant has been deactivated",
            Error::ParticipantHandleMissing { .. } => {
                "The requested participant has not provided a social handle"
            }
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::CampaignBudgetInvalid { .. } => StatusCode::BAD_REQUEST,
            Error::CampaignParticipantTargetInvalid { .. } => StatusCode::BAD_REQUEST,
            Error::CampaignDurationInvalid { .. } => StatusCode::BAD_REQUEST,
            Error::PathDoesNotExist => StatusCode::NOT_FOUND,
            Error::CampaignDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::ParticipantDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::AssignmentDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::CampaignNotPending { .. } => StatusCode::CONFLICT,
            Error::CampaignNotActive { .. } => StatusCode::CONFLICT,
            Error::ParticipantInactive { .. } => StatusCode::CONFLICT,
            Error::ParticipantHandleMissing { .. } => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
