use std::sync::Arc;

use actix_web::web::{self, Data, FormConfig, JsonConfig, PathConfig, QueryConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod assignment;
pub mod campaign;
pub mod cooldown;
pub mod database;
pub mod error;
pub mod jobs;
pub mod notification;
pub mod onboarding;
pub mod participant;
pub mod seed;
pub mod typedid;
pub mod verification;

pub use crate::campaign::{CampaignBody, CreateCampaignBody};
pub use crate::error::Error;

use crate::assignment::content::{ContentGenerator, TemplateContentGenerator};
use crate::database::{Database, MongoDatabase};
use crate::jobs::AssignmentQueue;
use crate::notification::{LogNotifier, Notifier};
use crate::verification::{BioVerifier, SimulatedBioVerifier};

/// Boots the whole server: storage, the assignment worker, the onboarding
/// session sweeper, and the HTTP surface. Blocks until shutdown.
pub fn run(seed_data: bool) -> Result<(), Error> {
    actix_web::rt::System::new().block_on(serve(seed_data))
}

async fn serve(seed_data: bool) -> Result<(), Error> {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    info!("connecting to db: {}", uri);
    let client = Client::with_uri_str(&uri).await?;
    let db = MongoDatabase::initialize(client.database("amplify")).await?;

    if seed_data {
        seed::seed(&db).await?;
    }

    let (queue, receiver) = AssignmentQueue::new();
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let content: Arc<dyn ContentGenerator> = Arc::new(TemplateContentGenerator);
    let verifier: Arc<dyn BioVerifier> = Arc::new(SimulatedBioVerifier);
    jobs::spawn_worker(
        Box::new(db.clone()),
        queue.clone(),
        notifier,
        content,
        receiver,
    );
    onboarding::manager::spawn_session_sweeper(Box::new(db.clone()));

    HttpServer::new(move || {
        App::new()
            .app_data(JsonConfig::default().error_handler(|err, _req| {
                // format json errors with custom format
                Error::InvalidJson(err).into()
            }))
            .app_data(PathConfig::default().error_handler(|err, _req| {
                // format path errors with custom format
                Error::InvalidPath(err).into()
            }))
            .app_data(FormConfig::default().error_handler(|err, _req| {
                // format form errors with custom format
                Error::InvalidForm(err).into()
            }))
            .app_data(QueryConfig::default().error_handler(|err, _req| {
                // format query errors with custom format
                Error::InvalidQuery(err).into()
            }))
            .app_data(Data::new(Box::new(db.clone()) as Box<dyn Database>))
            .app_data(Data::new(queue.clone()))
            .app_data(Data::new(verifier.clone()))
            .wrap(TracingLogger::default())
            .service(participant::endpoints::register_participant)
            .service(participant::endpoints::get_participants)
            .service(participant::endpoints::get_participant_by_id)
            .service(participant::endpoints::deactivate_participant)
            .service(onboarding::endpoints::handle_participant_message)
            .service(campaign::endpoints::create_campaign)
            .service(campaign::endpoints::get_campaigns)
            .service(campaign::endpoints::get_campaign_by_id)
            .service(campaign::endpoints::complete_campaign)
            .service(campaign::endpoints::cancel_campaign)
            .service(assignment::endpoints::get_assignments_in_campaign)
            .service(assignment::endpoints::update_assignment_status)
            .service(assignment::endpoints::record_assignment_metrics)
            .default_service(web::to(|| async { Error::PathDoesNotExist.error_response() }))
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await?;

    Ok(())
}
