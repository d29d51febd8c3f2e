use async_trait::async_trait;
use mongodb::Collection;

use crate::assignment::db::AssignmentStore;
use crate::assignment::Assignment;
use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::cooldown::db::CooldownStore;
use crate::cooldown::Cooldown;
use crate::error::Error;
use crate::onboarding::db::OnboardingStore;
use crate::onboarding::OnboardingSession;
use crate::participant::db::ParticipantStore;
use crate::participant::Participant;

pub type MongoParticipantStore = Collection<Participant>;
pub type MongoCampaignStore = Collection<Campaign>;
pub type MongoAssignmentStore = Collection<Assignment>;
pub type MongoCooldownStore = Collection<Cooldown>;
pub type MongoOnboardingStore = Collection<OnboardingSession>;

/// The engine and managers only ever see this trait; the concrete store is
/// wired up at startup (Mongo in production, closures in tests).
#[async_trait]
pub trait Database: Send + Sync {
    fn participants(&self) -> &dyn ParticipantStore;
    fn campaigns(&self) -> &dyn CampaignStore;
    fn assignments(&self) -> &dyn AssignmentStore;
    fn cooldowns(&self) -> &dyn CooldownStore;
    fn onboarding(&self) -> &dyn OnboardingStore;

    async fn drop(&self) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct MongoDatabase {
    participants: Collection<Participant>,
    campaigns: Collection<Campaign>,
    assignments: Collection<Assignment>,
    cooldowns: Collection<Cooldown>,
    onboarding: Collection<OnboardingSession>,
    db: mongodb::Database,
}

impl MongoDatabase {
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        crate::participant::db::initialize(&db).await?;
        crate::campaign::db::initialize(&db).await?;
        crate::assignment::db::initialize(&db).await?;
        crate::cooldown::db::initialize(&db).await?;
        crate::onboarding::db::initialize(&db).await?;

        Ok(MongoDatabase {
            participants: db.collection("participants"),
            campaigns: db.collection("campaigns"),
            assignments: db.collection("assignments"),
            cooldowns: db.collection("cooldowns"),
            onboarding: db.collection("onboarding_sessions"),
            db,
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn participants(&self) -> &dyn ParticipantStore {
        &self.participants
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    fn assignments(&self) -> &dyn AssignmentStore {
        &self.assignments
    }

    fn cooldowns(&self) -> &dyn CooldownStore {
        &self.cooldowns
    }

    fn onboarding(&self) -> &dyn OnboardingStore {
        &self.onboarding
    }

    async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;

        Ok(())
    }
}
