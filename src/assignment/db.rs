use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson;

use crate::campaign::CampaignId;
use crate::database::MongoAssignmentStore;
use crate::error::Error;

use super::{Assignment, AssignmentId, AssignmentStatus, EngagementMetrics};

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn insert_assignments(&self, assignments: &[Assignment]) -> Result<(), Error>;

    async fn fetch_assignments_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Assignment>, Error>;

    async fn fetch_assignment_by_id(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Option<Assignment>, Error>;

    async fn update_assignment_status(
        &self,
        assignment: Assignment,
        status: AssignmentStatus,
    ) -> Result<Assignment, Error>;

    async fn update_assignment_metrics(
        &self,
        assignment: Assignment,
        metrics: EngagementMetrics,
        actual_earning: Option<i64>,
    ) -> Result<Assignment, Error>;
}

pub async fn initialize(_db: &mongodb::Database) -> Result<(), Error> {
    Ok(())
}

#[async_trait]
impl AssignmentStore for MongoAssignmentStore {
    #[tracing::instrument(skip(self, assignments))]
    async fn insert_assignments(&self, assignments: &[Assignment]) -> Result<(), Error> {
        if assignments.is_empty() {
            return Ok(());
        }
        self.insert_many(assignments, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_assignments_by_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Assignment>, Error> {
        let assignments: Vec<Assignment> = self
            .find(bson::doc! { "campaign_id": campaign_id }, None)
            .await?
            .try_collect()
            .await?;

        Ok(assignments)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_assignment_by_id(
        &self,
        assignment_id: AssignmentId,
    ) -> Result<Option<Assignment>, Error> {
        let assignment: Option<Assignment> = self
            .find_one(bson::doc! { "_id": assignment_id }, None)
            .await?;

        Ok(assignment)
    }

    #[tracing::instrument(skip(self))]
    async fn update_assignment_status(
        &self,
        mut assignment: Assignment,
        status: AssignmentStatus,
    ) -> Result<Assignment, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(assignment.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);
        let new_status = bson::to_bson(&status)?;

        let result = self
            .update_one(
                bson::doc! { "_id": assignment.id, "modified_at": old_modified_at },
                bson::doc! { "$set": { "status": new_status, "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        assignment.modified_at = now;
        assignment.status = status;

        Ok(assignment)
    }

    #[tracing::instrument(skip(self))]
    async fn update_assignment_metrics(
        &self,
        mut assignment: Assignment,
        metrics: EngagementMetrics,
        actual_earning: Option<i64>,
    ) -> Result<Assignment, Error> {
        let now = Utc::now();
        let old_modified_at = bson::DateTime::from_chrono(assignment.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);
        let new_metrics = bson::to_document(&metrics)?;
        let new_actual_earning = bson::to_bson(&actual_earning)?;

        let result = self
            .update_one(
                bson::doc! { "_id": assignment.id, "modified_at": old_modified_at },
                bson::doc! { "$set": {
                    "metrics": new_metrics,
                    "actual_earning": new_actual_earning,
                    "modified_at": new_modified_at,
                } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        assignment.modified_at = now;
        assignment.metrics = metrics;
        assignment.actual_earning = actual_earning;

        Ok(assignment)
    }
}
