use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::campaign::{CampaignId, CampaignStatus};
use crate::cooldown;
use crate::database::Database;
use crate::error::Error;
use crate::notification::Notifier;
use crate::participant::{Participant, ParticipantId};

use super::content::ContentGenerator;
use super::{engine, Assignment, AssignmentId, AssignmentStatus, EngagementMetrics};

/// Pause between notification sends; the messaging side rate-limits us.
const NOTIFY_THROTTLE_MS: u64 = 200;

/// Runs the whole assignment pipeline for one pending campaign: filter,
/// score, select, distribute, schedule, persist, then cool down and notify
/// the chosen participants. Notification is best-effort; everything up to
/// and including the cooldown writes must succeed.
#[tracing::instrument(skip(db, notifier, content))]
pub async fn run_assignment_batch(
    db: &dyn Database,
    notifier: &dyn Notifier,
    content: &dyn ContentGenerator,
    campaign_id: CampaignId,
) -> Result<(), Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;
    if campaign.status != CampaignStatus::Pending {
        return Err(Error::CampaignNotPending {
            campaign_id,
            status: campaign.status,
        });
    }

    let now = Utc::now();
    let pool = db.participants().fetch_participants().await?;
    let cooldowns = db
        .cooldowns()
        .fetch_cooldowns()
        .await?
        .into_iter()
        .map(|cooldown| (cooldown.participant_id, cooldown))
        .collect();

    let eligible = engine::eligible_participants(pool, &cooldowns, now);
    if eligible.is_empty() {
        info!(
            "no eligible participants for campaign {}; skipping assignment",
            campaign_id
        );
        return Ok(());
    }

    let by_id: HashMap<ParticipantId, Participant> = eligible
        .iter()
        .map(|participant| (participant.id, participant.clone()))
        .collect();

    let assignments = {
        let mut rng = rand::thread_rng();
        engine::build_batch(&campaign, eligible, content, now, &mut rng)
    };
    let assigned_ids: Vec<ParticipantId> = assignments
        .iter()
        .map(|assignment| assignment.participant_id)
        .collect();
    let batch_size = assigned_ids.len();

    db.assignments().insert_assignments(&assignments).await?;
    let campaign = db
        .campaigns()
        .update_campaign_assigned(campaign, assigned_ids.clone())
        .await?;

    for &participant_id in &assigned_ids {
        db.participants()
            .update_participant_last_participation(participant_id, now)
            .await?;
        cooldown::manager::apply_cooldown(db, participant_id, batch_size, now).await?;
    }

    info!(
        "assigned {} participants to campaign {}",
        batch_size, campaign_id
    );

    for assignment in &assignments {
        let participant = match by_id.get(&assignment.participant_id) {
            Some(participant) => participant,
            None => continue,
        };
        let earning =
            engine::earning_with_bonuses(&campaign, participant, assignment.estimated_earning);
        let message = format!(
            "You're in! {} needs a {:?} on {}. Suggested post: \"{}\". Estimated payout: {}.",
            campaign.brand_name,
            assignment.role,
            assignment.scheduled_at.format("%b %e at %H:%M UTC"),
            assignment.suggested_content,
            earning,
        );

        if let Err(err) = notifier.notify(participant, &message).await {
            warn!(
                "failed to notify participant {} for campaign {}: {}",
                participant.id, campaign_id, err
            );
        }

        tokio::time::sleep(std::time::Duration::from_millis(NOTIFY_THROTTLE_MS)).await;
    }

    Ok(())
}

#[tracing::instrument(skip(db))]
pub async fn get_assignments_by_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Vec<Assignment>, Error> {
    let assignments = db
        .assignments()
        .fetch_assignments_by_campaign(campaign_id)
        .await?;

    Ok(assignments)
}

#[tracing::instrument(skip(db))]
pub async fn expect_assignment_by_id(
    db: &dyn Database,
    assignment_id: AssignmentId,
) -> Result<Assignment, Error> {
    let assignment = db
        .assignments()
        .fetch_assignment_by_id(assignment_id)
        .await?
        .ok_or(Error::AssignmentDoesNotExist { assignment_id })?;

    Ok(assignment)
}

#[tracing::instrument(skip(db))]
pub async fn update_assignment_status(
    db: &dyn Database,
    assignment_id: AssignmentId,
    status: AssignmentStatus,
) -> Result<Assignment, Error> {
    let assignment = expect_assignment_by_id(db, assignment_id).await?;
    let assignment = db
        .assignments()
        .update_assignment_status(assignment, status)
        .await?;

    Ok(assignment)
}

/// Records collector numbers for one assignment and rolls the engagement
/// delta up into the campaign counter.
#[tracing::instrument(skip(db))]
pub async fn record_assignment_metrics(
    db: &dyn Database,
    assignment_id: AssignmentId,
    metrics: EngagementMetrics,
    actual_earning: Option<i64>,
) -> Result<Assignment, Error> {
    let assignment = expect_assignment_by_id(db, assignment_id).await?;
    let engagement_delta = metrics.engagement_total() - assignment.metrics.engagement_total();

    let assignment = db
        .assignments()
        .update_assignment_metrics(assignment, metrics, actual_earning)
        .await?;
    if engagement_delta != 0 {
        db.campaigns()
            .increment_campaign_engagements(assignment.campaign_id, engagement_delta)
            .await?;
    }

    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::content::TemplateContentGenerator;
    use crate::campaign::{Campaign, PackageTier};
    use crate::database::test::MockDatabase;
    use crate::participant::DEFAULT_ENGAGEMENT_RATE;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn notify(&self, _participant: &Participant, _message: &str) -> Result<(), Error> {
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify(&self, _participant: &Participant, _message: &str) -> Result<(), Error> {
            Err(Error::ExistentialState("chat is down".to_string()))
        }
    }

    fn pending_campaign(campaign_id: CampaignId) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: campaign_id,
            brand_name: "Lagoon Coffee".to_string(),
            description: "Cold brew launch".to_string(),
            target_audience: "coffee lovers".to_string(),
            package: PackageTier::Standard,
            budget: 225000,
            duration_hours: 48,
            estimated_participants: 40,
            estimated_reach: 120000,
            status: CampaignStatus::Pending,
            participant_ids: vec![],
            total_engagements: 0,
            created_at: now,
            modified_at: now,
        }
    }

    fn verified_participant() -> Participant {
        let now = Utc::now();
        Participant {
            id: ParticipantId::new(),
            display_name: "Sam".to_string(),
            chat_id: 7,
            social_handle: Some("sam_posts".to_string()),
            handle_verified: true,
            active: true,
            engagement_rate: DEFAULT_ENGAGEMENT_RATE,
            last_participation_at: None,
            registered_at: now - chrono::Duration::days(30),
            created_at: now - chrono::Duration::days(30),
            modified_at: now - chrono::Duration::days(30),
            profile: None,
            profile_completed: false,
        }
    }

    #[tokio::test]
    async fn empty_pool_skips_the_batch_and_leaves_campaign_pending() {
        let mut db = MockDatabase::new();
        let test_campaign_id = CampaignId::new();
        db.campaigns.on_fetch_campaign_by_id =
            Box::new(move |campaign_id| Ok(Some(pending_campaign(campaign_id))));
        db.participants.on_fetch_participants = Box::new(|| Ok(vec![]));
        db.cooldowns.on_fetch_cooldowns = Box::new(|| Ok(vec![]));
        // any insert or campaign update would hit an unmocked hook and panic

        let result = run_assignment_batch(
            &db,
            &NullNotifier,
            &TemplateContentGenerator,
            test_campaign_id,
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn batch_persists_assignments_and_cooldowns_for_the_pool() {
        let mut db = MockDatabase::new();
        let test_campaign_id = CampaignId::new();
        let pool: Vec<Participant> = (0..5).map(|_| verified_participant()).collect();
        let pool_clone = pool.clone();

        db.campaigns.on_fetch_campaign_by_id =
            Box::new(move |campaign_id| Ok(Some(pending_campaign(campaign_id))));
        db.participants.on_fetch_participants = Box::new(move || Ok(pool_clone.clone()));
        db.cooldowns.on_fetch_cooldowns = Box::new(|| Ok(vec![]));

        let inserted = Arc::new(Mutex::new(0usize));
        let inserted_clone = Arc::clone(&inserted);
        db.assignments.on_insert_assignments = Box::new(move |assignments| {
            *inserted_clone.lock().unwrap() = assignments.len();
            Ok(())
        });

        let activated_with = Arc::new(Mutex::new(Vec::new()));
        let activated_clone = Arc::clone(&activated_with);
        db.campaigns.on_update_campaign_assigned =
            Box::new(move |mut campaign, participant_ids| {
                *activated_clone.lock().unwrap() = participant_ids.clone();
                campaign.status = CampaignStatus::Active;
                campaign.participant_ids = participant_ids;
                Ok(campaign)
            });

        let touched = Arc::new(Mutex::new(0usize));
        let touched_clone = Arc::clone(&touched);
        db.participants.on_update_participant_last_participation = Box::new(move |_, _| {
            *touched_clone.lock().unwrap() += 1;
            Ok(())
        });

        let cooled = Arc::new(Mutex::new(0usize));
        let cooled_clone = Arc::clone(&cooled);
        db.cooldowns.on_upsert_cooldown = Box::new(move |cooldown| {
            *cooled_clone.lock().unwrap() += 1;
            assert!(cooldown.duration_hours >= 12 && cooldown.duration_hours <= 72);
            Ok(())
        });

        let result = run_assignment_batch(
            &db,
            &NullNotifier,
            &TemplateContentGenerator,
            test_campaign_id,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(*inserted.lock().unwrap(), 5);
        assert_eq!(activated_with.lock().unwrap().len(), 5);
        assert_eq!(*touched.lock().unwrap(), 5);
        assert_eq!(*cooled.lock().unwrap(), 5);
    }

    #[tokio::test]
    async fn batch_refuses_campaigns_that_are_not_pending() {
        let mut db = MockDatabase::new();
        let test_campaign_id = CampaignId::new();
        db.campaigns.on_fetch_campaign_by_id = Box::new(move |campaign_id| {
            let mut campaign = pending_campaign(campaign_id);
            campaign.status = CampaignStatus::Active;
            Ok(Some(campaign))
        });

        let result = run_assignment_batch(
            &db,
            &NullNotifier,
            &TemplateContentGenerator,
            test_campaign_id,
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::CampaignNotPending {
                campaign_id: test_campaign_id,
                status: CampaignStatus::Active,
            }
        );
    }

    #[tokio::test]
    async fn notification_failures_do_not_abort_the_batch() {
        let mut db = MockDatabase::new();
        let test_campaign_id = CampaignId::new();
        let pool = vec![verified_participant()];
        db.campaigns.on_fetch_campaign_by_id =
            Box::new(move |campaign_id| Ok(Some(pending_campaign(campaign_id))));
        db.participants.on_fetch_participants = Box::new(move || Ok(pool.clone()));
        db.cooldowns.on_fetch_cooldowns = Box::new(|| Ok(vec![]));
        db.assignments.on_insert_assignments = Box::new(|_| Ok(()));
        db.campaigns.on_update_campaign_assigned = Box::new(|mut campaign, participant_ids| {
            campaign.status = CampaignStatus::Active;
            campaign.participant_ids = participant_ids;
            Ok(campaign)
        });
        db.participants.on_update_participant_last_participation = Box::new(|_, _| Ok(()));
        db.cooldowns.on_upsert_cooldown = Box::new(|_| Ok(()));

        let result = run_assignment_batch(
            &db,
            &FailingNotifier,
            &TemplateContentGenerator,
            test_campaign_id,
        )
        .await;

        assert!(result.is_ok());
    }
}
