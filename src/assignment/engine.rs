use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::campaign::Campaign;
use crate::cooldown::Cooldown;
use crate::participant::{Participant, ParticipantId, Profile};

use super::content::ContentGenerator;
use super::{Assignment, AssignmentId, AssignmentStatus, EngagementMetrics, Role};

/// Share of the campaign budget distributed as base earnings. Profile
/// bonuses are paid on top of this allocation, not carved out of it.
pub const PAYOUT_POOL_SHARE: f64 = 0.65;

const RECENCY_SATURATION: f64 = 10.0;
const PROFILE_COMPLETION_BONUS: f64 = 1.0;
const PROFILE_BONUS_RATE: f64 = 0.15;
const MATCH_BONUS_RATE: f64 = 0.10;
const HIGH_AUTHENTICITY_FLOOR: i32 = 80;
const UNCONDITIONAL_MATCH_AUTHENTICITY: i32 = 85;
const SCHEDULE_JITTER_SECONDS: i64 = 3600;

/// Candidates must hold a verified handle, still be active, and be past any
/// cooldown window. An empty result is a valid outcome, not an error.
pub fn eligible_participants(
    pool: Vec<Participant>,
    cooldowns: &HashMap<ParticipantId, Cooldown>,
    now: DateTime<Utc>,
) -> Vec<Participant> {
    pool.into_iter()
        .filter(|participant| participant.active && participant.handle_verified)
        .filter(|participant| {
            cooldowns
                .get(&participant.id)
                .map(|cooldown| !cooldown.is_active(now))
                .unwrap_or(true)
        })
        .collect()
}

/// Fairness-weighted quality score. Recency saturates around ten idle days
/// so long-dormant participants don't outrank everyone forever, and the
/// profile bonus is deliberately small enough to never dominate the ranking.
pub fn score_participant(participant: &Participant, now: DateTime<Utc>) -> f64 {
    let idle_hours = (now - participant.last_active_at()).num_seconds() as f64 / 3600.0;
    let recency_score = (idle_hours / 24.0).min(RECENCY_SATURATION);
    let engagement_score = participant.engagement_rate;

    let mut score = 0.6 * engagement_score + 0.4 * recency_score;
    if participant.profile_completed {
        score += PROFILE_COMPLETION_BONUS;
    }

    score
}

/// Top-`target` by descending score. The sort is stable, so tied scores
/// keep their pool order.
pub fn select_participants(
    pool: Vec<Participant>,
    target: usize,
    now: DateTime<Utc>,
) -> Vec<Participant> {
    let mut scored: Vec<(f64, Participant)> = pool
        .into_iter()
        .map(|participant| (score_participant(&participant, now), participant))
        .collect();
    scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(target);

    scored.into_iter().map(|(_, participant)| participant).collect()
}

struct RoleTargets {
    initiator: usize,
    replier: usize,
    retweeter: usize,
    quoter: usize,
}

/// Per-role counts are rounded up, which can overflow the batch size by a
/// few slots; the replier target absorbs up to half the excess and the
/// retweeter target the rest, each kept at one slot minimum.
fn role_targets(total: usize) -> RoleTargets {
    let target_for = |role: Role| (total as f64 * role.target_share()).ceil() as usize;
    let mut targets = RoleTargets {
        initiator: target_for(Role::Initiator),
        replier: target_for(Role::Replier),
        retweeter: target_for(Role::Retweeter),
        quoter: target_for(Role::Quoter),
    };

    let sum = targets.initiator + targets.replier + targets.retweeter + targets.quoter;
    if sum > total {
        let mut excess = sum - total;
        let replier_cut = (excess / 2).min(targets.replier.saturating_sub(1));
        targets.replier -= replier_cut;
        excess -= replier_cut;
        let retweeter_cut = excess.min(targets.retweeter.saturating_sub(1));
        targets.retweeter -= retweeter_cut;
    }

    targets
}

fn prefers_initiator(participant: &Participant) -> bool {
    participant.profile_completed
        && participant
            .authenticity_score()
            .map(|score| score > HIGH_AUTHENTICITY_FLOOR)
            .unwrap_or(false)
}

/// Partitions a batch into roles. The scarce initiator slots go to
/// high-authenticity completed profiles first; every other slot is drawn
/// from a shuffled role list so assignment order carries no bias.
pub fn distribute_roles<R: Rng>(
    selected: Vec<Participant>,
    rng: &mut R,
) -> Vec<(Participant, Role)> {
    let total = selected.len();
    if total == 0 {
        return Vec::new();
    }

    let targets = role_targets(total);

    let (mut initiators, mut rest): (Vec<Participant>, Vec<Participant>) =
        selected.into_iter().partition(prefers_initiator);
    if initiators.len() > targets.initiator {
        rest.extend(initiators.split_off(targets.initiator));
    }

    let mut open_roles: Vec<Role> = Vec::with_capacity(total);
    open_roles.extend(std::iter::repeat(Role::Initiator).take(targets.initiator - initiators.len()));
    open_roles.extend(std::iter::repeat(Role::Replier).take(targets.replier));
    open_roles.extend(std::iter::repeat(Role::Retweeter).take(targets.retweeter));
    open_roles.extend(std::iter::repeat(Role::Quoter).take(targets.quoter));
    open_roles.shuffle(rng);

    let mut assignments: Vec<(Participant, Role)> = initiators
        .into_iter()
        .map(|participant| (participant, Role::Initiator))
        .collect();
    let mut roles = open_roles.into_iter();
    for participant in rest {
        // reconciliation keeps at least as many roles as participants, but
        // the floor-of-one rule can leave the list short on tiny batches
        assignments.push((participant, roles.next().unwrap_or(Role::Replier)));
    }

    assignments
}

/// Absolute posting time: role stagger plus up to an hour of jitter, never
/// before the batch itself was created.
pub fn schedule_time<R: Rng>(role: Role, now: DateTime<Utc>, rng: &mut R) -> DateTime<Utc> {
    let jitter = rng.gen_range(0..SCHEDULE_JITTER_SECONDS);

    now + Duration::minutes(role.base_delay_minutes()) + Duration::seconds(jitter)
}

pub fn estimated_earning(campaign: &Campaign, role: Role) -> i64 {
    let payout_pool = campaign.budget as f64 * PAYOUT_POOL_SHARE;
    let per_participant = payout_pool / campaign.estimated_participants as f64;
    let multiplier = role.payout_weight() as f64 / Role::Replier.payout_weight() as f64;

    (per_participant * multiplier).round() as i64
}

/// Bonuses stack additively on the base earning: +15% for a completed
/// profile, +10% more when the persona is high-authenticity and matches
/// the campaign. Applied at notification time, not at scheduling time.
pub fn earning_with_bonuses(campaign: &Campaign, participant: &Participant, base: i64) -> i64 {
    let profile = match &participant.profile {
        Some(profile) if participant.profile_completed => profile,
        _ => return base,
    };

    let mut earning = base + (base as f64 * PROFILE_BONUS_RATE).round() as i64;
    if profile.authenticity_score > HIGH_AUTHENTICITY_FLOOR && is_campaign_match(campaign, profile)
    {
        earning += (base as f64 * MATCH_BONUS_RATE).round() as i64;
    }

    earning
}

/// A persona matches a campaign on any of: shared keywords between the
/// audience text and the persona label, spending power aligned with the
/// package tier, or an authenticity score above 85 outright.
pub fn is_campaign_match(campaign: &Campaign, profile: &Profile) -> bool {
    if profile.authenticity_score > UNCONDITIONAL_MATCH_AUTHENTICITY {
        return true;
    }
    if campaign.package.aligned_spending_power() == profile.spending_power {
        return true;
    }

    let audience = keywords(&campaign.target_audience);
    keywords(&profile.label)
        .iter()
        .any(|word| audience.contains(word))
}

// short filler words would make every audience "match"
fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() >= 3)
        .map(|word| word.to_lowercase())
        .collect()
}

/// One batch of scheduled assignments for an eligible pool. Pure given
/// `now` and `rng`; persistence and notification stay with the caller.
pub fn build_batch<R: Rng>(
    campaign: &Campaign,
    eligible: Vec<Participant>,
    content: &dyn ContentGenerator,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Assignment> {
    let target = (campaign.estimated_participants as usize).min(eligible.len());
    let selected = select_participants(eligible, target, now);
    let pairs = distribute_roles(selected, rng);

    pairs
        .into_iter()
        .map(|(participant, role)| {
            let profile_match = participant
                .profile
                .as_ref()
                .map(|profile| is_campaign_match(campaign, profile))
                .unwrap_or(false);

            Assignment {
                id: AssignmentId::new(),
                campaign_id: campaign.id,
                participant_id: participant.id,
                role,
                scheduled_at: schedule_time(role, now, rng),
                status: AssignmentStatus::Pending,
                suggested_content: content.suggest(campaign, role, rng),
                estimated_earning: estimated_earning(campaign, role),
                actual_earning: None,
                profile_match,
                metrics: EngagementMetrics::default(),
                created_at: now,
                modified_at: now,
            }
        })
        .collect()
}
