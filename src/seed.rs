use chrono::{Duration, Utc};

use crate::campaign::{Campaign, CampaignStatus, PackageTier};
use crate::database::Database;
use crate::error::Error;
use crate::participant::{Participant, ParticipantId, Profile, SpendingPower, DEFAULT_ENGAGEMENT_RATE};

pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.drop().await?;

    let campaign_id = "CPN-3B6A0FD2-41C7-4C78-9E1D-50A30F42D210".parse().unwrap();
    let participant1_id: ParticipantId =
        "PCT-9D3A64BE-11E0-4E57-8F4D-C7A10E93A5B1".parse().unwrap();
    let participant2_id: ParticipantId =
        "PCT-5F0C2E88-7D44-4A9B-BB6B-2E91D4C07F36".parse().unwrap();

    let now = Utc::now();

    let mut participants = vec![
        Participant {
            id: participant1_id,
            display_name: "Nkechi".to_string(),
            chat_id: 1001,
            social_handle: Some("nkechi_daily".to_string()),
            handle_verified: true,
            active: true,
            engagement_rate: 7.5,
            last_participation_at: Some(now - Duration::days(4)),
            registered_at: now - Duration::days(120),
            created_at: now - Duration::days(120),
            modified_at: now,
            profile: Some(Profile {
                label: "foodie and coffee lover".to_string(),
                spending_power: SpendingPower::Medium,
                authenticity_score: 88,
                recommended_types: vec!["food".to_string(), "lifestyle".to_string()],
            }),
            profile_completed: true,
        },
        Participant {
            id: participant2_id,
            display_name: "Tunde".to_string(),
            chat_id: 1002,
            social_handle: Some("tunde_tweets".to_string()),
            handle_verified: true,
            active: true,
            engagement_rate: 4.2,
            last_participation_at: None,
            registered_at: now - Duration::days(45),
            created_at: now - Duration::days(45),
            modified_at: now,
            profile: Some(Profile {
                label: "tech reviewer".to_string(),
                spending_power: SpendingPower::High,
                authenticity_score: 72,
                recommended_types: vec!["tech".to_string()],
            }),
            profile_completed: true,
        },
        // registered but never finished verification
        Participant {
            id: ParticipantId::new(),
            display_name: "Amara".to_string(),
            chat_id: 1003,
            social_handle: Some("amara_a".to_string()),
            handle_verified: false,
            active: true,
            engagement_rate: DEFAULT_ENGAGEMENT_RATE,
            last_participation_at: None,
            registered_at: now - Duration::days(2),
            created_at: now - Duration::days(2),
            modified_at: now - Duration::days(2),
            profile: None,
            profile_completed: false,
        },
    ];

    for n in 0..5 {
        participants.push(Participant {
            id: ParticipantId::new(),
            display_name: format!("Seed Participant {}", n + 1),
            chat_id: 2000 + n,
            social_handle: Some(format!("seed_participant_{}", n + 1)),
            handle_verified: true,
            active: true,
            engagement_rate: DEFAULT_ENGAGEMENT_RATE,
            last_participation_at: Some(now - Duration::days(n + 1)),
            registered_at: now - Duration::days(60),
            created_at: now - Duration::days(60),
            modified_at: now,
            profile: None,
            profile_completed: false,
        });
    }

    let campaign = Campaign {
        id: campaign_id,
        brand_name: "Lagoon Coffee".to_string(),
        description: "Launch buzz for the new cold brew line".to_string(),
        target_audience: "coffee lovers, students, young professionals".to_string(),
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
    };

    for participant in &participants {
        db.participants().insert_participant(participant).await?;
    }
    db.campaigns().insert_campaign(&campaign).await?;

    Ok(())
}
