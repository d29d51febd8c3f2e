use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::database::Database;
use crate::error::Error;
use crate::participant::{self, ParticipantId, Profile, SpendingPower};
use crate::verification::BioVerifier;

use super::{OnboardingSession, OnboardingState, ProfileDraft, ProfileStep};

const SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Advances one participant's onboarding conversation by one message and
/// returns the reply to send back. Unknown input re-prompts without
/// changing state.
#[tracing::instrument(skip(db, verifier, text))]
pub async fn handle_message(
    db: &dyn Database,
    verifier: &dyn BioVerifier,
    participant_id: ParticipantId,
    text: &str,
    now: DateTime<Utc>,
) -> Result<String, Error> {
    let participant = participant::manager::expect_participant_by_id(db, participant_id).await?;
    if !participant.active {
        return Err(Error::ParticipantInactive { participant_id });
    }

    let session = db
        .onboarding()
        .fetch_session_by_participant(participant_id)
        .await?
        .unwrap_or(OnboardingSession {
            participant_id,
            state: OnboardingState::Idle,
            updated_at: now,
        });

    let text = text.trim();
    let (next_state, reply) = match session.state {
        OnboardingState::Idle => {
            if text.eq_ignore_ascii_case("join") {
                (
                    OnboardingState::AwaitingHandle,
                    "Welcome aboard! What's your X handle? You can include or skip the @."
                        .to_string(),
                )
            } else {
                (
                    OnboardingState::Idle,
                    "Send \"join\" to start earning from brand campaigns.".to_string(),
                )
            }
        }
        OnboardingState::AwaitingHandle => {
            let handle = text.trim_start_matches('@').to_string();
            if handle.is_empty() {
                (
                    OnboardingState::AwaitingHandle,
                    "That doesn't look like a handle. What's your X handle?".to_string(),
                )
            } else {
                let code = {
                    let mut rng = rand::thread_rng();
                    format!("AMP-{:05}", rng.gen_range(10000..100000))
                };
                participant::manager::set_social_handle(db, participant, handle.clone(), false)
                    .await?;
                let reply = format!(
                    "Got it, @{}. Add the code {} anywhere in your bio, then send \"done\".",
                    handle, code
                );
                (OnboardingState::AwaitingBioUpdate { code }, reply)
            }
        }
        OnboardingState::AwaitingBioUpdate { code } => {
            if text.eq_ignore_ascii_case("done") {
                let handle = participant.social_handle.clone().ok_or(
                    Error::ParticipantHandleMissing { participant_id },
                )?;
                if verifier.bio_contains(&handle, &code).await? {
                    participant::manager::set_social_handle(db, participant, handle, true).await?;
                    (
                        OnboardingState::AwaitingProfileAnswer {
                            step: ProfileStep::Label,
                            draft: ProfileDraft::default(),
                        },
                        "Verified! A few quick questions to boost your payouts. \
                         How would you describe yourself in a few words?"
                            .to_string(),
                    )
                } else {
                    let reply = format!(
                        "Couldn't find {} in your bio yet. Double-check and send \"done\" again.",
                        code
                    );
                    (OnboardingState::AwaitingBioUpdate { code }, reply)
                }
            } else {
                let reply = format!(
                    "Still waiting on your bio update. Add {} to your bio and send \"done\".",
                    code
                );
                (OnboardingState::AwaitingBioUpdate { code }, reply)
            }
        }
        OnboardingState::AwaitingProfileAnswer { step, draft } => {
            advance_profile(db, participant, step, draft, text).await?
        }
    };

    db.onboarding()
        .upsert_session(&OnboardingSession {
            participant_id,
            state: next_state,
            updated_at: now,
        })
        .await?;

    Ok(reply)
}

async fn advance_profile(
    db: &dyn Database,
    participant: crate::participant::Participant,
    step: ProfileStep,
    mut draft: ProfileDraft,
    text: &str,
) -> Result<(OnboardingState, String), Error> {
    match step {
        ProfileStep::Label => {
            if text.is_empty() {
                return Ok((
                    OnboardingState::AwaitingProfileAnswer { step, draft },
                    "A few words about yourself, e.g. \"sneakerhead and gym rat\".".to_string(),
                ));
            }
            draft.label = Some(text.to_string());
            Ok((
                OnboardingState::AwaitingProfileAnswer {
                    step: ProfileStep::SpendingPower,
                    draft,
                },
                "Nice. How would you rate your spending power: low, medium, or high?".to_string(),
            ))
        }
        ProfileStep::SpendingPower => match parse_spending_power(text) {
            Some(spending_power) => {
                draft.spending_power = Some(spending_power);
                Ok((
                    OnboardingState::AwaitingProfileAnswer {
                        step: ProfileStep::RecommendedTypes,
                        draft,
                    },
                    "Last one: what kinds of campaigns suit you? Comma-separated, \
                     e.g. \"fashion, tech\"."
                        .to_string(),
                ))
            }
            None => Ok((
                OnboardingState::AwaitingProfileAnswer { step, draft },
                "Please answer low, medium, or high.".to_string(),
            )),
        },
        ProfileStep::RecommendedTypes => {
            let recommended_types: Vec<String> = text
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
            let label = draft.label.clone().ok_or_else(|| {
                Error::ExistentialState("onboarding draft lost its label".to_string())
            })?;
            let spending_power = draft.spending_power.ok_or_else(|| {
                Error::ExistentialState("onboarding draft lost its spending power".to_string())
            })?;

            let profile = Profile {
                authenticity_score: authenticity_estimate(&label, &recommended_types),
                label,
                spending_power,
                recommended_types,
            };
            participant::manager::complete_profile(db, participant, profile).await?;

            Ok((
                OnboardingState::Idle,
                "All set! Your profile is complete and you'll earn a bonus on every match."
                    .to_string(),
            ))
        }
    }
}

fn parse_spending_power(text: &str) -> Option<SpendingPower> {
    match text.to_lowercase().as_str() {
        "low" => Some(SpendingPower::Low),
        "medium" => Some(SpendingPower::Medium),
        "high" => Some(SpendingPower::High),
        _ => None,
    }
}

/// Rough 0-100 estimate of how genuine the persona looks, based on how
/// much the participant shared. Self-reported, so it tops out below the
/// unconditional-match threshold's neighborhood at 95.
fn authenticity_estimate(label: &str, recommended_types: &[String]) -> i32 {
    let label_signal = if label.split_whitespace().count() > 1 {
        15
    } else {
        5
    };
    let types_signal = 10 * recommended_types.len().min(3) as i32;

    (50 + label_signal + types_signal).min(95)
}

/// Resets conversations that have been waiting on a reply for too long.
#[tracing::instrument(skip(db))]
pub async fn expire_stale_sessions(db: &dyn Database, now: DateTime<Utc>) -> Result<(), Error> {
    let sessions = db.onboarding().fetch_sessions().await?;
    for session in sessions {
        if session.is_stale(now) {
            info!(
                "onboarding session for {} timed out; resetting to idle",
                session.participant_id
            );
            db.onboarding()
                .upsert_session(&OnboardingSession {
                    participant_id: session.participant_id,
                    state: OnboardingState::Idle,
                    updated_at: now,
                })
                .await?;
        }
    }

    Ok(())
}

pub fn spawn_session_sweeper(db: Box<dyn Database>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECONDS));
        loop {
            ticker.tick().await;
            if let Err(err) = expire_stale_sessions(db.as_ref(), Utc::now()).await {
                warn!("failed to expire onboarding sessions: {}", err);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::MockDatabase;
    use crate::participant::{Participant, DEFAULT_ENGAGEMENT_RATE};
    use crate::verification::SimulatedBioVerifier;
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    fn registered_participant(participant_id: ParticipantId) -> Participant {
        let now = Utc::now();
        Participant {
            id: participant_id,
            display_name: "Ada".to_string(),
            chat_id: 52,
            social_handle: None,
            handle_verified: false,
            active: true,
            engagement_rate: DEFAULT_ENGAGEMENT_RATE,
            last_participation_at: None,
            registered_at: now,
            created_at: now,
            modified_at: now,
            profile: None,
            profile_completed: false,
        }
    }

    fn session(participant_id: ParticipantId, state: OnboardingState) -> OnboardingSession {
        OnboardingSession {
            participant_id,
            state,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn join_moves_idle_sessions_to_awaiting_handle() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        db.participants.on_fetch_participant_by_id =
            Box::new(move |id| Ok(Some(registered_participant(id))));
        db.onboarding.on_fetch_session_by_participant = Box::new(|_| Ok(None));
        let saved_state = Arc::new(Mutex::new(None));
        let saved_state_clone = Arc::clone(&saved_state);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            *saved_state_clone.lock().unwrap() = Some(session.state.clone());
            Ok(())
        });

        let reply = handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "join",
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(reply.contains("handle"));
        assert_eq!(
            saved_state.lock().unwrap().clone(),
            Some(OnboardingState::AwaitingHandle)
        );
    }

    #[tokio::test]
    async fn unknown_input_while_idle_only_reprompts() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        db.participants.on_fetch_participant_by_id =
            Box::new(move |id| Ok(Some(registered_participant(id))));
        db.onboarding.on_fetch_session_by_participant = Box::new(|_| Ok(None));
        let saved_state = Arc::new(Mutex::new(None));
        let saved_state_clone = Arc::clone(&saved_state);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            *saved_state_clone.lock().unwrap() = Some(session.state.clone());
            Ok(())
        });

        let reply = handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "hello?",
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(reply.contains("join"));
        assert_eq!(
            saved_state.lock().unwrap().clone(),
            Some(OnboardingState::Idle)
        );
    }

    #[tokio::test]
    async fn submitting_a_handle_issues_a_verification_code() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        db.participants.on_fetch_participant_by_id =
            Box::new(move |id| Ok(Some(registered_participant(id))));
        db.participants.on_update_participant_handle =
            Box::new(|mut participant, social_handle, handle_verified| {
                assert_eq!(social_handle, "ada_posts");
                assert!(!handle_verified);
                participant.social_handle = Some(social_handle);
                Ok(participant)
            });
        db.onboarding.on_fetch_session_by_participant = Box::new(move |id| {
            Ok(Some(session(id, OnboardingState::AwaitingHandle)))
        });
        let saved_state = Arc::new(Mutex::new(None));
        let saved_state_clone = Arc::clone(&saved_state);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            *saved_state_clone.lock().unwrap() = Some(session.state.clone());
            Ok(())
        });

        let reply = handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "@ada_posts",
            Utc::now(),
        )
        .await
        .unwrap();

        let state = saved_state.lock().unwrap().clone().unwrap();
        match state {
            OnboardingState::AwaitingBioUpdate { code } => {
                assert!(code.starts_with("AMP-"));
                assert!(reply.contains(&code));
            }
            other => panic!("expected AwaitingBioUpdate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn done_with_matching_bio_starts_profile_questions() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        db.participants.on_fetch_participant_by_id = Box::new(move |id| {
            let mut participant = registered_participant(id);
            participant.social_handle = Some("ada_posts".to_string());
            Ok(Some(participant))
        });
        db.participants.on_update_participant_handle =
            Box::new(|mut participant, social_handle, handle_verified| {
                assert!(handle_verified);
                participant.social_handle = Some(social_handle);
                participant.handle_verified = true;
                Ok(participant)
            });
        db.onboarding.on_fetch_session_by_participant = Box::new(move |id| {
            Ok(Some(session(
                id,
                OnboardingState::AwaitingBioUpdate {
                    code: "AMP-12345".to_string(),
                },
            )))
        });
        let saved_state = Arc::new(Mutex::new(None));
        let saved_state_clone = Arc::clone(&saved_state);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            *saved_state_clone.lock().unwrap() = Some(session.state.clone());
            Ok(())
        });

        handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "done",
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(
            saved_state.lock().unwrap().clone(),
            Some(OnboardingState::AwaitingProfileAnswer {
                step: ProfileStep::Label,
                draft: ProfileDraft::default(),
            })
        );
    }

    #[tokio::test]
    async fn final_profile_answer_completes_the_persona() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        db.participants.on_fetch_participant_by_id =
            Box::new(move |id| Ok(Some(registered_participant(id))));
        let completed = Arc::new(Mutex::new(false));
        let completed_clone = Arc::clone(&completed);
        db.participants.on_update_participant_profile =
            Box::new(move |mut participant, profile| {
                *completed_clone.lock().unwrap() = true;
                assert_eq!(profile.label, "sneakerhead and gym rat");
                assert_eq!(profile.spending_power, SpendingPower::Medium);
                assert_eq!(profile.recommended_types, vec!["fashion", "fitness"]);
                assert!(profile.authenticity_score > 50);
                participant.profile = Some(profile);
                participant.profile_completed = true;
                Ok(participant)
            });
        db.onboarding.on_fetch_session_by_participant = Box::new(move |id| {
            Ok(Some(session(
                id,
                OnboardingState::AwaitingProfileAnswer {
                    step: ProfileStep::RecommendedTypes,
                    draft: ProfileDraft {
                        label: Some("sneakerhead and gym rat".to_string()),
                        spending_power: Some(SpendingPower::Medium),
                    },
                },
            )))
        });
        let saved_state = Arc::new(Mutex::new(None));
        let saved_state_clone = Arc::clone(&saved_state);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            *saved_state_clone.lock().unwrap() = Some(session.state.clone());
            Ok(())
        });

        handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "fashion, fitness",
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(*completed.lock().unwrap(), "profile was not completed");
        assert_eq!(
            saved_state.lock().unwrap().clone(),
            Some(OnboardingState::Idle)
        );
    }

    #[tokio::test]
    async fn unparseable_spending_power_reprompts_in_place() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        let draft = ProfileDraft {
            label: Some("gamer".to_string()),
            spending_power: None,
        };
        let draft_clone = draft.clone();
        db.participants.on_fetch_participant_by_id =
            Box::new(move |id| Ok(Some(registered_participant(id))));
        db.onboarding.on_fetch_session_by_participant = Box::new(move |id| {
            Ok(Some(session(
                id,
                OnboardingState::AwaitingProfileAnswer {
                    step: ProfileStep::SpendingPower,
                    draft: draft_clone.clone(),
                },
            )))
        });
        let saved_state = Arc::new(Mutex::new(None));
        let saved_state_clone = Arc::clone(&saved_state);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            *saved_state_clone.lock().unwrap() = Some(session.state.clone());
            Ok(())
        });

        let reply = handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "loads",
            Utc::now(),
        )
        .await
        .unwrap();

        assert!(reply.contains("low, medium, or high"));
        assert_eq!(
            saved_state.lock().unwrap().clone(),
            Some(OnboardingState::AwaitingProfileAnswer {
                step: ProfileStep::SpendingPower,
                draft,
            })
        );
    }

    #[tokio::test]
    async fn inactive_participants_cannot_onboard() {
        let mut db = MockDatabase::new();
        let participant_id = ParticipantId::new();
        db.participants.on_fetch_participant_by_id = Box::new(move |id| {
            let mut participant = registered_participant(id);
            participant.active = false;
            Ok(Some(participant))
        });

        let result = handle_message(
            &db,
            &SimulatedBioVerifier,
            participant_id,
            "join",
            Utc::now(),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::ParticipantInactive { participant_id }
        );
    }

    #[tokio::test]
    async fn sweeper_resets_only_stale_waiting_sessions() {
        let mut db = MockDatabase::new();
        let now = Utc::now();
        let stale_id = ParticipantId::new();
        let fresh_id = ParticipantId::new();
        let idle_id = ParticipantId::new();
        db.onboarding.on_fetch_sessions = Box::new(move || {
            Ok(vec![
                OnboardingSession {
                    participant_id: stale_id,
                    state: OnboardingState::AwaitingHandle,
                    updated_at: now - Duration::minutes(20),
                },
                OnboardingSession {
                    participant_id: fresh_id,
                    state: OnboardingState::AwaitingHandle,
                    updated_at: now - Duration::minutes(5),
                },
                OnboardingSession {
                    participant_id: idle_id,
                    state: OnboardingState::Idle,
                    updated_at: now - Duration::minutes(60),
                },
            ])
        });
        let reset = Arc::new(Mutex::new(Vec::new()));
        let reset_clone = Arc::clone(&reset);
        db.onboarding.on_upsert_session = Box::new(move |session| {
            assert_eq!(session.state, OnboardingState::Idle);
            reset_clone.lock().unwrap().push(session.participant_id);
            Ok(())
        });

        expire_stale_sessions(&db, now).await.unwrap();

        assert_eq!(reset.lock().unwrap().clone(), vec![stale_id]);
    }
}
