use chrono::{DateTime, Duration, Utc};

use crate::database::Database;
use crate::error::Error;
use crate::participant::ParticipantId;

use super::Cooldown;

const BASE_COOLDOWN_HOURS: f64 = 24.0;
const MIN_COOLDOWN_HOURS: f64 = 12.0;
const MAX_COOLDOWN_HOURS: f64 = 72.0;
const POOL_SIZE_DIVISOR: f64 = 50.0;

/// Bigger campaigns rest their participants longer, bounded so that a tiny
/// pool still gets a real break and a huge one is not benched for days.
pub fn cooldown_hours(pool_size: usize) -> i64 {
    let size_multiplier = (pool_size as f64 / POOL_SIZE_DIVISOR).min(2.0);
    let hours = BASE_COOLDOWN_HOURS * size_multiplier;

    hours.clamp(MIN_COOLDOWN_HOURS, MAX_COOLDOWN_HOURS) as i64
}

#[tracing::instrument(skip(db))]
pub async fn apply_cooldown(
    db: &dyn Database,
    participant_id: ParticipantId,
    pool_size: usize,
    now: DateTime<Utc>,
) -> Result<Cooldown, Error> {
    let duration_hours = cooldown_hours(pool_size);
    let cooldown = Cooldown {
        participant_id,
        until: now + Duration::hours(duration_hours),
        duration_hours,
        created_at: now,
    };

    db.cooldowns().upsert_cooldown(&cooldown).await?;

    Ok(cooldown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test::MockDatabase;
    use std::sync::{Arc, Mutex};

    #[test]
    fn cooldown_hours_stays_within_bounds_at_extremes() {
        assert_eq!(cooldown_hours(1), 12);
        assert_eq!(cooldown_hours(10000), 48);
    }

    #[test]
    fn cooldown_hours_scales_with_pool_size() {
        assert_eq!(cooldown_hours(25), 12);
        assert_eq!(cooldown_hours(50), 24);
        assert_eq!(cooldown_hours(75), 36);
        assert_eq!(cooldown_hours(100), 48);
    }

    #[tokio::test]
    async fn apply_cooldown_upserts_record_until_the_future() {
        let mut db = MockDatabase::new();
        let called_upsert = Arc::new(Mutex::new(false));
        let called_upsert_clone = Arc::clone(&called_upsert);
        db.cooldowns.on_upsert_cooldown = Box::new(move |cooldown| {
            *called_upsert_clone.lock().unwrap() = true;
            assert_eq!(cooldown.duration_hours, 24);
            Ok(())
        });
        let participant_id = ParticipantId::new();
        let now = Utc::now();

        let cooldown = apply_cooldown(&db, participant_id, 50, now).await.unwrap();

        assert_eq!(cooldown.until, now + Duration::hours(24));
        assert!(cooldown.is_active(now));
        assert!(!cooldown.is_active(now + Duration::hours(25)));
        assert!(
            *called_upsert.lock().unwrap(),
            "db.upsert_cooldown was not called"
        );
    }
}
