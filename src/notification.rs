use async_trait::async_trait;
use tracing::info;

use crate::error::Error;
use crate::participant::Participant;

/// Delivers a message to a participant's chat. Delivery is best-effort from
/// the caller's point of view; a failed send never fails a batch.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, participant: &Participant, message: &str) -> Result<(), Error>;
}

/// Stand-in delivery that writes to the log instead of a chat channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, participant: &Participant, message: &str) -> Result<(), Error> {
        info!(
            "notifying participant {} (chat {}): {}",
            participant.id, participant.chat_id, message
        );

        Ok(())
    }
}
