use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::error;

use crate::assignment::content::ContentGenerator;
use crate::assignment::manager::run_assignment_batch;
use crate::campaign::CampaignId;
use crate::database::Database;
use crate::error::Error;
use crate::notification::Notifier;

/// A failed batch is retried until this many attempts have been made.
pub const MAX_ATTEMPTS: u32 = 3;

const RETRY_DELAY_SECONDS: u64 = 1;

/// One unit of deferred work: build the assignment batch for a campaign.
#[derive(Clone, Debug)]
pub struct AssignmentJob {
    pub campaign_id: CampaignId,
    pub attempt: u32,
}

/// Producer half of the assignment queue. Campaign creation enqueues here
/// instead of running the batch inline, so the request returns immediately
/// and a crash between enqueue and execution only costs a retry.
#[derive(Clone)]
pub struct AssignmentQueue {
    sender: UnboundedSender<AssignmentJob>,
}

impl AssignmentQueue {
    pub fn new() -> (AssignmentQueue, UnboundedReceiver<AssignmentJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        (AssignmentQueue { sender }, receiver)
    }

    pub fn enqueue(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.push(AssignmentJob {
            campaign_id,
            attempt: 0,
        })
    }

    fn requeue(&self, job: AssignmentJob) -> Result<(), Error> {
        self.push(AssignmentJob {
            attempt: job.attempt + 1,
            ..job
        })
    }

    fn push(&self, job: AssignmentJob) -> Result<(), Error> {
        self.sender
            .send(job)
            .map_err(|_| Error::ExistentialState("assignment queue is closed".to_string()))
    }
}

/// Drains the queue one job at a time. Failed jobs go back on the queue
/// with a bumped attempt counter, so delivery is at-least-once up to the
/// attempt cap.
pub fn spawn_worker(
    db: Box<dyn Database>,
    queue: AssignmentQueue,
    notifier: Arc<dyn Notifier>,
    content: Arc<dyn ContentGenerator>,
    mut receiver: UnboundedReceiver<AssignmentJob>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            let result = run_assignment_batch(
                db.as_ref(),
                notifier.as_ref(),
                content.as_ref(),
                job.campaign_id,
            )
            .await;

            if let Err(err) = result {
                if job.attempt + 1 < MAX_ATTEMPTS {
                    error!(
                        "assignment batch for {} failed on attempt {}: {}; requeueing",
                        job.campaign_id,
                        job.attempt + 1,
                        err
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                    if queue.requeue(job).is_err() {
                        break;
                    }
                } else {
                    error!(
                        "assignment batch for {} failed after {} attempts: {}; giving up",
                        job.campaign_id, MAX_ATTEMPTS, err
                    );
                }
            }
        }
    })
}
