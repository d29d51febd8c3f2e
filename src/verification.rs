use async_trait::async_trait;
use tracing::debug;

use crate::error::Error;

/// Checks whether a participant's public bio contains the verification code
/// we handed them during onboarding.
#[async_trait]
pub trait BioVerifier: Send + Sync {
    async fn bio_contains(&self, handle: &str, code: &str) -> Result<bool, Error>;
}

/// Affirms every check without looking at a real bio.
// TODO: replace with a client that fetches the live bio and substring-matches
// the code once API credentials are provisioned
pub struct SimulatedBioVerifier;

#[async_trait]
impl BioVerifier for SimulatedBioVerifier {
    async fn bio_contains(&self, handle: &str, code: &str) -> Result<bool, Error> {
        debug!("simulating bio verification for @{} with code {}", handle, code);

        Ok(true)
    }
}
