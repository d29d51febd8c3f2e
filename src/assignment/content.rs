use rand::seq::SliceRandom;
use rand::RngCore;

use crate::campaign::Campaign;

use super::Role;

/// Produces the suggested post text for one assignment. Swappable so a
/// smarter generator can replace the canned templates.
pub trait ContentGenerator: Send + Sync {
    fn suggest(&self, campaign: &Campaign, role: Role, rng: &mut dyn RngCore) -> String;
}

const INITIATOR_TEMPLATES: [&str; 4] = [
    "Just tried {brand} and honestly did not expect to like it this much.",
    "Okay, {brand} might be onto something here. Anyone else seen this?",
    "Been hearing about {brand} everywhere, finally checked it out. Worth it.",
    "{brand} just dropped something new and I have thoughts.",
];

const REPLIER_TEMPLATES: [&str; 4] = [
    "Same here, {brand} has been surprisingly good lately.",
    "Was skeptical about {brand} at first but it won me over.",
    "Glad someone said it, {brand} deserves more attention.",
    "Picked it up last week, {brand} did not disappoint.",
];

const RETWEETER_TEMPLATES: [&str; 4] = [
    "This. {brand} is the real deal.",
    "Sharing because {brand} actually delivers.",
    "Worth a look if you haven't tried {brand} yet.",
    "Passing this along, {brand} earned it.",
];

const QUOTER_TEMPLATES: [&str; 4] = [
    "Adding my two cents: {brand} lives up to this.",
    "Can confirm, my experience with {brand} was the same.",
    "Quoting because {brand} genuinely surprised me.",
    "This matches what I saw from {brand} too.",
];

pub struct TemplateContentGenerator;

impl TemplateContentGenerator {
    fn templates(role: Role) -> &'static [&'static str] {
        match role {
            Role::Initiator => &INITIATOR_TEMPLATES,
            Role::Replier => &REPLIER_TEMPLATES,
            Role::Retweeter => &RETWEETER_TEMPLATES,
            Role::Quoter => &QUOTER_TEMPLATES,
        }
    }
}

impl ContentGenerator for TemplateContentGenerator {
    fn suggest(&self, campaign: &Campaign, role: Role, rng: &mut dyn RngCore) -> String {
        let templates = TemplateContentGenerator::templates(role);
        let template = templates.choose(rng).unwrap_or(&templates[0]);

        template.replace("{brand}", &campaign.brand_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{CampaignId, CampaignStatus, PackageTier};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn suggestions_mention_the_brand() {
        let now = Utc::now();
        let campaign = Campaign {
            id: CampaignId::new(),
            brand_name: "Lagoon Coffee".to_string(),
            description: String::new(),
            target_audience: String::new(),
            package: PackageTier::Starter,
            budget: 1000,
            duration_hours: 24,
            estimated_participants: 5,
            estimated_reach: 500,
            status: CampaignStatus::Pending,
            participant_ids: vec![],
            total_engagements: 0,
            created_at: now,
            modified_at: now,
        };
        let generator = TemplateContentGenerator;
        let mut rng = StdRng::seed_from_u64(3);

        for &role in Role::ALL.iter() {
            let content = generator.suggest(&campaign, role, &mut rng);
            assert!(content.contains("Lagoon Coffee"));
        }
    }
}
