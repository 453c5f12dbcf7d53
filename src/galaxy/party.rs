//! Political parties competing in city elections

use serde::{Deserialize, Serialize};

use crate::core::types::Ideology;
use crate::galaxy::citizen::Citizen;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Draws extra support from content citizens
    StableDevelopment,
    /// Draws extra support from miserable citizens
    Reform,
    InterstellarExpansion,
    ReturnToOrigins,
}

impl Platform {
    /// Whether a citizen at this happiness gives the platform a bonus
    pub fn appeals_to(&self, happiness: f32) -> bool {
        match self {
            Platform::StableDevelopment => happiness > 0.7,
            Platform::Reform => happiness < 0.3,
            Platform::InterstellarExpansion | Platform::ReturnToOrigins => false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoliticalParty {
    pub name: String,
    pub ideology: Ideology,
    pub platform: Platform,
    pub support: f32,
}

impl PoliticalParty {
    pub fn new(name: impl Into<String>, ideology: Ideology, platform: Platform) -> Self {
        Self {
            name: name.into(),
            ideology,
            platform,
            support: 0.0,
        }
    }

    /// Tally support from eligible voters, capped at their number
    pub fn calculate_support(&mut self, voters: &[&Citizen]) {
        self.support = 0.0;
        let eligible: Vec<&&Citizen> = voters.iter().filter(|c| c.alive).collect();
        if eligible.is_empty() {
            return;
        }

        for citizen in &eligible {
            if citizen.ideology == self.ideology {
                self.support += 1.0;
            }
            if self.platform.appeals_to(citizen.happiness) {
                self.support += 0.5;
            }
        }

        self.support = self.support.min(eligible.len() as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CitizenId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn voter(id: u32, ideology: Ideology, happiness: f32) -> Citizen {
        let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
        let mut c = Citizen::generate(CitizenId(id), format!("V{}", id), "Tokyo", &mut rng);
        c.ideology = ideology;
        c.happiness = happiness;
        c
    }

    #[test]
    fn test_support_counts_matches_and_platform_bonus() {
        let voters = [
            voter(1, Ideology::Conservative, 0.8),
            voter(2, Ideology::Conservative, 0.5),
            voter(3, Ideology::Liberal, 0.9),
        ];
        let refs: Vec<&Citizen> = voters.iter().collect();
        let mut party = PoliticalParty::new("Unity", Ideology::Conservative, Platform::StableDevelopment);
        party.calculate_support(&refs);
        // 2 matches + 2 happy voters * 0.5
        assert!((party.support - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_support_capped_at_voter_count() {
        let voters = [voter(1, Ideology::Liberal, 0.1)];
        let refs: Vec<&Citizen> = voters.iter().collect();
        let mut party = PoliticalParty::new("Reform", Ideology::Liberal, Platform::Reform);
        party.calculate_support(&refs);
        assert_eq!(party.support, 1.0);
    }

    #[test]
    fn test_no_voters_no_support() {
        let mut party = PoliticalParty::new("Reform", Ideology::Liberal, Platform::Reform);
        party.support = 4.0;
        party.calculate_support(&[]);
        assert_eq!(party.support, 0.0);
    }
}
