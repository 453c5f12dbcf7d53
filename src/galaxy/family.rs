//! Family - lineage shared by its members

use serde::{Deserialize, Serialize};

use crate::core::types::CitizenId;
use crate::galaxy::citizen::Citizen;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Family {
    pub name: String,
    pub members: Vec<CitizenId>,
    /// 0.01-1.0
    pub reputation: f32,
}

impl Family {
    pub fn new(name: String, reputation: f32) -> Self {
        Self {
            name,
            members: Vec::new(),
            reputation: reputation.clamp(0.01, 1.0),
        }
    }

    pub fn add_member(&mut self, id: CitizenId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    pub fn remove_member(&mut self, id: CitizenId) {
        self.members.retain(|m| *m != id);
    }

    /// Recompute reputation from the living members' wealth and trades
    pub fn update_reputation<'a>(&mut self, members: impl Iterator<Item = &'a Citizen>) {
        let living: Vec<&Citizen> = members.filter(|c| c.alive).collect();
        if living.is_empty() {
            return;
        }

        let avg_wealth = living.iter().map(|c| c.wealth).sum::<f32>() / living.len() as f32;
        let mut reputation = self.reputation + (avg_wealth - 100.0) * 0.0005;

        for member in &living {
            if member.profession.is_reputable() {
                reputation += 0.005;
            } else if member.profession.is_high_risk() {
                reputation -= 0.01;
            }
        }

        self.reputation = reputation.clamp(0.01, 1.0);
    }
}
