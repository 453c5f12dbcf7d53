//! City - a settlement on a planet

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{CitizenId, GovernmentType, Specialization};
use crate::galaxy::citizen::GraveRecord;
use crate::galaxy::party::PoliticalParty;

/// Stocks held by a city; none of them ever drops below zero
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub food: f32,
    pub energy: f32,
    pub tax: f32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            food: 100.0,
            energy: 100.0,
            tax: 0.0,
        }
    }
}

impl Resources {
    pub fn add_food(&mut self, delta: f32) {
        self.food = (self.food + delta).max(0.0);
    }

    pub fn add_energy(&mut self, delta: f32) {
        self.energy = (self.energy + delta).max(0.0);
    }

    pub fn add_tax(&mut self, delta: f32) {
        self.tax = (self.tax + delta).max(0.0);
    }

    /// Remove up to `amount` food, returning what was actually removed
    pub fn take_food(&mut self, amount: f32) -> f32 {
        let taken = amount.clamp(0.0, self.food);
        self.food -= taken;
        taken
    }

    /// Remove up to `amount` energy, returning what was actually removed
    pub fn take_energy(&mut self, amount: f32) -> f32 {
        let taken = amount.clamp(0.0, self.energy);
        self.energy -= taken;
        taken
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    /// Living residents; a citizen is listed in exactly one city
    pub citizens: Vec<CitizenId>,
    pub resources: Resources,

    // Per-year counters, reset every tick
    pub birth_count: u32,
    pub death_count: u32,
    pub immigration_count: u32,
    pub emigration_count: u32,

    pub graveyard: Vec<GraveRecord>,
    pub government: GovernmentType,
    pub specialization: Specialization,
    pub mass_movement_active: bool,
    /// Consecutive years with food or energy under the shortage line
    pub shortage_years: u32,
    pub parties: Vec<PoliticalParty>,
    /// Name of the party in power
    pub ruling_party: Option<String>,
    /// Years until the next election
    pub election_timer: u32,
}

impl City {
    pub fn new(name: impl Into<String>, government: GovernmentType, specialization: Specialization) -> Self {
        Self {
            name: name.into(),
            citizens: Vec::new(),
            resources: Resources::default(),
            birth_count: 0,
            death_count: 0,
            immigration_count: 0,
            emigration_count: 0,
            graveyard: Vec::new(),
            government,
            specialization,
            mass_movement_active: false,
            shortage_years: 0,
            parties: Vec::new(),
            ruling_party: None,
            election_timer: 1,
        }
    }

    /// A city with random government, specialization and first election date
    pub fn generate<R: Rng + ?Sized>(name: impl Into<String>, rng: &mut R) -> Self {
        let mut city = Self::new(name, GovernmentType::random(rng), Specialization::random(rng));
        city.election_timer = rng.gen_range(1..=5);
        city
    }

    pub fn population(&self) -> usize {
        self.citizens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty()
    }

    pub fn reset_counters(&mut self) {
        self.birth_count = 0;
        self.death_count = 0;
        self.immigration_count = 0;
        self.emigration_count = 0;
    }

    pub fn has_resident(&self, id: CitizenId) -> bool {
        self.citizens.contains(&id)
    }

    pub fn party(&self, name: &str) -> Option<&PoliticalParty> {
        self.parties.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_never_negative() {
        let mut r = Resources::default();
        r.add_food(-500.0);
        r.add_energy(-1.0);
        r.add_tax(-3.0);
        assert_eq!(r.food, 0.0);
        assert_eq!(r.energy, 99.0);
        assert_eq!(r.tax, 0.0);
        assert_eq!(r.take_energy(1000.0), 99.0);
        assert_eq!(r.energy, 0.0);
    }

    #[test]
    fn test_reset_counters() {
        let mut city = City::new("Taipei", GovernmentType::Democratic, Specialization::Agriculture);
        city.birth_count = 3;
        city.emigration_count = 2;
        city.reset_counters();
        assert_eq!(city.birth_count, 0);
        assert_eq!(city.emigration_count, 0);
    }
}
