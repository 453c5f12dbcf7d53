//! Citizen - an individual agent living in a city

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{
    clamp_health, clamp_score, CitizenId, DeathCause, Ideology, Profession,
};

/// Highest education level
pub const MAX_EDUCATION: u8 = 3;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    pub name: String,
    pub age: u32,
    /// 0.0-1.0, zero is fatal
    pub health: f32,
    /// 0.1-1.0
    pub trust: f32,
    /// 0.1-1.0
    pub happiness: f32,
    pub ideology: Ideology,
    pub profession: Profession,
    /// 0-3
    pub education: u8,
    pub wealth: f32,
    pub alive: bool,
    /// Set exactly once, when `alive` turns false
    pub death_cause: Option<DeathCause>,
    pub partner: Option<CitizenId>,
    /// Name of the family in the galaxy registry
    pub family: Option<String>,
    /// Name of the city of residence
    pub city: String,
}

/// What remains of a citizen after death
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraveRecord {
    pub name: String,
    pub age: u32,
    pub ideology: Ideology,
    pub cause: DeathCause,
}

impl Citizen {
    /// A founding citizen with randomized traits
    pub fn generate<R: Rng + ?Sized>(id: CitizenId, name: String, city: &str, rng: &mut R) -> Self {
        let profession = Profession::random(rng);
        let mut citizen = Self {
            id,
            name,
            age: rng.gen_range(0..=70),
            health: 1.0,
            trust: rng.gen_range(0.4..0.9),
            happiness: rng.gen_range(0.4..0.9),
            ideology: Ideology::random(rng),
            profession,
            education: rng.gen_range(0..=2),
            wealth: rng.gen_range(50.0..200.0),
            alive: true,
            death_cause: None,
            partner: None,
            family: None,
            city: city.to_string(),
        };

        if profession.is_high_risk() {
            citizen.adjust_trust(-rng.gen_range(0.05..0.15));
            citizen.adjust_health(-rng.gen_range(0.02..0.08));
        }

        citizen
    }

    /// A newborn child of two parents
    pub fn born<R: Rng + ?Sized>(
        id: CitizenId,
        name: String,
        parent: &Citizen,
        other: &Citizen,
        rng: &mut R,
    ) -> Self {
        let trust = (parent.trust + other.trust) / 2.0 + rng.gen_range(-0.1..0.1);
        let happiness = (parent.happiness + other.happiness) / 2.0 + rng.gen_range(-0.1..0.1);

        Self {
            id,
            name,
            age: 0,
            health: 1.0,
            trust: clamp_score(trust),
            happiness: clamp_score(happiness),
            ideology: inherit_ideology(parent.ideology, other.ideology, rng),
            profession: Profession::random(rng),
            education: 0,
            wealth: 0.0,
            alive: true,
            death_cause: None,
            partner: None,
            family: parent.family.clone(),
            city: parent.city.clone(),
        }
    }

    pub fn adjust_trust(&mut self, delta: f32) {
        self.trust = clamp_score(self.trust + delta);
    }

    pub fn adjust_happiness(&mut self, delta: f32) {
        self.happiness = clamp_score(self.happiness + delta);
    }

    pub fn adjust_health(&mut self, delta: f32) {
        self.health = clamp_health(self.health + delta);
    }

    /// Add (or with a negative delta, remove) wealth, never below zero
    pub fn adjust_wealth(&mut self, delta: f32) {
        self.wealth = (self.wealth + delta).max(0.0);
    }

    pub fn is_single(&self) -> bool {
        self.partner.is_none()
    }

    /// Mark as dead. Returns false if already dead; the first cause sticks.
    pub fn die(&mut self, cause: DeathCause) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.death_cause = Some(cause);
        true
    }

    pub fn grave_record(&self) -> Option<GraveRecord> {
        self.death_cause.map(|cause| GraveRecord {
            name: self.name.clone(),
            age: self.age,
            ideology: self.ideology,
            cause,
        })
    }
}

/// Children lean toward their parents' ideology, strongly so when parents agree
fn inherit_ideology<R: Rng + ?Sized>(a: Ideology, b: Ideology, rng: &mut R) -> Ideology {
    if !rng.gen_bool(0.7) {
        return Ideology::random(rng);
    }
    if a == b {
        if rng.gen_bool(0.9) {
            a
        } else {
            Ideology::random(rng)
        }
    } else if rng.gen_bool(0.7) {
        if rng.gen_bool(0.5) {
            a
        } else {
            b
        }
    } else {
        Ideology::random(rng)
    }
}
