//! Core type definitions used throughout the codebase

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for citizens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CitizenId(pub u32);

impl CitizenId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for treaties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreatyId(pub u32);

/// Simulation year counter
pub type Year = u32;

/// Political leaning of a citizen or party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ideology {
    Conservative,
    Liberal,
    TechnoFaith,
    Nationalist,
}

impl Ideology {
    pub const ALL: [Ideology; 4] = [
        Ideology::Conservative,
        Ideology::Liberal,
        Ideology::TechnoFaith,
        Ideology::Nationalist,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// What a citizen does for a living
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Profession {
    Farmer,
    Worker,
    Scientist,
    Merchant,
    Unemployed,
    Doctor,
    Artist,
    Engineer,
    Teacher,
    ServiceWorker,
    Thief,
    Gangster,
    Fraudster,
    DrugDealer,
}

impl Profession {
    pub const ALL: [Profession; 14] = [
        Profession::Farmer,
        Profession::Worker,
        Profession::Scientist,
        Profession::Merchant,
        Profession::Unemployed,
        Profession::Doctor,
        Profession::Artist,
        Profession::Engineer,
        Profession::Teacher,
        Profession::ServiceWorker,
        Profession::Thief,
        Profession::Gangster,
        Profession::Fraudster,
        Profession::DrugDealer,
    ];

    /// Professions reached at the top education tier
    pub const TOP_TIER: [Profession; 3] =
        [Profession::Scientist, Profession::Doctor, Profession::Engineer];

    /// Professions reached at the middle education tier
    pub const MIDDLE_TIER: [Profession; 3] =
        [Profession::Teacher, Profession::Merchant, Profession::Artist];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Pick a random profession from a tier
    pub fn from_tier<R: Rng + ?Sized>(tier: &[Profession], rng: &mut R) -> Option<Self> {
        tier.choose(rng).copied()
    }

    /// Base yearly income
    pub fn income(&self) -> f32 {
        match self {
            Profession::Farmer => 30.0,
            Profession::Worker => 35.0,
            Profession::Scientist => 60.0,
            Profession::Merchant => 55.0,
            Profession::Unemployed => 5.0,
            Profession::Doctor => 70.0,
            Profession::Artist => 30.0,
            Profession::Engineer => 60.0,
            Profession::Teacher => 40.0,
            Profession::ServiceWorker => 25.0,
            Profession::Thief => 40.0,
            Profession::Gangster => 50.0,
            Profession::Fraudster => 55.0,
            Profession::DrugDealer => 60.0,
        }
    }

    /// Criminal professions with a chance of yearly consequences
    pub fn is_high_risk(&self) -> bool {
        matches!(
            self,
            Profession::Thief | Profession::Gangster | Profession::Fraudster | Profession::DrugDealer
        )
    }

    /// Professions that raise a family's standing
    pub fn is_reputable(&self) -> bool {
        matches!(
            self,
            Profession::Scientist | Profession::Doctor | Profession::Engineer | Profession::Teacher
        )
    }
}

/// City government
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernmentType {
    Democratic,
    Authoritarian,
    Republican,
}

impl GovernmentType {
    pub const ALL: [GovernmentType; 3] = [
        GovernmentType::Democratic,
        GovernmentType::Authoritarian,
        GovernmentType::Republican,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Share of a citizen's wealth collected as tax each year
    pub fn tax_rate(&self) -> f32 {
        match self {
            GovernmentType::Democratic => 0.010,
            GovernmentType::Authoritarian => 0.020,
            GovernmentType::Republican => 0.015,
        }
    }

    /// Multiplier on per-capita consumption
    pub fn consumption_multiplier(&self) -> f32 {
        match self {
            GovernmentType::Democratic => 1.0,
            GovernmentType::Authoritarian => 0.9,
            GovernmentType::Republican => 0.95,
        }
    }
}

/// Economic focus of a city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    Agriculture,
    Industry,
    Technology,
    Services,
    Military,
}

impl Specialization {
    pub const ALL: [Specialization; 5] = [
        Specialization::Agriculture,
        Specialization::Industry,
        Specialization::Technology,
        Specialization::Services,
        Specialization::Military,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Per-capita (food, energy) production
    pub fn production(&self) -> (f32, f32) {
        match self {
            Specialization::Agriculture => (1.4, 0.5),
            Specialization::Industry => (0.7, 1.3),
            Specialization::Technology => (0.8, 1.0),
            Specialization::Services => (1.0, 0.8),
            Specialization::Military => (0.8, 0.8),
        }
    }
}

/// The four research tracks of a planet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TechCategory {
    Military,
    Environment,
    Medical,
    Production,
}

impl TechCategory {
    pub const ALL: [TechCategory; 4] = [
        TechCategory::Military,
        TechCategory::Environment,
        TechCategory::Medical,
        TechCategory::Production,
    ];
}

/// Diplomatic stance between two planets, independent of the at-war flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationState {
    #[default]
    Neutral,
    Friendly,
    Hostile,
}

/// How a citizen died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Natural,
    Accident,
    Disease,
    Epidemic,
    Famine,
    Unrest,
    Rebellion,
    War,
    Attack,
    Annihilation,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeathCause::Natural => "natural causes",
            DeathCause::Accident => "accident",
            DeathCause::Disease => "disease/pollution",
            DeathCause::Epidemic => "epidemic",
            DeathCause::Famine => "famine",
            DeathCause::Unrest => "unrest",
            DeathCause::Rebellion => "rebellion",
            DeathCause::War => "war",
            DeathCause::Attack => "attack",
            DeathCause::Annihilation => "annihilation",
        };
        f.write_str(label)
    }
}

/// Clamp a trust/happiness score into its legal range
pub fn clamp_score(value: f32) -> f32 {
    value.clamp(0.1, 1.0)
}

/// Clamp a health value; zero means dead
pub fn clamp_health(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
