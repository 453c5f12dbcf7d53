//! Technology levels, breakthroughs and their typed effects
//!
//! Each category carries an ordered list of threshold-gated breakthroughs.
//! Once unlocked, a breakthrough's effects stay active for that planet and
//! are read back through the accumulator functions at the bottom.

use serde::{Deserialize, Serialize};

use crate::core::types::TechCategory;

/// Per-category research levels, each in [0, 1]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechLevels {
    pub military: f32,
    pub environment: f32,
    pub medical: f32,
    pub production: f32,
}

impl Default for TechLevels {
    fn default() -> Self {
        Self {
            military: 0.5,
            environment: 0.5,
            medical: 0.5,
            production: 0.5,
        }
    }
}

impl TechLevels {
    pub fn get(&self, category: TechCategory) -> f32 {
        match category {
            TechCategory::Military => self.military,
            TechCategory::Environment => self.environment,
            TechCategory::Medical => self.medical,
            TechCategory::Production => self.production,
        }
    }

    /// Set a level, clamped to [0, 1]
    pub fn set(&mut self, category: TechCategory, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match category {
            TechCategory::Military => self.military = value,
            TechCategory::Environment => self.environment = value,
            TechCategory::Medical => self.medical = value,
            TechCategory::Production => self.production = value,
        }
    }

    pub fn add(&mut self, category: TechCategory, delta: f32) {
        self.set(category, self.get(category) + delta);
    }

    pub fn average(&self) -> f32 {
        (self.military + self.environment + self.medical + self.production) / 4.0
    }
}

/// Quantities a breakthrough can modify
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKey {
    EpidemicChance,
    EpidemicSeverity,
    HealthRecovery,
    Lifespan,
    NaturalDeathReduction,
    PollutionGrowth,
    PollutionCleanup,
    Happiness,
    PollutionReset,
    DefenseCap,
    AttackCooldownReduction,
    AttackDamage,
    WarStrength,
    Annihilation,
    Production,
    WealthGrowth,
    ConsumptionReduction,
    InfiniteResources,
}

/// One effect carried by a breakthrough
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Multiplies the keyed quantity; several combine by product
    Multiplier(EffectKey, f32),
    /// Adds to the keyed quantity; several combine by sum
    Bonus(EffectKey, f32),
    /// Switches on a capability
    Unlock(EffectKey),
}

/// Threshold-gated technology milestones
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Breakthrough {
    // Medical
    SuperVaccine,
    RegenerativeMedicine,
    Immortality,
    // Environment
    AtmosphericScrubbers,
    EcoRestoration,
    EcoBalance,
    // Military
    OrbitalDefense,
    FtlWeapons,
    DoomsdayWeapon,
    // Production
    AutomatedFactories,
    NanoFabrication,
    Replicators,
}

impl Breakthrough {
    /// All breakthroughs, grouped by category and ordered by threshold
    pub const ALL: [Breakthrough; 12] = [
        Breakthrough::SuperVaccine,
        Breakthrough::RegenerativeMedicine,
        Breakthrough::Immortality,
        Breakthrough::AtmosphericScrubbers,
        Breakthrough::EcoRestoration,
        Breakthrough::EcoBalance,
        Breakthrough::OrbitalDefense,
        Breakthrough::FtlWeapons,
        Breakthrough::DoomsdayWeapon,
        Breakthrough::AutomatedFactories,
        Breakthrough::NanoFabrication,
        Breakthrough::Replicators,
    ];

    pub fn category(&self) -> TechCategory {
        match self {
            Breakthrough::SuperVaccine
            | Breakthrough::RegenerativeMedicine
            | Breakthrough::Immortality => TechCategory::Medical,
            Breakthrough::AtmosphericScrubbers
            | Breakthrough::EcoRestoration
            | Breakthrough::EcoBalance => TechCategory::Environment,
            Breakthrough::OrbitalDefense
            | Breakthrough::FtlWeapons
            | Breakthrough::DoomsdayWeapon => TechCategory::Military,
            Breakthrough::AutomatedFactories
            | Breakthrough::NanoFabrication
            | Breakthrough::Replicators => TechCategory::Production,
        }
    }

    pub fn threshold(&self) -> f32 {
        match self {
            Breakthrough::SuperVaccine
            | Breakthrough::AtmosphericScrubbers
            | Breakthrough::OrbitalDefense
            | Breakthrough::AutomatedFactories => 0.6,
            Breakthrough::RegenerativeMedicine
            | Breakthrough::EcoRestoration
            | Breakthrough::FtlWeapons
            | Breakthrough::NanoFabrication => 0.8,
            Breakthrough::Immortality
            | Breakthrough::EcoBalance
            | Breakthrough::DoomsdayWeapon
            | Breakthrough::Replicators => 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Breakthrough::SuperVaccine => "Super Vaccine",
            Breakthrough::RegenerativeMedicine => "Regenerative Medicine",
            Breakthrough::Immortality => "Immortality Therapy",
            Breakthrough::AtmosphericScrubbers => "Atmospheric Scrubbers",
            Breakthrough::EcoRestoration => "Eco Restoration",
            Breakthrough::EcoBalance => "Ecological Balance System",
            Breakthrough::OrbitalDefense => "Orbital Defense Platforms",
            Breakthrough::FtlWeapons => "FTL Weapons",
            Breakthrough::DoomsdayWeapon => "Doomsday Weapon",
            Breakthrough::AutomatedFactories => "Automated Factories",
            Breakthrough::NanoFabrication => "Nano Fabrication",
            Breakthrough::Replicators => "Resource Replicators",
        }
    }

    pub fn effects(&self) -> &'static [Effect] {
        use EffectKey::*;
        match self {
            Breakthrough::SuperVaccine => &[
                Effect::Multiplier(EpidemicChance, 0.5),
                Effect::Multiplier(EpidemicSeverity, 0.7),
            ],
            Breakthrough::RegenerativeMedicine => {
                &[Effect::Bonus(HealthRecovery, 0.05), Effect::Bonus(Lifespan, 5.0)]
            }
            Breakthrough::Immortality => &[Effect::Bonus(NaturalDeathReduction, 0.8)],
            Breakthrough::AtmosphericScrubbers => &[Effect::Multiplier(PollutionGrowth, 0.6)],
            Breakthrough::EcoRestoration => {
                &[Effect::Bonus(PollutionCleanup, 0.05), Effect::Bonus(Happiness, 0.01)]
            }
            Breakthrough::EcoBalance => &[Effect::Unlock(PollutionReset)],
            Breakthrough::OrbitalDefense => &[
                Effect::Bonus(DefenseCap, 20.0),
                Effect::Bonus(AttackCooldownReduction, 1.0),
            ],
            Breakthrough::FtlWeapons => {
                &[Effect::Bonus(AttackDamage, 0.2), Effect::Bonus(WarStrength, 0.1)]
            }
            Breakthrough::DoomsdayWeapon => &[Effect::Unlock(Annihilation)],
            Breakthrough::AutomatedFactories => &[Effect::Bonus(Production, 0.3)],
            Breakthrough::NanoFabrication => &[
                Effect::Bonus(WealthGrowth, 0.1),
                Effect::Bonus(ConsumptionReduction, 0.05),
            ],
            Breakthrough::Replicators => &[Effect::Unlock(InfiniteResources)],
        }
    }

    /// Breakthroughs of one category, in threshold order
    pub fn for_category(category: TechCategory) -> impl Iterator<Item = Breakthrough> {
        Self::ALL.into_iter().filter(move |b| b.category() == category)
    }
}

/// Product of every unlocked multiplier for `key`; 1.0 when none apply
pub fn multiplier(unlocked: &[Breakthrough], key: EffectKey) -> f32 {
    unlocked
        .iter()
        .flat_map(|b| b.effects().iter())
        .filter_map(|e| match e {
            Effect::Multiplier(k, v) if *k == key => Some(*v),
            _ => None,
        })
        .product()
}

/// Sum of every unlocked bonus for `key`; 0.0 when none apply
pub fn bonus(unlocked: &[Breakthrough], key: EffectKey) -> f32 {
    unlocked
        .iter()
        .flat_map(|b| b.effects().iter())
        .filter_map(|e| match e {
            Effect::Bonus(k, v) if *k == key => Some(*v),
            _ => None,
        })
        .sum()
}

/// Whether any unlocked breakthrough switches on `key`
pub fn is_unlocked(unlocked: &[Breakthrough], key: EffectKey) -> bool {
    unlocked
        .iter()
        .flat_map(|b| b.effects().iter())
        .any(|e| matches!(e, Effect::Unlock(k) if *k == key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulators_default_when_empty() {
        assert_eq!(multiplier(&[], EffectKey::EpidemicChance), 1.0);
        assert_eq!(bonus(&[], EffectKey::Lifespan), 0.0);
        assert!(!is_unlocked(&[], EffectKey::InfiniteResources));
    }

    #[test]
    fn test_accumulators_read_unlocked_effects() {
        let unlocked = [
            Breakthrough::SuperVaccine,
            Breakthrough::RegenerativeMedicine,
            Breakthrough::Replicators,
        ];
        assert!((multiplier(&unlocked, EffectKey::EpidemicChance) - 0.5).abs() < 1e-6);
        assert!((bonus(&unlocked, EffectKey::Lifespan) - 5.0).abs() < 1e-6);
        assert!(is_unlocked(&unlocked, EffectKey::InfiniteResources));
        assert!(!is_unlocked(&unlocked, EffectKey::Annihilation));
    }

    #[test]
    fn test_each_category_has_three_ordered_tiers() {
        for category in TechCategory::ALL {
            let tiers: Vec<f32> = Breakthrough::for_category(category)
                .map(|b| b.threshold())
                .collect();
            assert_eq!(tiers, vec![0.6, 0.8, 1.0]);
        }
    }

    #[test]
    fn test_tech_levels_clamped() {
        let mut levels = TechLevels::default();
        levels.add(TechCategory::Medical, 0.9);
        assert_eq!(levels.get(TechCategory::Medical), 1.0);
        levels.add(TechCategory::Military, -2.0);
        assert_eq!(levels.get(TechCategory::Military), 0.0);
    }
}
