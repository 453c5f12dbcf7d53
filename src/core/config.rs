//! Simulation rate table with documented constants
//!
//! Every probability and balance constant the engines consult lives here,
//! grouped by the engine that reads it. The table is immutable during a tick
//! and can be loaded from TOML; any field left out keeps its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};

/// Complete rate table passed into every tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub citizen: CitizenRates,
    pub city: CityRates,
    pub planet: PlanetRates,
    pub interstellar: InterstellarRates,
    pub federation: FederationRates,
}

/// Per-citizen yearly rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CitizenRates {
    /// Chance that a shuffled pair of singles marries
    pub marriage_chance: f32,
    pub marriage_age_min: u32,
    pub marriage_age_max: u32,
    pub reproduction_age_min: u32,
    pub reproduction_age_max: u32,
    /// Base yearly birth chance for a couple, scaled by `0.5 + happiness`
    pub birth_rate: f32,
    /// Chance to gain one education level in a year
    pub education_chance: f32,
    /// Chance that gaining a tier also changes profession
    pub profession_change_chance: f32,
    /// Chance a high-risk profession backfires in a given year
    pub crime_consequence_chance: f32,
    /// Base migration chance, scaled by wealth and happiness
    pub immigration_base_chance: f32,
    /// Age past which natural death checks start
    pub old_age_start: u32,
    /// Natural death chance at the old-age threshold
    pub natural_death_base: f32,
    /// Added natural death chance per year past the threshold
    pub natural_death_per_year: f32,
    /// Age-independent accidental death chance
    pub accident_death_rate: f32,
    /// Wealth spent on living each year
    pub living_cost: f32,
    /// Planet pollution above which health can suffer
    pub pollution_health_threshold: f32,
    pub pollution_health_chance: f32,
    /// Minimum age to vote in city elections
    pub voting_age: u32,
}

impl Default for CitizenRates {
    fn default() -> Self {
        Self {
            marriage_chance: 0.05,
            marriage_age_min: 18,
            marriage_age_max: 60,
            reproduction_age_min: 20,
            reproduction_age_max: 45,
            birth_rate: 0.08,
            education_chance: 0.01,
            profession_change_chance: 0.5,
            crime_consequence_chance: 0.03,
            immigration_base_chance: 0.02,
            old_age_start: 80,
            natural_death_base: 0.05,
            natural_death_per_year: 0.01,
            accident_death_rate: 0.002,
            living_cost: 20.0,
            pollution_health_threshold: 0.5,
            pollution_health_chance: 0.05,
            voting_age: 18,
        }
    }
}

/// Per-city economy, stability and governance rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CityRates {
    /// Food or energy below this counts as a shortage year
    pub shortage_threshold: f32,
    /// Consecutive shortage years before famine strikes
    pub famine_threshold_years: u32,
    pub famine_death_chance: f32,
    /// Per-capita yearly food consumption
    pub food_consumption: f32,
    /// Per-capita yearly energy consumption
    pub energy_consumption: f32,
    /// Scales every city's production; zero disables production
    pub production_multiplier: f32,
    /// Food and energy above this count as surplus
    pub boom_threshold: f32,
    /// Production tech required before a boom can happen
    pub boom_tech_threshold: f32,
    pub resource_boom_chance: f32,
    /// Average trust and happiness under this breed unrest
    pub unrest_threshold: f32,
    /// Average trust and happiness under this can turn unrest into revolution
    pub critical_unrest_threshold: f32,
    /// Population share the leading ideology needs to dominate
    pub dominant_ideology_share: f32,
    pub mass_movement_chance: f32,
    pub movement_death_chance: f32,
    pub movement_flight_chance: f32,
    pub revolution_chance: f32,
    /// Chance per year of a forced government change when conditions hold
    pub gov_change_chance: f32,
    pub election_interval_min: u32,
    pub election_interval_max: u32,
    /// Food or energy above this may be shipped to struggling neighbours
    pub trade_surplus_threshold: f32,
    /// Share of the surplus shipped per year
    pub trade_fraction: f32,
    /// Level food and energy are pinned to once replicators exist
    pub infinite_resource_level: f32,
}

impl Default for CityRates {
    fn default() -> Self {
        Self {
            shortage_threshold: 50.0,
            famine_threshold_years: 3,
            famine_death_chance: 0.05,
            food_consumption: 0.9,
            energy_consumption: 0.8,
            production_multiplier: 1.0,
            boom_threshold: 300.0,
            boom_tech_threshold: 0.7,
            resource_boom_chance: 0.01,
            unrest_threshold: 0.4,
            critical_unrest_threshold: 0.25,
            dominant_ideology_share: 0.5,
            mass_movement_chance: 0.05,
            movement_death_chance: 0.01,
            movement_flight_chance: 0.02,
            revolution_chance: 0.2,
            gov_change_chance: 0.005,
            election_interval_min: 5,
            election_interval_max: 10,
            trade_surplus_threshold: 200.0,
            trade_fraction: 0.1,
            infinite_resource_level: 1000.0,
        }
    }
}

/// Per-planet technology, pollution and epidemic rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetRates {
    pub tech_growth_min: f32,
    pub tech_growth_max: f32,
    pub pollution_growth_min: f32,
    pub pollution_growth_max: f32,
    /// Pollution removed per unit of environment tech each year
    pub pollution_tech_reduction: f32,
    /// Base yearly epidemic chance before medical modifiers
    pub epidemic_rate: f32,
    pub epidemic_recovery_min: f32,
    pub epidemic_recovery_max: f32,
    /// Severity under which an epidemic is declared over
    pub epidemic_end_threshold: f32,
    /// Defense level cap before breakthrough bonuses
    pub defense_base_cap: f32,
    pub shield_chance: f32,
    /// Military tech needed to raise a shield
    pub shield_tech_threshold: f32,
}

impl Default for PlanetRates {
    fn default() -> Self {
        Self {
            tech_growth_min: 0.005,
            tech_growth_max: 0.015,
            pollution_growth_min: 0.01,
            pollution_growth_max: 0.02,
            pollution_tech_reduction: 0.015,
            epidemic_rate: 0.02,
            epidemic_recovery_min: 0.05,
            epidemic_recovery_max: 0.10,
            epidemic_end_threshold: 0.05,
            defense_base_cap: 50.0,
            shield_chance: 0.05,
            shield_tech_threshold: 0.7,
        }
    }
}

/// Pairwise diplomacy, treaty and war rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterstellarRates {
    /// Base yearly chance of a conflict incident between two planets
    pub conflict_rate: f32,
    pub alien_conflict_multiplier: f32,
    pub hostile_conflict_multiplier: f32,
    pub friendly_conflict_multiplier: f32,
    pub non_aggression_multiplier: f32,
    pub conflict_increment_min: f32,
    pub conflict_increment_max: f32,
    /// Conflict level shed in a quiet year
    pub conflict_decay: f32,
    /// Mean conflict above which friends cool to neutral
    pub friendly_to_neutral_conflict: f32,
    /// Mean conflict above which neutrals turn hostile
    pub neutral_to_hostile_conflict: f32,
    /// Mean conflict at which hostile planets declare war
    pub war_declaration_threshold: f32,
    pub soften_hostile_chance: f32,
    pub befriend_chance: f32,
    /// Chance friendly planets sign a treaty in a year
    pub treaty_chance: f32,
    pub treaty_duration_min: u32,
    pub treaty_duration_max: u32,
    /// Food and energy each city of a trade partner gains per year
    pub trade_treaty_bonus: f32,
    /// Share of the tech gap closed per year under tech sharing
    pub tech_share_fraction: f32,
    pub war_death_rate: f32,
    pub war_resource_drain_min: f32,
    pub war_resource_drain_max: f32,
    /// Years of war before exhaustion can bring peace
    pub war_peace_min_duration: u32,
    pub war_peace_chance_by_duration: f32,
    pub war_peace_chance_by_population: f32,
    /// Population ratio under which the smaller side may sue for peace
    pub war_population_ratio: f32,
    /// Share of the loser's citizens resettled on the winner
    pub war_capture_fraction: f32,
    pub random_attack_chance: f32,
    /// Years a planet waits between attacks
    pub attack_cooldown: u32,
    pub random_attack_counter_chance: f32,
    pub annihilation_chance: f32,
}

impl Default for InterstellarRates {
    fn default() -> Self {
        Self {
            conflict_rate: 0.05,
            alien_conflict_multiplier: 1.2,
            hostile_conflict_multiplier: 2.0,
            friendly_conflict_multiplier: 0.5,
            non_aggression_multiplier: 0.2,
            conflict_increment_min: 0.05,
            conflict_increment_max: 0.15,
            conflict_decay: 0.02,
            friendly_to_neutral_conflict: 0.3,
            neutral_to_hostile_conflict: 0.5,
            war_declaration_threshold: 0.7,
            soften_hostile_chance: 0.05,
            befriend_chance: 0.03,
            treaty_chance: 0.05,
            treaty_duration_min: 5,
            treaty_duration_max: 15,
            trade_treaty_bonus: 10.0,
            tech_share_fraction: 0.1,
            war_death_rate: 0.01,
            war_resource_drain_min: 5.0,
            war_resource_drain_max: 15.0,
            war_peace_min_duration: 5,
            war_peace_chance_by_duration: 0.1,
            war_peace_chance_by_population: 0.2,
            war_population_ratio: 0.5,
            war_capture_fraction: 0.1,
            random_attack_chance: 0.02,
            attack_cooldown: 3,
            random_attack_counter_chance: 0.1,
            annihilation_chance: 0.05,
        }
    }
}

/// Galaxy-level events: federation politics, new planets, stories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationRates {
    /// Chance per year of an election while no policy is active
    pub election_chance: f32,
    pub policy_duration: u32,
    pub new_planet_chance: f32,
    pub max_planets: usize,
    pub new_planet_cities: usize,
    pub new_planet_population: usize,
    pub story_chance: f32,
}

impl Default for FederationRates {
    fn default() -> Self {
        Self {
            election_chance: 0.1,
            policy_duration: 5,
            new_planet_chance: 0.03,
            max_planets: 5,
            new_planet_cities: 2,
            new_planet_population: 10,
            story_chance: 0.15,
        }
    }
}

impl SimConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a rate table from TOML; missing fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a rate table from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let c = &self.citizen;
        let city = &self.city;
        let p = &self.planet;
        let i = &self.interstellar;
        let f = &self.federation;

        let probabilities = [
            ("citizen.marriage_chance", c.marriage_chance),
            ("citizen.birth_rate", c.birth_rate),
            ("citizen.education_chance", c.education_chance),
            ("citizen.profession_change_chance", c.profession_change_chance),
            ("citizen.crime_consequence_chance", c.crime_consequence_chance),
            ("citizen.immigration_base_chance", c.immigration_base_chance),
            ("citizen.natural_death_base", c.natural_death_base),
            ("citizen.accident_death_rate", c.accident_death_rate),
            ("citizen.pollution_health_chance", c.pollution_health_chance),
            ("city.famine_death_chance", city.famine_death_chance),
            ("city.resource_boom_chance", city.resource_boom_chance),
            ("city.mass_movement_chance", city.mass_movement_chance),
            ("city.movement_death_chance", city.movement_death_chance),
            ("city.movement_flight_chance", city.movement_flight_chance),
            ("city.revolution_chance", city.revolution_chance),
            ("city.gov_change_chance", city.gov_change_chance),
            ("city.trade_fraction", city.trade_fraction),
            ("planet.epidemic_rate", p.epidemic_rate),
            ("planet.shield_chance", p.shield_chance),
            ("interstellar.conflict_rate", i.conflict_rate),
            ("interstellar.soften_hostile_chance", i.soften_hostile_chance),
            ("interstellar.befriend_chance", i.befriend_chance),
            ("interstellar.treaty_chance", i.treaty_chance),
            ("interstellar.tech_share_fraction", i.tech_share_fraction),
            ("interstellar.war_death_rate", i.war_death_rate),
            ("interstellar.war_peace_chance_by_duration", i.war_peace_chance_by_duration),
            ("interstellar.war_peace_chance_by_population", i.war_peace_chance_by_population),
            ("interstellar.war_capture_fraction", i.war_capture_fraction),
            ("interstellar.random_attack_chance", i.random_attack_chance),
            ("interstellar.random_attack_counter_chance", i.random_attack_counter_chance),
            ("interstellar.annihilation_chance", i.annihilation_chance),
            ("federation.election_chance", f.election_chance),
            ("federation.new_planet_chance", f.new_planet_chance),
            ("federation.story_chance", f.story_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig(format!(
                    "{} ({}) must lie in [0, 1]",
                    name, value
                )));
            }
        }

        let ranges = [
            ("citizen.marriage_age", c.marriage_age_min as f32, c.marriage_age_max as f32),
            (
                "citizen.reproduction_age",
                c.reproduction_age_min as f32,
                c.reproduction_age_max as f32,
            ),
            (
                "city.election_interval",
                city.election_interval_min as f32,
                city.election_interval_max as f32,
            ),
            ("planet.tech_growth", p.tech_growth_min, p.tech_growth_max),
            ("planet.pollution_growth", p.pollution_growth_min, p.pollution_growth_max),
            ("planet.epidemic_recovery", p.epidemic_recovery_min, p.epidemic_recovery_max),
            (
                "interstellar.conflict_increment",
                i.conflict_increment_min,
                i.conflict_increment_max,
            ),
            (
                "interstellar.treaty_duration",
                i.treaty_duration_min as f32,
                i.treaty_duration_max as f32,
            ),
            (
                "interstellar.war_resource_drain",
                i.war_resource_drain_min,
                i.war_resource_drain_max,
            ),
        ];
        for (name, min, max) in ranges {
            if min > max {
                return Err(SimError::InvalidConfig(format!(
                    "{} min ({}) exceeds max ({})",
                    name, min, max
                )));
            }
        }

        if city.election_interval_min == 0 {
            return Err(SimError::InvalidConfig(
                "city.election_interval_min must be at least 1".into(),
            ));
        }

        if i.treaty_duration_min == 0 {
            return Err(SimError::InvalidConfig(
                "interstellar.treaty_duration_min must be at least 1".into(),
            ));
        }

        if city.critical_unrest_threshold > city.unrest_threshold {
            return Err(SimError::InvalidConfig(format!(
                "city.critical_unrest_threshold ({}) should be <= city.unrest_threshold ({})",
                city.critical_unrest_threshold, city.unrest_threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            [citizen]
            marriage_chance = 1.0

            [planet]
            epidemic_rate = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.citizen.marriage_chance, 1.0);
        assert_eq!(config.planet.epidemic_rate, 0.0);
        assert_eq!(config.citizen.old_age_start, 80);
        assert_eq!(config.city.famine_threshold_years, 3);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let mut config = SimConfig::default();
        config.city.revolution_chance = 1.5;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut config = SimConfig::default();
        config.city.election_interval_min = 12;
        assert!(config.validate().is_err());
    }
}
