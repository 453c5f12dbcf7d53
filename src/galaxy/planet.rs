//! Planet - a world holding cities, research and diplomatic state

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{CitizenId, RelationState, TreatyId};
use crate::galaxy::city::City;
use crate::galaxy::tech::{self, Breakthrough, EffectKey, TechLevels};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    pub alien: bool,
    pub alive: bool,
    pub cities: Vec<City>,

    // Research
    pub tech: TechLevels,
    pub breakthroughs: Vec<Breakthrough>,
    pub pollution: f32,

    // Diplomacy, keyed by the other planet's name
    /// 0.0-1.0
    pub conflict_level: f32,
    pub relations: BTreeMap<String, RelationState>,
    pub war_with: BTreeSet<String>,
    pub war_duration: BTreeMap<String, u32>,
    pub allies: BTreeSet<String>,
    pub active_treaties: Vec<TreatyId>,

    // Health and defense
    pub epidemic_active: bool,
    pub epidemic_severity: f32,
    pub defense_level: f32,
    pub shield_active: bool,
    pub attack_cooldown: u32,
}

impl Planet {
    pub fn new(name: impl Into<String>, alien: bool) -> Self {
        Self {
            name: name.into(),
            alien,
            alive: true,
            cities: Vec::new(),
            tech: TechLevels::default(),
            breakthroughs: Vec::new(),
            pollution: 0.0,
            conflict_level: 0.0,
            relations: BTreeMap::new(),
            war_with: BTreeSet::new(),
            war_duration: BTreeMap::new(),
            allies: BTreeSet::new(),
            active_treaties: Vec::new(),
            epidemic_active: false,
            epidemic_severity: 0.0,
            defense_level: 0.0,
            shield_active: false,
            attack_cooldown: 0,
        }
    }

    pub fn population(&self) -> usize {
        self.cities.iter().map(|c| c.population()).sum()
    }

    /// Every city stands empty
    pub fn is_depopulated(&self) -> bool {
        self.cities.iter().all(|c| c.is_empty())
    }

    /// Snapshot of every resident across all cities
    pub fn citizen_ids(&self) -> Vec<CitizenId> {
        self.cities.iter().flat_map(|c| c.citizens.iter().copied()).collect()
    }

    pub fn city(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    pub fn city_mut(&mut self, name: &str) -> Option<&mut City> {
        self.cities.iter_mut().find(|c| c.name == name)
    }

    pub fn relation_with(&self, other: &str) -> RelationState {
        self.relations.get(other).copied().unwrap_or_default()
    }

    pub fn set_relation(&mut self, other: &str, state: RelationState) {
        self.relations.insert(other.to_string(), state);
    }

    pub fn is_at_war_with(&self, other: &str) -> bool {
        self.war_with.contains(other)
    }

    pub fn at_war(&self) -> bool {
        !self.war_with.is_empty()
    }

    /// Enter a war; the duration counter always starts alongside the flag
    pub fn start_war(&mut self, other: &str) {
        self.war_with.insert(other.to_string());
        self.war_duration.insert(other.to_string(), 0);
        self.allies.remove(other);
    }

    /// Leave a war, clearing the flag and its duration together
    pub fn end_war(&mut self, other: &str) {
        self.war_with.remove(other);
        self.war_duration.remove(other);
    }

    /// Drop every reference to a planet that no longer exists
    pub fn forget(&mut self, other: &str) {
        self.end_war(other);
        self.relations.remove(other);
        self.allies.remove(other);
    }

    pub fn raise_conflict(&mut self, delta: f32) {
        self.conflict_level = (self.conflict_level + delta).clamp(0.0, 1.0);
    }

    pub fn has_breakthrough(&self, breakthrough: Breakthrough) -> bool {
        self.breakthroughs.contains(&breakthrough)
    }

    pub fn multiplier(&self, key: EffectKey) -> f32 {
        tech::multiplier(&self.breakthroughs, key)
    }

    pub fn bonus(&self, key: EffectKey) -> f32 {
        tech::bonus(&self.breakthroughs, key)
    }

    pub fn unlocked(&self, key: EffectKey) -> bool {
        tech::is_unlocked(&self.breakthroughs, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GovernmentType, Specialization};

    #[test]
    fn test_war_flag_and_duration_move_together() {
        let mut planet = Planet::new("Earth", false);
        planet.allies.insert("Cybera".into());
        planet.start_war("Cybera");
        assert!(planet.is_at_war_with("Cybera"));
        assert_eq!(planet.war_duration.get("Cybera"), Some(&0));
        assert!(!planet.allies.contains("Cybera"));

        planet.end_war("Cybera");
        assert!(!planet.is_at_war_with("Cybera"));
        assert!(planet.war_duration.is_empty());
    }

    #[test]
    fn test_depopulated_when_all_cities_empty() {
        let mut planet = Planet::new("Earth", false);
        planet.cities.push(City::new("Taipei", GovernmentType::Democratic, Specialization::Industry));
        assert!(planet.is_depopulated());
        planet.cities[0].citizens.push(CitizenId(1));
        assert!(!planet.is_depopulated());
        assert_eq!(planet.population(), 1);
    }

    #[test]
    fn test_unknown_relation_is_neutral() {
        let planet = Planet::new("Earth", false);
        assert_eq!(planet.relation_with("Nowhere"), RelationState::Neutral);
    }
}
