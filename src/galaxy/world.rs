//! Galaxy - the simulation root threaded through every engine

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{Result, SimError};
use crate::core::types::{CitizenId, Ideology, RelationState, TreatyId, Year};
use crate::galaxy::citizen::Citizen;
use crate::galaxy::events::EventLog;
use crate::galaxy::planet::Planet;
use crate::galaxy::population::Population;
use crate::galaxy::treaty::{Treaty, TreatyTerms, TreatyType};

/// Galaxy-wide policy enacted by an elected federation leader
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FederationPolicy {
    /// +0.02 happiness for every citizen each year
    StabilityPact,
    /// Extra wealth growth on citizen income
    WelfareProgram,
    /// Faster research everywhere
    ResearchGrant,
    /// Halves the chance of interstellar conflict
    PeaceAccord,
}

impl FederationPolicy {
    pub fn for_ideology(ideology: Ideology) -> Self {
        match ideology {
            Ideology::Conservative => FederationPolicy::StabilityPact,
            Ideology::Liberal => FederationPolicy::WelfareProgram,
            Ideology::TechnoFaith => FederationPolicy::ResearchGrant,
            Ideology::Nationalist => FederationPolicy::PeaceAccord,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FederationPolicy::StabilityPact => "Stability Pact",
            FederationPolicy::WelfareProgram => "Welfare Program",
            FederationPolicy::ResearchGrant => "Research Grant",
            FederationPolicy::PeaceAccord => "Peace Accord",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivePolicy {
    pub policy: FederationPolicy,
    pub years_left: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Federation {
    pub leader: Option<CitizenId>,
    pub policy: Option<ActivePolicy>,
}

impl Federation {
    pub fn is_active(&self, policy: FederationPolicy) -> bool {
        self.policy.map_or(false, |p| p.policy == policy)
    }
}

fn default_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Galaxy {
    pub year: Year,
    /// Living planets; extinct ones are pruned at the end of the tick
    pub planets: Vec<Planet>,
    pub people: Population,
    pub treaties: Vec<Treaty>,
    pub log: EventLog,
    pub federation: Federation,
    /// Cosmetic map coordinates per planet
    pub map_layout: BTreeMap<String, (f32, f32)>,
    /// Galaxy population at the end of the previous tick
    pub prev_total_population: usize,
    /// Wars declared since the start of the run
    pub wars_declared: u32,
    pub seed: u64,
    /// Deterministic random source; a restored snapshot restarts from `seed`
    #[serde(skip, default = "default_rng")]
    pub rng: ChaCha8Rng,
    next_treaty_id: u32,
}

impl Galaxy {
    pub fn new(seed: u64) -> Self {
        Self {
            year: 0,
            planets: Vec::new(),
            people: Population::new(),
            treaties: Vec::new(),
            log: EventLog::new(),
            federation: Federation::default(),
            map_layout: BTreeMap::new(),
            prev_total_population: 0,
            wars_declared: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_treaty_id: 1,
        }
    }

    /// Restore a snapshot written with `serde_json`
    pub fn from_json(json: &str) -> Result<Self> {
        let mut galaxy: Galaxy = serde_json::from_str(json)?;
        galaxy.reseed();
        Ok(galaxy)
    }

    /// Restart the random stream after a restore, offset by the current year
    pub fn reseed(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(self.year as u64));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a planet, meeting every existing planet on neutral terms
    pub fn add_planet(&mut self, mut planet: Planet) -> usize {
        for other in &mut self.planets {
            other.set_relation(&planet.name, RelationState::Neutral);
            planet.set_relation(&other.name, RelationState::Neutral);
        }
        self.planets.push(planet);
        self.planets.len() - 1
    }

    pub fn planet(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.name == name)
    }

    pub fn planet_mut(&mut self, name: &str) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.name == name)
    }

    pub fn planet_index(&self, name: &str) -> Result<usize> {
        self.planets
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| SimError::UnknownPlanet(name.to_string()))
    }

    /// (planet index, city index) of a city, by name
    pub fn city_location(&self, name: &str) -> Result<(usize, usize)> {
        self.planets
            .iter()
            .enumerate()
            .find_map(|(pi, p)| p.cities.iter().position(|c| c.name == name).map(|ci| (pi, ci)))
            .ok_or_else(|| SimError::UnknownCity(name.to_string()))
    }

    pub fn total_population(&self) -> usize {
        self.planets.iter().map(|p| p.population()).sum()
    }

    /// Settle a new citizen into a city
    pub fn spawn_citizen(&mut self, planet: usize, city: usize, citizen: Citizen) -> CitizenId {
        let city = &mut self.planets[planet].cities[city];
        self.people.spawn(city, citizen)
    }

    pub fn next_treaty_id(&mut self) -> TreatyId {
        let id = TreatyId(self.next_treaty_id);
        self.next_treaty_id += 1;
        id
    }

    /// Sign a treaty between two planets; the signatories become allies
    pub fn sign_treaty(
        &mut self,
        kind: TreatyType,
        a: &str,
        b: &str,
        duration: u32,
        terms: TreatyTerms,
    ) -> TreatyId {
        let id = self.next_treaty_id();
        for (me, other) in [(a, b), (b, a)] {
            if let Some(planet) = self.planet_mut(me) {
                planet.active_treaties.push(id);
                planet.allies.insert(other.to_string());
            }
        }
        self.treaties.push(Treaty::new(id, kind, a, b, duration, terms));
        id
    }

    pub fn treaty(&self, id: TreatyId) -> Option<&Treaty> {
        self.treaties.iter().find(|t| t.id == id)
    }

    /// Treaties currently binding two planets
    pub fn treaties_between<'a>(&'a self, a: &'a str, b: &'a str) -> impl Iterator<Item = &'a Treaty> + 'a {
        self.treaties.iter().filter(move |t| t.binds(a, b))
    }

    pub fn has_treaty(&self, kind: TreatyType, a: &str, b: &str) -> bool {
        self.treaties_between(a, b).any(|t| t.kind == kind)
    }

    /// Drop every treaty a planet signed, on both sides
    pub fn strip_treaties(&mut self, planet: &str) {
        let (gone, kept): (Vec<Treaty>, Vec<Treaty>) =
            std::mem::take(&mut self.treaties).into_iter().partition(|t| t.involves(planet));
        self.treaties = kept;
        for treaty in gone {
            for p in &mut self.planets {
                p.active_treaties.retain(|id| *id != treaty.id);
            }
        }
    }

    /// Tear up every treaty binding two planets. Returns the removed treaties.
    pub fn break_treaties(&mut self, a: &str, b: &str) -> Vec<Treaty> {
        let (gone, kept): (Vec<Treaty>, Vec<Treaty>) =
            std::mem::take(&mut self.treaties).into_iter().partition(|t| t.binds(a, b));
        self.treaties = kept;
        for treaty in &gone {
            for name in [a, b] {
                if let Some(planet) = self.planet_mut(name) {
                    planet.active_treaties.retain(|id| *id != treaty.id);
                }
            }
        }
        gone
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.log.record(self.year, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_planets() -> Galaxy {
        let mut galaxy = Galaxy::new(1);
        galaxy.add_planet(Planet::new("Earth", false));
        galaxy.add_planet(Planet::new("Cybera", true));
        galaxy
    }

    #[test]
    fn test_new_planet_meets_others_neutrally() {
        let galaxy = two_planets();
        assert_eq!(galaxy.planets[0].relations.get("Cybera"), Some(&RelationState::Neutral));
        assert_eq!(galaxy.planets[1].relations.get("Earth"), Some(&RelationState::Neutral));
    }

    #[test]
    fn test_sign_treaty_registers_on_both_sides() {
        let mut galaxy = two_planets();
        let id = galaxy.sign_treaty(TreatyType::Trade, "Earth", "Cybera", 5, TreatyTerms::default());
        for planet in &galaxy.planets {
            assert_eq!(planet.active_treaties, vec![id]);
            assert_eq!(planet.allies.len(), 1);
        }
        assert!(galaxy.has_treaty(TreatyType::Trade, "Cybera", "Earth"));
        assert!(!galaxy.has_treaty(TreatyType::NonAggression, "Cybera", "Earth"));

        galaxy.strip_treaties("Cybera");
        assert!(galaxy.treaties.is_empty());
        assert!(galaxy.planets[0].active_treaties.is_empty());
    }

    #[test]
    fn test_break_treaties_leaves_other_pairs_alone() {
        let mut galaxy = two_planets();
        galaxy.add_planet(Planet::new("Vulcan", true));
        galaxy.sign_treaty(TreatyType::Trade, "Earth", "Cybera", 5, TreatyTerms::default());
        galaxy.sign_treaty(TreatyType::TechShare, "Cybera", "Earth", 5, TreatyTerms::default());
        let kept = galaxy.sign_treaty(TreatyType::Trade, "Earth", "Vulcan", 5, TreatyTerms::default());

        let gone = galaxy.break_treaties("Cybera", "Earth");
        assert_eq!(gone.len(), 2);
        assert_eq!(galaxy.treaties.len(), 1);
        assert_eq!(galaxy.planets[0].active_treaties, vec![kept]);
        assert!(galaxy.planets[1].active_treaties.is_empty());
        assert_eq!(galaxy.planets[2].active_treaties, vec![kept]);
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let galaxy = two_planets();
        assert!(matches!(galaxy.planet_index("Mars"), Err(SimError::UnknownPlanet(_))));
        assert!(matches!(galaxy.city_location("Paris"), Err(SimError::UnknownCity(_))));
    }

    #[test]
    fn test_snapshot_round_trip_keeps_state() {
        let mut galaxy = two_planets();
        galaxy.year = 7;
        galaxy.record("something happened");
        let restored = Galaxy::from_json(&galaxy.to_json().unwrap()).unwrap();
        assert_eq!(restored.year, 7);
        assert_eq!(restored.planets.len(), 2);
        assert_eq!(restored.log.message_count(), 1);
    }
}
