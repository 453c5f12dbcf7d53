//! World topology and initial galaxy generation

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Ideology;
use crate::galaxy::citizen::Citizen;
use crate::galaxy::city::City;
use crate::galaxy::family::Family;
use crate::galaxy::party::{Platform, PoliticalParty};
use crate::galaxy::planet::Planet;
use crate::galaxy::world::Galaxy;

const GIVEN_NAMES: [&str; 16] = [
    "Mei", "Jun", "Hana", "Kai", "Yuki", "Min", "Ren", "Sora", "Lan", "Hao", "Aiko", "Tae", "Wen",
    "Jin", "Rin", "Bo",
];

const PLANET_NAMES: [&str; 10] = [
    "Zephyria", "Nox", "Veloria", "Kalyx", "Orryn", "Thessa", "Umbra", "Xylo", "Quorra", "Ilvane",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySpec {
    pub name: String,
    pub ideology: Ideology,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetSpec {
    pub name: String,
    #[serde(default)]
    pub alien: bool,
    pub cities: Vec<String>,
    /// Founding citizens per city
    pub population: u32,
    #[serde(default)]
    pub parties: Vec<PartySpec>,
}

/// Initial topology of the galaxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub seed: u64,
    /// Founding families; every founder joins one at random
    pub families: Vec<String>,
    pub planets: Vec<PlanetSpec>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let party = |name: &str, ideology, platform| PartySpec {
            name: name.to_string(),
            ideology,
            platform,
        };
        Self {
            seed: 42,
            families: vec!["Wang".into(), "Li".into(), "Zhang".into()],
            planets: vec![
                PlanetSpec {
                    name: "Earth".into(),
                    alien: false,
                    cities: vec!["Taipei".into(), "Tokyo".into(), "Seoul".into()],
                    population: 30,
                    parties: vec![
                        party("Unity Party", Ideology::Conservative, Platform::StableDevelopment),
                        party("Reform Party", Ideology::Liberal, Platform::Reform),
                    ],
                },
                PlanetSpec {
                    name: "Cybera".into(),
                    alien: true,
                    cities: vec!["Ainos".into(), "Tranga".into()],
                    population: 20,
                    parties: vec![
                        party("Interstellar Alliance", Ideology::TechnoFaith, Platform::InterstellarExpansion),
                        party("Primordial Faith", Ideology::Conservative, Platform::ReturnToOrigins),
                    ],
                },
            ],
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WorldConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.planets.is_empty() {
            return Err(SimError::InvalidConfig("world has no planets".into()));
        }
        let mut cities: Vec<&str> = Vec::new();
        for planet in &self.planets {
            if planet.cities.is_empty() {
                return Err(SimError::InvalidConfig(format!("planet {} has no cities", planet.name)));
            }
            if self.planets.iter().filter(|p| p.name == planet.name).count() > 1 {
                return Err(SimError::InvalidConfig(format!("duplicate planet {}", planet.name)));
            }
            for city in &planet.cities {
                if cities.contains(&city.as_str()) {
                    return Err(SimError::InvalidConfig(format!("duplicate city {}", city)));
                }
                cities.push(city);
            }
        }
        Ok(())
    }
}

impl Galaxy {
    /// Build the starting galaxy described by `world`
    pub fn generate(world: &WorldConfig, config: &SimConfig) -> Self {
        let mut galaxy = Galaxy::new(world.seed);

        for name in &world.families {
            let reputation = galaxy.rng.gen_range(0.2..0.6);
            galaxy.people.families.insert(name.clone(), Family::new(name.clone(), reputation));
        }

        for spec in &world.planets {
            let mut planet = Planet::new(spec.name.clone(), spec.alien);
            for city_name in &spec.cities {
                let mut city = City::generate(city_name.clone(), &mut galaxy.rng);
                city.parties = spec
                    .parties
                    .iter()
                    .map(|p| PoliticalParty::new(p.name.clone(), p.ideology, p.platform))
                    .collect();
                city.election_timer = galaxy
                    .rng
                    .gen_range(1..=config.city.election_interval_min.max(1));
                planet.cities.push(city);
            }
            let coords = (galaxy.rng.gen_range(0.0..100.0), galaxy.rng.gen_range(0.0..100.0));
            galaxy.map_layout.insert(spec.name.clone(), coords);
            let pi = galaxy.add_planet(planet);

            for ci in 0..spec.cities.len() {
                for _ in 0..spec.population {
                    let family = world.families.choose(&mut galaxy.rng).cloned();
                    found_citizen(&mut galaxy, pi, ci, family);
                }
            }
        }

        galaxy.prev_total_population = galaxy.total_population();
        tracing::info!(
            planets = galaxy.planets.len(),
            population = galaxy.prev_total_population,
            "Galaxy generated"
        );
        galaxy
    }
}

/// A random name for a citizen of `family`
pub fn citizen_name<R: Rng + ?Sized>(family: Option<&str>, rng: &mut R) -> String {
    let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
    match family {
        Some(surname) => format!("{} {}", given, surname),
        None => given.to_string(),
    }
}

fn found_citizen(galaxy: &mut Galaxy, planet: usize, city: usize, family: Option<String>) {
    let id = galaxy.people.next_id();
    let name = citizen_name(family.as_deref(), &mut galaxy.rng);
    let city_name = galaxy.planets[planet].cities[city].name.clone();
    let mut citizen = Citizen::generate(id, name, &city_name, &mut galaxy.rng);
    citizen.family = family;
    galaxy.spawn_citizen(planet, city, citizen);
}

/// Spawn a fresh alien planet into a running galaxy. Returns its name.
pub fn generate_new_planet(galaxy: &mut Galaxy, config: &SimConfig) -> Option<String> {
    let base = PLANET_NAMES.iter().find(|n| galaxy.planet(n).is_none()).copied();
    let name = match base {
        Some(n) => n.to_string(),
        None => format!("Planet-{}", galaxy.year),
    };
    if galaxy.planet(&name).is_some() {
        return None;
    }

    let mut planet = Planet::new(name.clone(), true);
    for i in 0..config.federation.new_planet_cities {
        let mut city = City::generate(format!("{} {}", name, i + 1), &mut galaxy.rng);
        let ideology = Ideology::random(&mut galaxy.rng);
        city.parties = vec![
            PoliticalParty::new(format!("{} Union", name), ideology, Platform::StableDevelopment),
            PoliticalParty::new(format!("{} Front", name), Ideology::random(&mut galaxy.rng), Platform::Reform),
        ];
        planet.cities.push(city);
    }
    let coords = (galaxy.rng.gen_range(0.0..100.0), galaxy.rng.gen_range(0.0..100.0));
    galaxy.map_layout.insert(name.clone(), coords);
    let pi = galaxy.add_planet(planet);

    for ci in 0..config.federation.new_planet_cities {
        for _ in 0..config.federation.new_planet_population {
            found_citizen(galaxy, pi, ci, None);
        }
    }

    Some(name)
}
