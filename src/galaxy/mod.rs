//! Galaxy Simulation
//!
//! Planets, cities and citizens advanced one year per tick. Four engines run
//! in a fixed order each year: technology, interstellar relations, settlement
//! and citizen lifecycle, with galaxy-wide federation events ahead of them.

pub mod citizen;
pub mod city;
pub mod events;
pub mod family;
pub mod generation;
pub mod metrics;
pub mod output;
pub mod party;
pub mod planet;
pub mod population;
pub mod simulation;
pub mod systems;
pub mod tech;
pub mod treaty;
pub mod triggers;
pub mod world;

pub use citizen::{Citizen, GraveRecord};
pub use city::{City, Resources};
pub use events::{EventLog, YearEntry};
pub use family::Family;
pub use generation::{PlanetSpec, WorldConfig};
pub use metrics::{
    citizen_metric, city_metric, metric_by_name, planet_metric, CitizenMetric, CityMetric, PlanetMetric,
};
pub use output::{SimulationOutput, SimulationStats};
pub use party::{Platform, PoliticalParty};
pub use planet::Planet;
pub use population::Population;
pub use simulation::{run, simulate, simulate_year};
pub use tech::{Breakthrough, TechLevels};
pub use treaty::{Treaty, TreatyTerms, TreatyType};
pub use triggers::{trigger_coup, trigger_epidemic, trigger_revolution, trigger_tech_awakening};
pub use world::{Federation, FederationPolicy, Galaxy};
