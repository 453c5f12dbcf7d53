//! Simulation output and serialization

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::Result;
use crate::galaxy::world::Galaxy;

/// Complete output of a batch run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub final_world: Galaxy,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub years_simulated: u32,
    pub simulation_time_ms: u64,
    pub log_lines: usize,
    pub wars_declared: u32,
    pub planets_at_start: usize,
    pub planets_at_end: usize,
    pub population_at_start: usize,
    pub population_at_end: usize,
    pub deaths: usize,
    pub families: usize,
}

impl SimulationOutput {
    pub fn new(
        galaxy: Galaxy,
        years: u32,
        planets_at_start: usize,
        population_at_start: usize,
        elapsed: Duration,
    ) -> Self {
        let deaths = galaxy
            .planets
            .iter()
            .flat_map(|p| p.cities.iter())
            .map(|c| c.graveyard.len())
            .sum();
        let families = galaxy.people.families.values().filter(|f| !f.members.is_empty()).count();

        let statistics = SimulationStats {
            years_simulated: years,
            simulation_time_ms: elapsed.as_millis() as u64,
            log_lines: galaxy.log.message_count(),
            wars_declared: galaxy.wars_declared,
            planets_at_start,
            planets_at_end: galaxy.planets.len(),
            population_at_start,
            population_at_end: galaxy.total_population(),
            deaths,
            families,
        };

        Self {
            final_world: galaxy,
            statistics,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut output: SimulationOutput = serde_json::from_str(json)?;
        output.final_world.reseed();
        Ok(output)
    }

    pub fn summary(&self) -> String {
        let s = &self.statistics;
        format!(
            "Simulated {} years in {}ms\n\
             Population {} -> {} ({} buried in city graveyards, {} families)\n\
             Planets {} -> {}, {} wars declared, {} log lines",
            s.years_simulated,
            s.simulation_time_ms,
            s.population_at_start,
            s.population_at_end,
            s.deaths,
            s.families,
            s.planets_at_start,
            s.planets_at_end,
            s.wars_declared,
            s.log_lines,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::galaxy::generation::WorldConfig;
    use crate::galaxy::simulation::run;

    #[test]
    fn test_output_summary_and_json() {
        let output = run(&WorldConfig::default(), &SimConfig::default(), 3);
        assert_eq!(output.statistics.years_simulated, 3);
        assert_eq!(output.statistics.planets_at_start, 2);
        assert!(output.summary().starts_with("Simulated 3 years"));

        let json = output.to_json().unwrap();
        let restored = SimulationOutput::from_json(&json).unwrap();
        assert_eq!(restored.final_world.year, 3);
        assert_eq!(restored.statistics.log_lines, output.statistics.log_lines);
    }
}
