//! Reporting queries over planets and cities, looked up by name

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::CitizenId;
use crate::galaxy::citizen::Citizen;
use crate::galaxy::city::City;
use crate::galaxy::population::Population;
use crate::galaxy::world::Galaxy;

/// Value reported for an average over nobody
const EMPTY_AVERAGE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CityMetric {
    Population,
    AverageHealth,
    AverageTrust,
    AverageHappiness,
    AverageWealth,
    Food,
    Energy,
    Tax,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetMetric {
    Population,
    Pollution,
    ConflictLevel,
    DefenseLevel,
    TechAverage,
    AverageHealth,
    AverageTrust,
    AverageHappiness,
    AverageWealth,
    Food,
    Energy,
    Tax,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CitizenMetric {
    Health,
    Trust,
    Happiness,
    Wealth,
    Age,
    Education,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FromStr for CitizenMetric {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match normalize(s).as_str() {
            "health" => CitizenMetric::Health,
            "trust" => CitizenMetric::Trust,
            "happiness" => CitizenMetric::Happiness,
            "wealth" => CitizenMetric::Wealth,
            "age" => CitizenMetric::Age,
            "education" => CitizenMetric::Education,
            _ => return Err(SimError::UnknownMetric(s.to_string())),
        })
    }
}

impl FromStr for CityMetric {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match normalize(s).as_str() {
            "population" => CityMetric::Population,
            "health" | "average_health" => CityMetric::AverageHealth,
            "trust" | "average_trust" => CityMetric::AverageTrust,
            "happiness" | "average_happiness" => CityMetric::AverageHappiness,
            "wealth" | "average_wealth" => CityMetric::AverageWealth,
            "food" => CityMetric::Food,
            "energy" => CityMetric::Energy,
            "tax" => CityMetric::Tax,
            _ => return Err(SimError::UnknownMetric(s.to_string())),
        })
    }
}

impl FromStr for PlanetMetric {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match normalize(s).as_str() {
            "pollution" => PlanetMetric::Pollution,
            "conflict" | "conflict_level" => PlanetMetric::ConflictLevel,
            "defense" | "defense_level" => PlanetMetric::DefenseLevel,
            "tech" | "tech_average" => PlanetMetric::TechAverage,
            other => match CityMetric::from_str(other)? {
                CityMetric::Population => PlanetMetric::Population,
                CityMetric::AverageHealth => PlanetMetric::AverageHealth,
                CityMetric::AverageTrust => PlanetMetric::AverageTrust,
                CityMetric::AverageHappiness => PlanetMetric::AverageHappiness,
                CityMetric::AverageWealth => PlanetMetric::AverageWealth,
                CityMetric::Food => PlanetMetric::Food,
                CityMetric::Energy => PlanetMetric::Energy,
                CityMetric::Tax => PlanetMetric::Tax,
            },
        })
    }
}

fn average<'a>(citizens: impl Iterator<Item = &'a Citizen>, field: fn(&Citizen) -> f32) -> f32 {
    let (sum, n) = citizens.fold((0.0, 0usize), |(sum, n), c| (sum + field(c), n + 1));
    if n == 0 {
        EMPTY_AVERAGE
    } else {
        sum / n as f32
    }
}

fn measure_cities<'a>(
    cities: impl Iterator<Item = &'a City> + Clone,
    people: &'a Population,
    metric: CityMetric,
) -> f32 {
    let residents = cities.clone().flat_map(move |c| people.residents(c));
    match metric {
        CityMetric::Population => cities.map(|c| c.population()).sum::<usize>() as f32,
        CityMetric::AverageHealth => average(residents, |c| c.health),
        CityMetric::AverageTrust => average(residents, |c| c.trust),
        CityMetric::AverageHappiness => average(residents, |c| c.happiness),
        CityMetric::AverageWealth => average(residents, |c| c.wealth),
        CityMetric::Food => cities.map(|c| c.resources.food).sum(),
        CityMetric::Energy => cities.map(|c| c.resources.energy).sum(),
        CityMetric::Tax => cities.map(|c| c.resources.tax).sum(),
    }
}

/// A living citizen by numeric id or by name; among namesakes the oldest id wins
fn find_citizen<'a>(people: &'a Population, who: &str) -> Option<&'a Citizen> {
    let who = who.trim();
    if let Ok(id) = who.parse::<u32>() {
        return people.get(CitizenId(id));
    }
    people.iter().filter(|c| c.name == who).min_by_key(|c| c.id)
}

pub fn citizen_metric(galaxy: &Galaxy, who: &str, metric: CitizenMetric) -> Result<f32> {
    let citizen = find_citizen(&galaxy.people, who).ok_or_else(|| SimError::UnknownCitizen(who.to_string()))?;
    Ok(match metric {
        CitizenMetric::Health => citizen.health,
        CitizenMetric::Trust => citizen.trust,
        CitizenMetric::Happiness => citizen.happiness,
        CitizenMetric::Wealth => citizen.wealth,
        CitizenMetric::Age => citizen.age as f32,
        CitizenMetric::Education => citizen.education as f32,
    })
}

pub fn city_metric(galaxy: &Galaxy, city: &str, metric: CityMetric) -> Result<f32> {
    let (pi, ci) = galaxy.city_location(city)?;
    let home = &galaxy.planets[pi].cities[ci];
    Ok(measure_cities(std::iter::once(home), &galaxy.people, metric))
}

/// Planet-wide value; resource metrics are summed over cities, averages are
/// taken over every living resident
pub fn planet_metric(galaxy: &Galaxy, planet: &str, metric: PlanetMetric) -> Result<f32> {
    let pi = galaxy.planet_index(planet)?;
    let p = &galaxy.planets[pi];
    let over_cities = |m| measure_cities(p.cities.iter(), &galaxy.people, m);
    Ok(match metric {
        PlanetMetric::Pollution => p.pollution,
        PlanetMetric::ConflictLevel => p.conflict_level,
        PlanetMetric::DefenseLevel => p.defense_level,
        PlanetMetric::TechAverage => p.tech.average(),
        PlanetMetric::Population => over_cities(CityMetric::Population),
        PlanetMetric::AverageHealth => over_cities(CityMetric::AverageHealth),
        PlanetMetric::AverageTrust => over_cities(CityMetric::AverageTrust),
        PlanetMetric::AverageHappiness => over_cities(CityMetric::AverageHappiness),
        PlanetMetric::AverageWealth => over_cities(CityMetric::AverageWealth),
        PlanetMetric::Food => over_cities(CityMetric::Food),
        PlanetMetric::Energy => over_cities(CityMetric::Energy),
        PlanetMetric::Tax => over_cities(CityMetric::Tax),
    })
}

/// Look a metric up by its textual name, planet first, then city
pub fn metric_by_name(galaxy: &Galaxy, place: &str, metric: &str) -> Result<f32> {
    if galaxy.planet(place).is_some() {
        planet_metric(galaxy, place, metric.parse()?)
    } else {
        city_metric(galaxy, place, metric.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::types::DeathCause;
    use crate::galaxy::generation::WorldConfig;

    fn galaxy() -> Galaxy {
        Galaxy::generate(&WorldConfig::default(), &SimConfig::default())
    }

    #[test]
    fn test_parse_metric_names() {
        assert_eq!("Average Trust".parse::<CityMetric>().unwrap(), CityMetric::AverageTrust);
        assert_eq!("conflict-level".parse::<PlanetMetric>().unwrap(), PlanetMetric::ConflictLevel);
        assert_eq!("food".parse::<PlanetMetric>().unwrap(), PlanetMetric::Food);
        assert!(matches!("pollution".parse::<CityMetric>(), Err(SimError::UnknownMetric(_))));
    }

    #[test]
    fn test_planet_population_sums_cities() {
        let g = galaxy();
        let earth = planet_metric(&g, "Earth", PlanetMetric::Population).unwrap();
        let cities: f32 = ["Taipei", "Tokyo", "Seoul"]
            .iter()
            .map(|c| city_metric(&g, c, CityMetric::Population).unwrap())
            .sum();
        assert_eq!(earth, cities);
        assert_eq!(earth, 90.0);
    }

    #[test]
    fn test_averages_stay_in_range() {
        let g = galaxy();
        for metric in ["health", "trust", "happiness"] {
            let value = metric_by_name(&g, "Cybera", metric).unwrap();
            assert!((0.0..=1.0).contains(&value), "{} = {}", metric, value);
        }
    }

    #[test]
    fn test_empty_city_reports_neutral_average() {
        let mut g = galaxy();
        let (pi, ci) = g.city_location("Seoul").unwrap();
        let city = &mut g.planets[pi].cities[ci];
        for id in city.citizens.clone() {
            g.people.bury(city, id, DeathCause::Natural);
        }
        assert_eq!(city_metric(&g, "Seoul", CityMetric::AverageTrust).unwrap(), EMPTY_AVERAGE);
        assert_eq!(city_metric(&g, "Seoul", CityMetric::Population).unwrap(), 0.0);
    }

    #[test]
    fn test_citizen_metric_by_id_and_name() {
        let g = galaxy();
        let someone = g.people.iter().min_by_key(|c| c.id).unwrap();
        let by_id = citizen_metric(&g, &someone.id.0.to_string(), CitizenMetric::Trust).unwrap();
        assert_eq!(by_id, someone.trust);

        let namesake = g.people.iter().filter(|c| c.name == someone.name).min_by_key(|c| c.id).unwrap();
        let by_name = citizen_metric(&g, &someone.name, "wealth".parse::<CitizenMetric>().unwrap()).unwrap();
        assert_eq!(by_name, namesake.wealth);
        assert_eq!(
            citizen_metric(&g, &someone.name, CitizenMetric::Age).unwrap(),
            namesake.age as f32
        );
    }

    #[test]
    fn test_unknown_citizen_is_an_error() {
        let mut g = galaxy();
        assert!(matches!(
            citizen_metric(&g, "Nobody At All", CitizenMetric::Health),
            Err(SimError::UnknownCitizen(_))
        ));

        let (pi, ci) = g.city_location("Taipei").unwrap();
        let city = &mut g.planets[pi].cities[ci];
        let id = city.citizens[0];
        g.people.bury(city, id, DeathCause::Accident);
        assert!(matches!(
            citizen_metric(&g, &id.0.to_string(), CitizenMetric::Health),
            Err(SimError::UnknownCitizen(_))
        ));
        assert!(matches!("pollution".parse::<CitizenMetric>(), Err(SimError::UnknownMetric(_))));
    }

    #[test]
    fn test_unknown_place_is_an_error() {
        let g = galaxy();
        assert!(matches!(metric_by_name(&g, "Nowhere", "food"), Err(SimError::UnknownCity(_))));
        assert!(matches!(
            planet_metric(&g, "Nowhere", PlanetMetric::Pollution),
            Err(SimError::UnknownPlanet(_))
        ));
    }
}
