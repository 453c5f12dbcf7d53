//! Manual event triggers for an operator outside the tick loop
//!
//! Each trigger applies its event immediately, records it in the event log
//! like the automatic version would, and returns a short status line.

use rand::seq::SliceRandom;

use crate::core::error::Result;
use crate::core::types::{GovernmentType, TechCategory};
use crate::galaxy::systems::{revolution, start_epidemic, unlock_breakthroughs};
use crate::galaxy::world::Galaxy;

/// Force a revolution in a city
pub fn trigger_revolution(galaxy: &mut Galaxy, city: &str) -> Result<String> {
    let (pi, ci) = galaxy.city_location(city)?;
    if galaxy.planets[pi].cities[ci].is_empty() {
        let message = format!("No revolution in {}: it has no citizens", city);
        galaxy.record(message.clone());
        return Ok(message);
    }
    Ok(revolution(galaxy, pi, ci))
}

/// Start an epidemic on a planet unless one is already raging
pub fn trigger_epidemic(galaxy: &mut Galaxy, planet: &str) -> Result<String> {
    let pi = galaxy.planet_index(planet)?;
    let Galaxy { planets, rng, .. } = &mut *galaxy;
    let p = &mut planets[pi];

    let message = if p.epidemic_active {
        format!("An epidemic is already raging on {} (severity {:.2})", p.name, p.epidemic_severity)
    } else {
        let severity = start_epidemic(p, rng);
        format!("An epidemic breaks out on {} (severity {:.2})", p.name, severity)
    };
    galaxy.record(message.clone());
    Ok(message)
}

/// The military seizes a city: authoritarian rule, a new party in power, trust falls
pub fn trigger_coup(galaxy: &mut Galaxy, city: &str) -> Result<String> {
    let (pi, ci) = galaxy.city_location(city)?;
    let Galaxy { planets, people, rng, .. } = &mut *galaxy;
    let home = &mut planets[pi].cities[ci];

    home.government = GovernmentType::Authoritarian;
    let challengers: Vec<String> = home
        .parties
        .iter()
        .map(|p| p.name.clone())
        .filter(|name| home.ruling_party.as_deref() != Some(name.as_str()))
        .collect();
    let seized = challengers.choose(rng).cloned();
    if let Some(party) = &seized {
        home.ruling_party = Some(party.clone());
    }
    for id in &home.citizens {
        if let Some(citizen) = people.get_mut(*id) {
            citizen.adjust_trust(-0.1);
        }
    }

    let message = match seized {
        Some(party) => format!("Coup in {}! The {} seizes power under military rule", home.name, party),
        None => format!("Coup in {}! A military junta takes power", home.name),
    };
    tracing::info!(city = %home.name, "Coup");
    galaxy.record(message.clone());
    Ok(message)
}

/// Every research field jumps ahead; newly reached breakthroughs unlock at once
pub fn trigger_tech_awakening(galaxy: &mut Galaxy, planet: &str) -> Result<String> {
    let pi = galaxy.planet_index(planet)?;
    let Galaxy { planets, log, year, .. } = &mut *galaxy;
    let p = &mut planets[pi];

    for category in TechCategory::ALL {
        p.tech.add(category, 0.1);
    }
    let unlocked = unlock_breakthroughs(p, log, *year);

    let message = if unlocked.is_empty() {
        format!("{} experiences a technological awakening", p.name)
    } else {
        let names: Vec<&str> = unlocked.iter().map(|b| b.name()).collect();
        format!("{} experiences a technological awakening: {}", p.name, names.join(", "))
    };
    galaxy.record(message.clone());
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::error::SimError;
    use crate::galaxy::generation::WorldConfig;

    fn galaxy() -> Galaxy {
        Galaxy::generate(&WorldConfig::default(), &SimConfig::default())
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let mut g = galaxy();
        assert!(matches!(trigger_revolution(&mut g, "Atlantis"), Err(SimError::UnknownCity(_))));
        assert!(matches!(trigger_coup(&mut g, "Atlantis"), Err(SimError::UnknownCity(_))));
        assert!(matches!(trigger_epidemic(&mut g, "Vulcan"), Err(SimError::UnknownPlanet(_))));
        assert!(matches!(trigger_tech_awakening(&mut g, "Vulcan"), Err(SimError::UnknownPlanet(_))));
        assert_eq!(g.log.message_count(), 0);
    }

    #[test]
    fn test_epidemic_trigger_is_logged_once_active() {
        let mut g = galaxy();
        let first = trigger_epidemic(&mut g, "Earth").unwrap();
        assert!(first.starts_with("An epidemic breaks out on Earth"));
        assert!(g.planet("Earth").unwrap().epidemic_active);
        let second = trigger_epidemic(&mut g, "Earth").unwrap();
        assert!(second.starts_with("An epidemic is already raging"));
        assert_eq!(g.log.message_count(), 2);
    }

    #[test]
    fn test_coup_installs_authoritarian_rule() {
        let mut g = galaxy();
        let before: Vec<f32> = {
            let (pi, ci) = g.city_location("Tokyo").unwrap();
            g.planets[pi].cities[ci]
                .citizens
                .iter()
                .map(|id| g.people.get(*id).unwrap().trust)
                .collect()
        };
        let message = trigger_coup(&mut g, "Tokyo").unwrap();
        let (pi, ci) = g.city_location("Tokyo").unwrap();
        let city = &g.planets[pi].cities[ci];
        assert_eq!(city.government, GovernmentType::Authoritarian);
        assert!(city.ruling_party.is_some());
        assert!(message.starts_with("Coup in Tokyo"));
        for (id, old) in city.citizens.iter().zip(before) {
            assert!(g.people.get(*id).unwrap().trust <= old);
        }
    }

    #[test]
    fn test_tech_awakening_unlocks_breakthroughs() {
        let mut g = galaxy();
        let message = trigger_tech_awakening(&mut g, "Cybera").unwrap();
        let planet = g.planet("Cybera").unwrap();
        assert!((planet.tech.medical - 0.6).abs() < 1e-5);
        assert_eq!(planet.breakthroughs.len(), 4);
        assert!(message.contains("Super Vaccine"));
    }

    #[test]
    fn test_revolution_needs_citizens() {
        let mut g = galaxy();
        let (pi, ci) = g.city_location("Seoul").unwrap();
        let city = &mut g.planets[pi].cities[ci];
        for id in city.citizens.clone() {
            g.people.bury(city, id, crate::core::types::DeathCause::Natural);
        }
        let government = g.planets[pi].cities[ci].government;

        let message = trigger_revolution(&mut g, "Seoul").unwrap();
        assert!(message.contains("no citizens"));
        assert_eq!(g.planets[pi].cities[ci].government, government);
        assert_eq!(g.log.message_count(), 1);
    }

    #[test]
    fn test_revolution_trigger_reports() {
        let mut g = galaxy();
        let message = trigger_revolution(&mut g, "Seoul").unwrap();
        assert!(message.starts_with("Revolution in Seoul"));
        assert_eq!(g.log.message_count(), 1);
    }
}
