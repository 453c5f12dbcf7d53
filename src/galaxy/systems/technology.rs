//! Tech progression engine - research, breakthroughs, pollution, epidemics, defense

use rand::Rng;

use crate::core::config::SimConfig;
use crate::core::types::{DeathCause, TechCategory, Year};
use crate::galaxy::events::EventLog;
use crate::galaxy::planet::Planet;
use crate::galaxy::tech::{Breakthrough, EffectKey};
use crate::galaxy::world::{FederationPolicy, Galaxy};

/// One year of research and planetary health
pub fn update_planet(galaxy: &mut Galaxy, planet: usize, config: &SimConfig) {
    let grant = galaxy.federation.is_active(FederationPolicy::ResearchGrant);
    let Galaxy { planets, rng, log, year, .. } = &mut *galaxy;
    let p = &mut planets[planet];
    let rates = &config.planet;

    let boost = if grant { 1.5 } else { 1.0 };
    for category in TechCategory::ALL {
        let growth = rng.gen_range(rates.tech_growth_min..=rates.tech_growth_max) * boost;
        p.tech.add(category, growth);
    }
    unlock_breakthroughs(p, log, *year);

    update_pollution(p, rng, config);
    update_defense(p, rng, log, *year, config);

    update_epidemic(galaxy, planet, config);
}

/// Unlock every breakthrough whose threshold has been reached. Unlocking is
/// idempotent; returns only the newly unlocked ones.
pub fn unlock_breakthroughs(planet: &mut Planet, log: &mut EventLog, year: Year) -> Vec<Breakthrough> {
    let mut unlocked = Vec::new();
    for category in TechCategory::ALL {
        let level = planet.tech.get(category);
        for breakthrough in Breakthrough::for_category(category) {
            if level + f32::EPSILON < breakthrough.threshold() || planet.has_breakthrough(breakthrough) {
                continue;
            }
            planet.breakthroughs.push(breakthrough);
            unlocked.push(breakthrough);
            log.record(year, format!("{} achieves a breakthrough: {}", planet.name, breakthrough.name()));
            tracing::info!(planet = %planet.name, breakthrough = breakthrough.name(), "Breakthrough");
        }
    }
    unlocked
}

fn update_pollution<R: Rng + ?Sized>(planet: &mut Planet, rng: &mut R, config: &SimConfig) {
    let rates = &config.planet;
    if planet.unlocked(EffectKey::PollutionReset) {
        planet.pollution = 0.0;
        return;
    }
    let growth = rng.gen_range(rates.pollution_growth_min..=rates.pollution_growth_max)
        * planet.multiplier(EffectKey::PollutionGrowth);
    let cleanup = planet.tech.environment * rates.pollution_tech_reduction + planet.bonus(EffectKey::PollutionCleanup);
    planet.pollution = (planet.pollution + growth - cleanup).max(0.0);
}

fn update_defense<R: Rng + ?Sized>(planet: &mut Planet, rng: &mut R, log: &mut EventLog, year: Year, config: &SimConfig) {
    let rates = &config.planet;
    let cap = rates.defense_base_cap + planet.bonus(EffectKey::DefenseCap);
    planet.defense_level = (planet.defense_level + planet.tech.military * 2.0).min(cap);

    if !planet.shield_active
        && planet.tech.military >= rates.shield_tech_threshold
        && rng.gen::<f32>() < rates.shield_chance
    {
        planet.shield_active = true;
        log.record(year, format!("{} raises a planetary shield", planet.name));
    }
}

/// Start an epidemic on a planet; severity shrinks with medical research
pub fn start_epidemic<R: Rng + ?Sized>(planet: &mut Planet, rng: &mut R) -> f32 {
    let severity = rng.gen_range(0.1..0.5)
        * (1.0 - planet.tech.medical * 0.5)
        * planet.multiplier(EffectKey::EpidemicSeverity);
    planet.epidemic_active = true;
    planet.epidemic_severity = severity.max(0.01);
    planet.epidemic_severity
}

fn update_epidemic(galaxy: &mut Galaxy, planet: usize, config: &SimConfig) {
    let rates = &config.planet;
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let p = &mut planets[planet];

    if !p.epidemic_active {
        let chance = rates.epidemic_rate * p.multiplier(EffectKey::EpidemicChance) * (1.0 - p.tech.medical * 0.5);
        if rng.gen::<f32>() < chance {
            let severity = start_epidemic(p, rng);
            log.record(*year, format!("An epidemic breaks out on {} (severity {:.2})", p.name, severity));
            tracing::info!(planet = %p.name, severity, "Epidemic");
        }
        return;
    }

    let severity = p.epidemic_severity;
    let mut dead = 0;
    for home in &mut p.cities {
        for id in home.citizens.clone() {
            let Some(citizen) = people.get_mut(id) else {
                continue;
            };
            citizen.adjust_health(-severity * 0.2);
            citizen.adjust_happiness(-severity * 0.1);
            if (citizen.health <= 0.0 || rng.gen::<f32>() < severity * 0.05)
                && people.bury(home, id, DeathCause::Epidemic)
            {
                dead += 1;
            }
        }
    }

    p.epidemic_severity -= rng.gen_range(rates.epidemic_recovery_min..=rates.epidemic_recovery_max);
    if dead > 0 {
        log.record(*year, format!("The epidemic on {} claims {} lives", p.name, dead));
    }
    if p.epidemic_severity < rates.epidemic_end_threshold {
        p.epidemic_active = false;
        p.epidemic_severity = 0.0;
        log.record(*year, format!("The epidemic on {} is over", p.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GovernmentType, Specialization};
    use crate::galaxy::city::City;

    fn lone_planet() -> Galaxy {
        let mut galaxy = Galaxy::new(6);
        let mut planet = Planet::new("Earth", false);
        planet.cities.push(City::new("Taipei", GovernmentType::Democratic, Specialization::Technology));
        galaxy.add_planet(planet);
        galaxy
    }

    #[test]
    fn test_breakthrough_unlocks_once() {
        let mut planet = Planet::new("Earth", false);
        let mut log = EventLog::new();
        planet.tech.set(TechCategory::Medical, 0.85);

        let first = unlock_breakthroughs(&mut planet, &mut log, 1);
        assert_eq!(first, vec![Breakthrough::SuperVaccine, Breakthrough::RegenerativeMedicine]);
        let again = unlock_breakthroughs(&mut planet, &mut log, 2);
        assert!(again.is_empty());
        assert_eq!(planet.breakthroughs.len(), 2);
        assert_eq!(log.message_count(), 2);
    }

    #[test]
    fn test_tech_grows_and_caps() {
        let mut galaxy = lone_planet();
        let mut config = SimConfig::default();
        config.planet.epidemic_rate = 0.0;
        galaxy.planets[0].tech.set(TechCategory::Production, 0.999);
        update_planet(&mut galaxy, 0, &config);
        let tech = &galaxy.planets[0].tech;
        assert_eq!(tech.production, 1.0);
        assert!(tech.military > 0.5);
        assert!(galaxy.planets[0].has_breakthrough(Breakthrough::Replicators));
    }

    #[test]
    fn test_pollution_never_negative() {
        let mut galaxy = lone_planet();
        let mut config = SimConfig::default();
        config.planet.epidemic_rate = 0.0;
        galaxy.planets[0].tech.set(TechCategory::Environment, 1.0);
        galaxy.planets[0].breakthroughs.push(Breakthrough::EcoRestoration);
        for _ in 0..10 {
            update_planet(&mut galaxy, 0, &config);
        }
        assert!(galaxy.planets[0].pollution >= 0.0);
    }

    #[test]
    fn test_defense_respects_cap() {
        let mut galaxy = lone_planet();
        let mut config = SimConfig::default();
        config.planet.epidemic_rate = 0.0;
        for _ in 0..100 {
            update_planet(&mut galaxy, 0, &config);
        }
        let planet = &galaxy.planets[0];
        assert!(planet.defense_level <= config.planet.defense_base_cap + planet.bonus(EffectKey::DefenseCap));
    }

    #[test]
    fn test_epidemic_eventually_ends() {
        let mut galaxy = lone_planet();
        let mut config = SimConfig::default();
        config.planet.epidemic_rate = 0.0;
        galaxy.planets[0].epidemic_active = true;
        galaxy.planets[0].epidemic_severity = 0.3;
        for _ in 0..10 {
            update_planet(&mut galaxy, 0, &config);
        }
        assert!(!galaxy.planets[0].epidemic_active);
        assert!(galaxy.log.entries.iter().flat_map(|e| e.messages.iter()).any(|m| m.contains("is over")));
    }
}
