//! Main simulation loop

use crate::core::config::SimConfig;
use crate::galaxy::generation::WorldConfig;
use crate::galaxy::output::SimulationOutput;
use crate::galaxy::systems;
use crate::galaxy::world::Galaxy;

/// Advance the galaxy by one year
pub fn simulate_year(galaxy: &mut Galaxy, config: &SimConfig) {
    galaxy.year += 1;
    for city in galaxy.planets.iter_mut().flat_map(|p| p.cities.iter_mut()) {
        city.reset_counters();
    }

    // 1. Treaties age before anyone acts on them
    expire_treaties(galaxy);

    // 2. Federation politics, new planets, stories
    systems::galaxy_events(galaxy, config);

    // 3. Research and planetary health
    for pi in 0..galaxy.planets.len() {
        if galaxy.planets[pi].alive {
            systems::update_planet(galaxy, pi, config);
        }
    }

    // 4. Interstellar relations
    systems::update_relations(galaxy, config);

    // 5. Cities, then their citizens. Moves wait until every planet is done
    // so no migrant is processed twice in one year.
    let mut migrations = Vec::new();
    for pi in 0..galaxy.planets.len() {
        if !galaxy.planets[pi].alive {
            continue;
        }
        systems::trade_between_cities(galaxy, pi, config);

        for ci in 0..galaxy.planets[pi].cities.len() {
            migrations.extend(systems::update_city(galaxy, pi, ci, config));
            migrations.extend(systems::update_citizens(galaxy, pi, ci, config));
        }
    }
    systems::apply_migrations(galaxy, migrations);

    // 6. End of year
    galaxy.people.update_family_reputations();
    check_extinction(galaxy);
    for planet in &mut galaxy.planets {
        planet.shield_active = false;
    }
    record_population_change(galaxy);
}

/// Run up to `years` ticks; stops early once no planet is left
pub fn simulate(galaxy: &mut Galaxy, config: &SimConfig, years: u32) -> u32 {
    for ran in 0..years {
        if galaxy.planets.is_empty() {
            return ran;
        }
        simulate_year(galaxy, config);
    }
    years
}

/// Generate a galaxy and run it, timing the whole batch
pub fn run(world: &WorldConfig, config: &SimConfig, years: u32) -> SimulationOutput {
    let start = std::time::Instant::now();
    let mut galaxy = Galaxy::generate(world, config);
    let planets_at_start = galaxy.planets.len();
    let population_at_start = galaxy.total_population();

    let ran = simulate(&mut galaxy, config, years);

    SimulationOutput::new(galaxy, ran, planets_at_start, population_at_start, start.elapsed())
}

/// Count every treaty down; expired treaties leave both planets, and a pair
/// with no treaty left between them stops being allies
fn expire_treaties(galaxy: &mut Galaxy) {
    let mut expired = Vec::new();
    galaxy.treaties.retain_mut(|treaty| {
        if treaty.count_down() {
            true
        } else {
            expired.push(treaty.clone());
            false
        }
    });

    for treaty in expired {
        let (a, b) = (&treaty.signatories[0], &treaty.signatories[1]);
        let still_bound = galaxy.treaties_between(a, b).next().is_some();
        for (me, other) in [(a, b), (b, a)] {
            if let Some(planet) = galaxy.planet_mut(me) {
                planet.active_treaties.retain(|id| *id != treaty.id);
                if !still_bound {
                    planet.allies.remove(other);
                }
            }
        }
        galaxy.record(format!("The {} between {} and {} expires", treaty.kind.label(), a, b));
    }
}

/// Planets whose every city stands empty die; the rest forget them
fn check_extinction(galaxy: &mut Galaxy) {
    let dead: Vec<String> = galaxy
        .planets
        .iter()
        .filter(|p| p.alive && p.is_depopulated())
        .map(|p| p.name.clone())
        .collect();

    for name in dead {
        if let Some(planet) = galaxy.planet_mut(&name) {
            planet.alive = false;
        }
        galaxy.strip_treaties(&name);
        tracing::info!(planet = %name, year = galaxy.year, "Extinction");
        galaxy.record(format!("{} has gone extinct: its last city stands empty", name));
    }

    galaxy.planets.retain(|p| p.alive);
    let living: Vec<String> = galaxy.planets.iter().map(|p| p.name.clone()).collect();
    galaxy.map_layout.retain(|name, _| living.contains(name));
    for planet in &mut galaxy.planets {
        let gone: Vec<String> = planet
            .relations
            .keys()
            .chain(planet.war_with.iter())
            .chain(planet.allies.iter())
            .filter(|n| !living.contains(n))
            .cloned()
            .collect();
        for name in gone {
            planet.forget(&name);
        }
    }
}

fn record_population_change(galaxy: &mut Galaxy) {
    let current = galaxy.total_population();
    let delta = current as i64 - galaxy.prev_total_population as i64;
    galaxy.prev_total_population = current;
    tracing::debug!(year = galaxy.year, population = current, delta, "Year complete");
    galaxy.record(format!("Galaxy population: {} ({:+})", current, delta));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GovernmentType, Specialization};
    use crate::galaxy::citizen::Citizen;
    use crate::galaxy::city::City;
    use crate::galaxy::planet::Planet;
    use crate::galaxy::treaty::{TreatyTerms, TreatyType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> SimConfig {
        let mut config = SimConfig::default();
        config.federation.new_planet_chance = 0.0;
        config.interstellar.treaty_chance = 0.0;
        config
    }

    #[test]
    fn test_year_advances_and_logs_population() {
        let config = config();
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        simulate_year(&mut galaxy, &config);
        assert_eq!(galaxy.year, 1);
        assert!(galaxy
            .log
            .messages_for_year(1)
            .any(|m| m.starts_with("Galaxy population:")));
    }

    #[test]
    fn test_treaty_expires_after_its_duration() {
        let config = config();
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        galaxy.sign_treaty(TreatyType::Trade, "Earth", "Cybera", 3, TreatyTerms::default());

        for _ in 0..2 {
            simulate_year(&mut galaxy, &config);
        }
        assert_eq!(galaxy.treaties.len(), 1);
        simulate_year(&mut galaxy, &config);
        assert!(galaxy.treaties.is_empty());
        assert!(galaxy.planets.iter().all(|p| p.active_treaties.is_empty() && p.allies.is_empty()));
    }

    #[test]
    fn test_empty_planet_is_pruned() {
        let mut config = config();
        config.citizen.immigration_base_chance = 0.0;
        config.city.movement_flight_chance = 0.0;
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        let pi = galaxy.planet_index("Cybera").unwrap();
        for ci in 0..galaxy.planets[pi].cities.len() {
            let city = &mut galaxy.planets[pi].cities[ci];
            for id in city.citizens.clone() {
                galaxy.people.bury(city, id, crate::core::types::DeathCause::Epidemic);
            }
        }
        simulate_year(&mut galaxy, &config);

        assert!(galaxy.planet("Cybera").is_none());
        assert!(galaxy.planets.iter().all(|p| !p.relations.contains_key("Cybera")));
        assert!(galaxy.log.messages_for_year(1).any(|m| m.contains("Cybera has gone extinct")));
    }

    #[test]
    fn test_migrant_to_later_planet_ages_once() {
        let mut config = config();
        config.interstellar.conflict_rate = 0.0;
        config.interstellar.random_attack_chance = 0.0;
        config.citizen.immigration_base_chance = 1.0;
        config.citizen.marriage_chance = 0.0;
        config.citizen.accident_death_rate = 0.0;
        config.city.mass_movement_chance = 0.0;
        config.city.gov_change_chance = 0.0;
        config.planet.epidemic_rate = 0.0;

        let mut galaxy = Galaxy::new(9);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut ids = Vec::new();
        for (name, alien, city) in [("Earth", false, "Taipei"), ("Cybera", true, "Ainos")] {
            let mut planet = Planet::new(name, alien);
            planet.cities.push(City::new(city, GovernmentType::Democratic, Specialization::Agriculture));
            let pi = galaxy.add_planet(planet);
            let id = galaxy.people.next_id();
            let mut citizen = Citizen::generate(id, format!("C{}", id.0), city, &mut rng);
            citizen.age = 30;
            citizen.health = 1.0;
            citizen.wealth = 100.0;
            ids.push(galaxy.spawn_citizen(pi, 0, citizen));
        }
        galaxy.planets[1].cities[0].resources.food = 1000.0;

        simulate_year(&mut galaxy, &config);

        let migrant = galaxy.people.get(ids[0]).unwrap();
        assert_eq!(migrant.city, "Ainos");
        assert_eq!(migrant.age, 31);
        assert_eq!(galaxy.people.get(ids[1]).unwrap().age, 31);
        assert_eq!(galaxy.planets[1].cities[0].immigration_count, 1);
    }

    #[test]
    fn test_simulate_runs_requested_years() {
        let config = config();
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        assert_eq!(simulate(&mut galaxy, &config, 5), 5);
        assert_eq!(galaxy.year, 5);
    }
}
