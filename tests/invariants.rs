//! Properties that hold after any number of years from any seed

use proptest::prelude::*;

use citysim::core::config::SimConfig;
use citysim::galaxy::generation::WorldConfig;
use citysim::galaxy::simulation::simulate;
use citysim::galaxy::world::Galaxy;

fn simulated(seed: u64, years: u32) -> Galaxy {
    let world = WorldConfig {
        seed,
        ..WorldConfig::default()
    };
    let config = SimConfig::default();
    let mut galaxy = Galaxy::generate(&world, &config);
    simulate(&mut galaxy, &config, years);
    galaxy
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn test_scores_stay_in_range(seed in any::<u64>(), years in 1u32..25) {
        let galaxy = simulated(seed, years);
        for c in galaxy.people.iter() {
            prop_assert!(c.alive);
            prop_assert!(c.death_cause.is_none());
            prop_assert!((0.1..=1.0).contains(&c.trust), "trust {}", c.trust);
            prop_assert!((0.1..=1.0).contains(&c.happiness), "happiness {}", c.happiness);
            prop_assert!((0.0..=1.0).contains(&c.health), "health {}", c.health);
            prop_assert!(c.wealth >= 0.0);
            prop_assert!(c.education <= 3);
        }
        for family in galaxy.people.families.values() {
            prop_assert!((0.01..=1.0).contains(&family.reputation));
        }
    }

    #[test]
    fn test_resources_and_planet_levels_never_negative(seed in any::<u64>(), years in 1u32..25) {
        let galaxy = simulated(seed, years);
        for planet in &galaxy.planets {
            prop_assert!(planet.pollution >= 0.0);
            prop_assert!((0.0..=1.0).contains(&planet.conflict_level));
            prop_assert!(planet.tech.average() <= 1.0);
            for city in &planet.cities {
                prop_assert!(city.resources.food >= 0.0);
                prop_assert!(city.resources.energy >= 0.0);
                prop_assert!(city.resources.tax >= 0.0);
            }
        }
    }

    #[test]
    fn test_war_is_always_mutual(seed in any::<u64>(), years in 1u32..40) {
        let galaxy = simulated(seed, years);
        for planet in &galaxy.planets {
            prop_assert!(planet.alive);
            for enemy in &planet.war_with {
                prop_assert!(planet.war_duration.contains_key(enemy));
                let other = galaxy.planet(enemy).expect("enemy pruned but war kept");
                prop_assert!(other.war_with.contains(&planet.name));
                prop_assert_eq!(other.war_duration.get(&planet.name), planet.war_duration.get(enemy));
            }
            prop_assert_eq!(planet.war_with.len(), planet.war_duration.len());
        }
    }

    #[test]
    fn test_city_rolls_hold_only_the_living(seed in any::<u64>(), years in 1u32..15) {
        let galaxy = simulated(seed, years);
        for city in galaxy.planets.iter().flat_map(|p| p.cities.iter()) {
            for id in &city.citizens {
                prop_assert!(galaxy.people.is_alive(*id));
            }
        }
        let living: usize = galaxy.planets.iter().map(|p| p.population()).sum();
        prop_assert_eq!(living, galaxy.people.len());
    }
}
