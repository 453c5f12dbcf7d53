//! Galaxy-wide events: federation politics, new planets and citizen stories

use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::SimConfig;
use crate::core::types::CitizenId;
use crate::galaxy::generation::generate_new_planet;
use crate::galaxy::world::{ActivePolicy, FederationPolicy, Galaxy};

const STORIES: [&str; 6] = [
    "{} opened a small tea house that everyone in {} talks about",
    "{} of {} wrote a song that spread across the stars",
    "{} rescued a stranded freighter crew near {}",
    "{} started a community garden in {}",
    "{} discovered an old archive beneath {}",
    "{} won the annual debate tournament in {}",
];

/// Living citizens in planet, city, roll order
fn living_citizens(galaxy: &Galaxy) -> Vec<CitizenId> {
    galaxy
        .planets
        .iter()
        .filter(|p| p.alive)
        .flat_map(|p| p.cities.iter())
        .flat_map(|c| c.citizens.iter().copied())
        .filter(|id| galaxy.people.is_alive(*id))
        .collect()
}

/// Run once at the start of every tick, before any planet is processed
pub fn galaxy_events(galaxy: &mut Galaxy, config: &SimConfig) {
    update_federation(galaxy, config);
    maybe_spawn_planet(galaxy, config);
    maybe_tell_story(galaxy, config);
}

fn update_federation(galaxy: &mut Galaxy, config: &SimConfig) {
    if let Some(leader) = galaxy.federation.leader {
        if !galaxy.people.is_alive(leader) {
            galaxy.federation.leader = None;
            galaxy.record("The federation leader has died; the office stands empty");
        }
    }

    if let Some(active) = galaxy.federation.policy.as_mut() {
        active.years_left = active.years_left.saturating_sub(1);
        if active.years_left == 0 {
            let name = active.policy.name();
            galaxy.federation.policy = None;
            galaxy.record(format!("The {} lapses", name));
        }
        return;
    }

    if galaxy.rng.gen::<f32>() < config.federation.election_chance {
        elect_leader(galaxy, config);
    }
}

/// Elect the most respected living citizen and enact their policy
pub fn elect_leader(galaxy: &mut Galaxy, config: &SimConfig) -> Option<CitizenId> {
    let candidates = living_citizens(galaxy);
    let leader = candidates
        .iter()
        .filter_map(|id| galaxy.people.get(*id))
        .rev()
        .max_by_key(|c| OrderedFloat((c.trust + c.happiness) * (1.0 + c.education as f32 / 3.0)))?;

    let policy = FederationPolicy::for_ideology(leader.ideology);
    let message = format!(
        "{} of {} is elected federation leader and enacts the {}",
        leader.name,
        leader.city,
        policy.name()
    );
    let id = leader.id;

    galaxy.federation.leader = Some(id);
    galaxy.federation.policy = Some(ActivePolicy {
        policy,
        years_left: config.federation.policy_duration,
    });
    tracing::info!(policy = policy.name(), "Federation election");
    galaxy.record(message);
    Some(id)
}

fn maybe_spawn_planet(galaxy: &mut Galaxy, config: &SimConfig) {
    if galaxy.planets.len() >= config.federation.max_planets {
        return;
    }
    if galaxy.rng.gen::<f32>() >= config.federation.new_planet_chance {
        return;
    }
    if let Some(name) = generate_new_planet(galaxy, config) {
        tracing::info!(planet = %name, "New planet");
        galaxy.record(format!("A new civilization appears on {}", name));
    }
}

fn maybe_tell_story(galaxy: &mut Galaxy, config: &SimConfig) {
    if galaxy.rng.gen::<f32>() >= config.federation.story_chance {
        return;
    }
    let living = living_citizens(galaxy);
    let Some(id) = living.choose(&mut galaxy.rng).copied() else {
        return;
    };
    let template = STORIES[galaxy.rng.gen_range(0..STORIES.len())];
    let Some(citizen) = galaxy.people.get(id) else {
        return;
    };
    let story = template.replacen("{}", &citizen.name, 1).replacen("{}", &citizen.city, 1);
    galaxy.record(story);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::generation::WorldConfig;

    fn quiet() -> SimConfig {
        let mut config = SimConfig::default();
        config.federation.election_chance = 0.0;
        config.federation.new_planet_chance = 0.0;
        config.federation.story_chance = 0.0;
        config
    }

    #[test]
    fn test_election_installs_leader_and_policy() {
        let config = quiet();
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        let leader = elect_leader(&mut galaxy, &config).unwrap();
        assert_eq!(galaxy.federation.leader, Some(leader));
        let ideology = galaxy.people.get(leader).unwrap().ideology;
        let active = galaxy.federation.policy.unwrap();
        assert_eq!(active.policy, FederationPolicy::for_ideology(ideology));
        assert_eq!(active.years_left, config.federation.policy_duration);
    }

    #[test]
    fn test_policy_lapses_after_duration() {
        let config = quiet();
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        elect_leader(&mut galaxy, &config);
        for _ in 0..config.federation.policy_duration {
            galaxy_events(&mut galaxy, &config);
        }
        assert!(galaxy.federation.policy.is_none());
    }

    #[test]
    fn test_planet_birth_respects_limit() {
        let mut config = quiet();
        config.federation.new_planet_chance = 1.0;
        config.federation.max_planets = 3;
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        for _ in 0..5 {
            galaxy_events(&mut galaxy, &config);
        }
        assert_eq!(galaxy.planets.len(), 3);
    }

    #[test]
    fn test_story_names_a_real_citizen() {
        let mut config = quiet();
        config.federation.story_chance = 1.0;
        let mut galaxy = Galaxy::generate(&WorldConfig::default(), &config);
        galaxy_events(&mut galaxy, &config);
        let story = galaxy.log.latest().unwrap().messages.last().unwrap().clone();
        assert!(!story.contains("{}"));
        assert!(galaxy.people.iter().any(|c| story.starts_with(&c.name)));
    }
}
