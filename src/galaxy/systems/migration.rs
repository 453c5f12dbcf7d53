//! Migration between cities
//!
//! Lifecycle and settlement rules only record who wants to leave. The moves
//! are applied here once the city scans are over, spouse included.

use ordered_float::OrderedFloat;

use crate::core::types::CitizenId;
use crate::galaxy::city::City;
use crate::galaxy::planet::Planet;
use crate::galaxy::population::Population;
use crate::galaxy::world::Galaxy;

/// A citizen who decided to leave a city this year
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Migration {
    pub citizen: CitizenId,
    /// (planet index, city index) of the city being left
    pub from: (usize, usize),
}

/// How attractive a city looks to a migrant
pub fn attractiveness(city: &City, people: &Population) -> f32 {
    let population = city.population();
    let avg_happiness = if population == 0 {
        0.5
    } else {
        people.residents(city).map(|c| c.happiness).sum::<f32>() / population as f32
    };
    avg_happiness + 0.5 * (city.resources.food / 100.0).min(2.0) + 0.25 * (population as f32 / 100.0).min(1.0)
}

/// Best destination other than `from`, across every living planet
pub fn preferred_destination(planets: &[Planet], people: &Population, from: (usize, usize)) -> Option<(usize, usize)> {
    planets
        .iter()
        .enumerate()
        .filter(|(_, p)| p.alive)
        .flat_map(|(pi, p)| p.cities.iter().enumerate().map(move |(ci, c)| ((pi, ci), c)))
        .filter(|(loc, _)| *loc != from)
        .max_by_key(|(_, city)| OrderedFloat(attractiveness(city, people)))
        .map(|(loc, _)| loc)
}

/// Two distinct cities, mutably
pub fn two_cities_mut(
    planets: &mut [Planet],
    a: (usize, usize),
    b: (usize, usize),
) -> Option<(&mut City, &mut City)> {
    if a == b || a.0 >= planets.len() || b.0 >= planets.len() {
        return None;
    }
    if a.0 == b.0 {
        let cities = &mut planets[a.0].cities;
        if a.1 >= cities.len() || b.1 >= cities.len() {
            return None;
        }
        if a.1 < b.1 {
            let (left, right) = cities.split_at_mut(b.1);
            Some((&mut left[a.1], &mut right[0]))
        } else {
            let (left, right) = cities.split_at_mut(a.1);
            Some((&mut right[0], &mut left[b.1]))
        }
    } else {
        let (pa, pb) = if a.0 < b.0 {
            let (left, right) = planets.split_at_mut(b.0);
            (&mut left[a.0], &mut right[0])
        } else {
            let (left, right) = planets.split_at_mut(a.0);
            (&mut right[0], &mut left[b.0])
        };
        let ca = pa.cities.get_mut(a.1)?;
        let cb = pb.cities.get_mut(b.1)?;
        Some((ca, cb))
    }
}

/// Move one citizen, and a spouse living in the same city, from `from` to `to`.
/// Returns how many people moved.
pub fn relocate_household(
    planets: &mut [Planet],
    people: &mut Population,
    citizen: CitizenId,
    from: (usize, usize),
    to: (usize, usize),
) -> usize {
    let partner = people.living_partner(citizen);
    let Some((source, dest)) = two_cities_mut(planets, from, to) else {
        return 0;
    };
    if !people.relocate(source, dest, citizen) {
        return 0;
    }
    let mut moved = 1;
    if let Some(partner) = partner {
        if people.relocate(source, dest, partner) {
            moved += 1;
        }
    }
    moved
}

/// Apply the year's migration decisions
pub fn apply_migrations(galaxy: &mut Galaxy, migrations: Vec<Migration>) -> usize {
    let Galaxy {
        planets,
        people,
        log,
        year,
        ..
    } = galaxy;

    let mut total = 0;
    for migration in migrations {
        let Some(from_city) = planets.get(migration.from.0).and_then(|p| p.cities.get(migration.from.1)) else {
            continue;
        };
        if !from_city.has_resident(migration.citizen) {
            continue;
        }
        let Some(to) = preferred_destination(planets, people, migration.from) else {
            continue;
        };

        let moved = relocate_household(planets, people, migration.citizen, migration.from, to);
        if moved > 0 {
            let name = people.get(migration.citizen).map(|c| c.name.clone()).unwrap_or_default();
            let from_name = &planets[migration.from.0].cities[migration.from.1].name;
            let to_name = &planets[to.0].cities[to.1].name;
            let household = if moved > 1 { " with their spouse" } else { "" };
            log.record(*year, format!("{} moved from {} to {}{}", name, from_name, to_name, household));
            total += moved;
        }
    }

    if total > 0 {
        tracing::debug!(migrants = total, "Migrations applied");
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GovernmentType, Specialization};
    use crate::galaxy::citizen::Citizen;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn galaxy() -> Galaxy {
        let mut galaxy = Galaxy::new(3);
        let mut earth = Planet::new("Earth", false);
        earth.cities.push(City::new("Taipei", GovernmentType::Democratic, Specialization::Agriculture));
        earth.cities.push(City::new("Tokyo", GovernmentType::Democratic, Specialization::Industry));
        let mut cybera = Planet::new("Cybera", true);
        cybera.cities.push(City::new("Ainos", GovernmentType::Republican, Specialization::Technology));
        galaxy.add_planet(earth);
        galaxy.add_planet(cybera);
        galaxy
    }

    fn spawn(galaxy: &mut Galaxy, pi: usize, ci: usize) -> CitizenId {
        let mut rng = ChaCha8Rng::seed_from_u64(galaxy.people.len() as u64);
        let id = galaxy.people.next_id();
        let city = galaxy.planets[pi].cities[ci].name.clone();
        let citizen = Citizen::generate(id, format!("C{}", id.0), &city, &mut rng);
        galaxy.spawn_citizen(pi, ci, citizen)
    }

    #[test]
    fn test_two_cities_mut_across_and_within_planets() {
        let mut g = galaxy();
        let (a, b) = two_cities_mut(&mut g.planets, (0, 1), (0, 0)).unwrap();
        assert_eq!((a.name.as_str(), b.name.as_str()), ("Tokyo", "Taipei"));
        let (a, b) = two_cities_mut(&mut g.planets, (1, 0), (0, 1)).unwrap();
        assert_eq!((a.name.as_str(), b.name.as_str()), ("Ainos", "Tokyo"));
        assert!(two_cities_mut(&mut g.planets, (0, 0), (0, 0)).is_none());
    }

    #[test]
    fn test_richest_city_is_preferred() {
        let mut g = galaxy();
        g.planets[1].cities[0].resources.food = 400.0;
        g.planets[0].cities[1].resources.food = 0.0;
        assert_eq!(preferred_destination(&g.planets, &g.people, (0, 0)), Some((1, 0)));
    }

    #[test]
    fn test_household_moves_together() {
        let mut g = galaxy();
        let a = spawn(&mut g, 0, 0);
        let b = spawn(&mut g, 0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        g.people.marry(a, b, &mut rng).unwrap();

        let moved = apply_migrations(&mut g, vec![Migration { citizen: a, from: (0, 0) }]);
        assert_eq!(moved, 2);
        assert!(g.planets[0].cities[0].is_empty());
        let dest = g.people.get(a).unwrap().city.clone();
        assert_eq!(g.people.get(b).unwrap().city, dest);
        assert_eq!(g.log.message_count(), 1);
    }

    #[test]
    fn test_stale_migration_is_skipped() {
        let mut g = galaxy();
        let a = spawn(&mut g, 0, 0);
        assert_eq!(apply_migrations(&mut g, vec![Migration { citizen: a, from: (0, 1) }]), 0);
        assert!(g.planets[0].cities[0].has_resident(a));
    }
}
