//! Interstellar engine - relations, treaties, war and opportunistic attacks
//!
//! Relations per planet pair move Neutral <-> Friendly <-> Hostile, and a
//! hostile pair with high conflict goes to war. Every unordered pair is
//! resolved once per year, in planet order.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::SimConfig;
use crate::core::types::{CitizenId, DeathCause, RelationState, TechCategory};
use crate::galaxy::planet::Planet;
use crate::galaxy::population::Population;
use crate::galaxy::systems::migration::relocate_household;
use crate::galaxy::tech::EffectKey;
use crate::galaxy::treaty::{TreatyTerms, TreatyType};
use crate::galaxy::world::{FederationPolicy, Galaxy};

/// Resolve every planet pair, then treaty effects, then random attacks
pub fn update_relations(galaxy: &mut Galaxy, config: &SimConfig) {
    let n = galaxy.planets.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if !galaxy.planets[i].alive || !galaxy.planets[j].alive {
                continue;
            }
            let other = galaxy.planets[j].name.clone();
            if galaxy.planets[i].is_at_war_with(&other) {
                wage_war(galaxy, i, j, config);
            } else {
                resolve_diplomacy(galaxy, i, j, config);
            }
        }
    }

    apply_treaty_effects(galaxy);
    random_attacks(galaxy, config);
}

/// Mutable access to two distinct planets
pub fn two_planets_mut(planets: &mut [Planet], a: usize, b: usize) -> Option<(&mut Planet, &mut Planet)> {
    if a == b || a >= planets.len() || b >= planets.len() {
        return None;
    }
    if a < b {
        let (left, right) = planets.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = planets.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

fn set_mutual_relation(a: &mut Planet, b: &mut Planet, state: RelationState) {
    a.set_relation(&b.name, state);
    b.set_relation(&a.name, state);
}

fn treaty_terms(kind: TreatyType, config: &SimConfig) -> TreatyTerms {
    let rates = &config.interstellar;
    match kind {
        TreatyType::NonAggression => TreatyTerms {
            conflict_multiplier: rates.non_aggression_multiplier,
            ..TreatyTerms::default()
        },
        TreatyType::Trade => TreatyTerms {
            resource_bonus: rates.trade_treaty_bonus,
            ..TreatyTerms::default()
        },
        TreatyType::TechShare => TreatyTerms {
            tech_share: rates.tech_share_fraction,
            ..TreatyTerms::default()
        },
    }
}

/// Declare war between two planets: both flags, both duration counters, and
/// every treaty between them is torn up
pub fn declare_war(galaxy: &mut Galaxy, i: usize, j: usize) {
    let Some((a, b)) = two_planets_mut(&mut galaxy.planets, i, j) else {
        return;
    };
    a.start_war(&b.name);
    b.start_war(&a.name);
    set_mutual_relation(a, b, RelationState::Hostile);
    let (name_a, name_b) = (a.name.clone(), b.name.clone());
    tracing::info!(aggressor = %name_a, defender = %name_b, "War declared");
    galaxy.wars_declared += 1;
    galaxy.record(format!("{} and {} go to war", name_a, name_b));

    for treaty in galaxy.break_treaties(&name_a, &name_b) {
        galaxy.record(format!("The {} between {} and {} is torn up", treaty.kind.label(), name_a, name_b));
    }
}

fn resolve_diplomacy(galaxy: &mut Galaxy, i: usize, j: usize, config: &SimConfig) {
    let rates = &config.interstellar;
    let (name_i, name_j) = (galaxy.planets[i].name.clone(), galaxy.planets[j].name.clone());
    let non_aggression = galaxy.has_treaty(TreatyType::NonAggression, &name_i, &name_j);
    let any_treaty = galaxy.treaties_between(&name_i, &name_j).next().is_some();
    let treaty_multiplier: f32 = galaxy
        .treaties_between(&name_i, &name_j)
        .map(|t| t.terms.conflict_multiplier)
        .product();
    let peace_accord = galaxy.federation.is_active(FederationPolicy::PeaceAccord);

    let (relation, mutual_hostile, mean_conflict, either_alien, avg_military) = {
        let a = &galaxy.planets[i];
        let b = &galaxy.planets[j];
        let relation = a.relation_with(&name_j);
        (
            relation,
            relation == RelationState::Hostile && b.relation_with(&name_i) == RelationState::Hostile,
            (a.conflict_level + b.conflict_level) / 2.0,
            a.alien || b.alien,
            (a.tech.military + b.tech.military) / 2.0,
        )
    };

    if mutual_hostile && mean_conflict >= rates.war_declaration_threshold && !non_aggression {
        declare_war(galaxy, i, j);
        return;
    }

    let mut chance = rates.conflict_rate * (1.0 + avg_military * 0.5);
    if either_alien {
        chance *= rates.alien_conflict_multiplier;
    }
    chance *= match relation {
        RelationState::Hostile => rates.hostile_conflict_multiplier,
        RelationState::Friendly => rates.friendly_conflict_multiplier,
        RelationState::Neutral => 1.0,
    };
    chance *= treaty_multiplier;
    if peace_accord {
        chance *= 0.5;
    }

    let Galaxy {
        planets, rng, log, year, ..
    } = &mut *galaxy;
    let Some((a, b)) = two_planets_mut(planets, i, j) else {
        return;
    };

    if rng.gen::<f32>() < chance {
        a.raise_conflict(rng.gen_range(rates.conflict_increment_min..=rates.conflict_increment_max));
        b.raise_conflict(rng.gen_range(rates.conflict_increment_min..=rates.conflict_increment_max));
        let mean = (a.conflict_level + b.conflict_level) / 2.0;
        match relation {
            RelationState::Friendly if mean > rates.friendly_to_neutral_conflict => {
                set_mutual_relation(a, b, RelationState::Neutral);
                log.record(*year, format!("Friendship between {} and {} cools", a.name, b.name));
            }
            RelationState::Neutral if mean > rates.neutral_to_hostile_conflict => {
                set_mutual_relation(a, b, RelationState::Hostile);
                log.record(*year, format!("{} and {} turn hostile", a.name, b.name));
            }
            _ => log.record(*year, format!("Tensions rise between {} and {}", a.name, b.name)),
        }
        return;
    }

    a.raise_conflict(-rates.conflict_decay);
    b.raise_conflict(-rates.conflict_decay);
    let mean = (a.conflict_level + b.conflict_level) / 2.0;
    match relation {
        RelationState::Hostile if rng.gen::<f32>() < rates.soften_hostile_chance => {
            set_mutual_relation(a, b, RelationState::Neutral);
            log.record(*year, format!("Hostility between {} and {} eases", a.name, b.name));
        }
        RelationState::Neutral
            if mean < rates.friendly_to_neutral_conflict && rng.gen::<f32>() < rates.befriend_chance =>
        {
            set_mutual_relation(a, b, RelationState::Friendly);
            log.record(*year, format!("{} and {} become friends", a.name, b.name));
        }
        RelationState::Friendly if !any_treaty && rng.gen::<f32>() < rates.treaty_chance => {
            let kind = *TreatyType::ALL.choose(rng).unwrap_or(&TreatyType::Trade);
            let duration = rng.gen_range(rates.treaty_duration_min..=rates.treaty_duration_max);
            let message = format!("{} and {} sign a {} for {} years", a.name, b.name, kind.label(), duration);
            galaxy.sign_treaty(kind, &name_i, &name_j, duration, treaty_terms(kind, config));
            galaxy.record(message);
        }
        _ => {}
    }
}

/// Trade treaties ship resources to both signatories; tech-sharing closes gaps
fn apply_treaty_effects(galaxy: &mut Galaxy) {
    let Galaxy { planets, treaties, .. } = galaxy;
    for treaty in treaties.iter() {
        let (Some(i), Some(j)) = (
            planets.iter().position(|p| p.name == treaty.signatories[0]),
            planets.iter().position(|p| p.name == treaty.signatories[1]),
        ) else {
            continue;
        };
        let Some((a, b)) = two_planets_mut(planets, i, j) else {
            continue;
        };
        match treaty.kind {
            TreatyType::Trade => {
                for city in a.cities.iter_mut().chain(b.cities.iter_mut()) {
                    city.resources.add_food(treaty.terms.resource_bonus);
                    city.resources.add_energy(treaty.terms.resource_bonus);
                }
            }
            TreatyType::TechShare => {
                for category in TechCategory::ALL {
                    let (ta, tb) = (a.tech.get(category), b.tech.get(category));
                    let gap = (ta - tb).abs() * treaty.terms.tech_share;
                    if ta < tb {
                        a.tech.add(category, gap);
                    } else {
                        b.tech.add(category, gap);
                    }
                }
            }
            TreatyType::NonAggression => {}
        }
    }
}

fn kill_fraction<R: Rng + ?Sized>(planet: &mut Planet, people: &mut Population, rng: &mut R, chance: f32, cause: DeathCause) -> u32 {
    let mut dead = 0;
    for home in &mut planet.cities {
        for id in home.citizens.clone() {
            if rng.gen::<f32>() < chance && people.bury(home, id, cause) {
                dead += 1;
            }
        }
    }
    dead
}

fn strength(planet: &Planet) -> f32 {
    planet.population() as f32 * (1.0 + planet.tech.military + planet.bonus(EffectKey::WarStrength))
}

/// One year of an ongoing war between planets `i` and `j`
fn wage_war(galaxy: &mut Galaxy, i: usize, j: usize, config: &SimConfig) {
    let rates = &config.interstellar;
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = &mut *galaxy;
    let Some((a, b)) = two_planets_mut(planets, i, j) else {
        return;
    };

    let mut dead = 0;
    for side in [&mut *a, &mut *b] {
        dead += kill_fraction(side, people, rng, rates.war_death_rate, DeathCause::War);
        for city in &mut side.cities {
            city.resources.take_food(rng.gen_range(rates.war_resource_drain_min..=rates.war_resource_drain_max));
            city.resources.take_energy(rng.gen_range(rates.war_resource_drain_min..=rates.war_resource_drain_max));
        }
    }

    let duration = {
        let d = a.war_duration.entry(b.name.clone()).or_insert(0);
        *d += 1;
        *d
    };
    b.war_duration.insert(a.name.clone(), duration);
    if dead > 0 {
        log.record(*year, format!("War between {} and {} kills {}", a.name, b.name, dead));
    }

    let (pop_a, pop_b) = (a.population() as f32, b.population() as f32);
    let larger = pop_a.max(pop_b);
    let ratio = if larger > 0.0 { pop_a.min(pop_b) / larger } else { 1.0 };
    let lopsided = ratio < rates.war_population_ratio;

    let peace = (duration > rates.war_peace_min_duration && rng.gen::<f32>() < rates.war_peace_chance_by_duration)
        || (lopsided && rng.gen::<f32>() < rates.war_peace_chance_by_population);
    if !peace {
        return;
    }

    let a_wins = strength(a) >= strength(b);
    a.end_war(&b.name);
    b.end_war(&a.name);
    set_mutual_relation(a, b, RelationState::Neutral);
    a.conflict_level *= 0.5;
    b.conflict_level *= 0.5;

    let (winner, loser, winner_index, loser_index) = if a_wins { (a, b, i, j) } else { (b, a, j, i) };
    let message = format!(
        "Peace between {} and {} after {} years; {} prevails",
        winner.name, loser.name, duration, winner.name
    );
    log.record(*year, message);
    tracing::info!(winner = %winner.name, loser = %loser.name, duration, "War ended");

    if !lopsided {
        return;
    }

    // Spoils: the loser pays in resources, research and people
    let mut tribute = 0.0;
    for city in &mut loser.cities {
        let food = city.resources.food * 0.1;
        tribute += city.resources.take_food(food);
    }
    for category in TechCategory::ALL {
        let gap = loser.tech.get(category) - winner.tech.get(category);
        if gap > 0.0 {
            winner.tech.add(category, gap * 0.1);
        }
    }
    for id in loser.citizen_ids() {
        if let Some(citizen) = people.get_mut(id) {
            citizen.adjust_trust(-0.1);
            citizen.adjust_happiness(-0.1);
        }
    }
    let Some(target_city) = (0..winner.cities.len()).max_by_key(|ci| winner.cities[*ci].population()) else {
        return;
    };
    winner.cities[target_city].resources.add_food(tribute);

    let mut captives: Vec<(CitizenId, usize)> = Vec::new();
    for (ci, city) in loser.cities.iter().enumerate() {
        for id in &city.citizens {
            if rng.gen::<f32>() < rates.war_capture_fraction {
                captives.push((*id, ci));
            }
        }
    }
    let loser_name = loser.name.clone();
    let winner_name = winner.name.clone();
    let mut taken = 0;
    for (id, ci) in captives {
        taken += relocate_household(planets, people, id, (loser_index, ci), (winner_index, target_city));
    }
    if taken > 0 {
        log.record(*year, format!("{} carries off {} people from {}", winner_name, taken, loser_name));
    }
}

/// Each planet off cooldown may strike a random non-allied planet it is not at war with
fn random_attacks(galaxy: &mut Galaxy, config: &SimConfig) {
    let rates = &config.interstellar;
    for i in 0..galaxy.planets.len() {
        let attacker = &mut galaxy.planets[i];
        if !attacker.alive || attacker.is_depopulated() {
            continue;
        }
        if attacker.attack_cooldown > 0 {
            attacker.attack_cooldown -= 1;
            continue;
        }
        if galaxy.rng.gen::<f32>() >= rates.random_attack_chance {
            continue;
        }

        let attacker = &galaxy.planets[i];
        let targets: Vec<usize> = galaxy
            .planets
            .iter()
            .enumerate()
            .filter(|(j, p)| {
                *j != i
                    && p.alive
                    && !p.is_depopulated()
                    && !attacker.allies.contains(&p.name)
                    && !attacker.is_at_war_with(&p.name)
            })
            .map(|(j, _)| j)
            .collect();
        let Some(&target) = targets.choose(&mut galaxy.rng) else {
            continue;
        };

        launch_attack(galaxy, i, target, config, true);
    }
}

/// Strike `target` from `attacker`; the target may hit back once
pub fn launch_attack(galaxy: &mut Galaxy, attacker: usize, target: usize, config: &SimConfig, allow_counter: bool) {
    let rates = &config.interstellar;
    let mut counter = false;
    {
        let Galaxy {
            planets,
            people,
            rng,
            log,
            year,
            ..
        } = &mut *galaxy;
        let Some((a, t)) = two_planets_mut(planets, attacker, target) else {
            return;
        };

        let reduction = a.bonus(EffectKey::AttackCooldownReduction) as u32;
        a.attack_cooldown = rates.attack_cooldown.saturating_sub(reduction).max(1);
        set_mutual_relation(a, t, RelationState::Hostile);
        t.raise_conflict(0.1);

        if t.shield_active {
            log.record(*year, format!("{}'s shield turns back an attack from {}", t.name, a.name));
            return;
        }

        let damage = a.tech.military + a.bonus(EffectKey::AttackDamage)
            - t.defense_level / 100.0
            - 0.1 * t.allies.len() as f32;
        if damage <= 0.0 {
            log.record(*year, format!("{} repels an attack from {}", t.name, a.name));
            return;
        }

        if a.unlocked(EffectKey::Annihilation) && rng.gen::<f32>() < rates.annihilation_chance {
            let dead = kill_fraction(t, people, rng, 1.0, DeathCause::Annihilation);
            log.record(*year, format!("{} unleashes a doomsday weapon on {}: {} dead", a.name, t.name, dead));
            tracing::info!(attacker = %a.name, target = %t.name, dead, "Annihilation");
            return;
        }

        let dead = kill_fraction(t, people, rng, (damage * 0.1).min(1.0), DeathCause::Attack);
        for city in &mut t.cities {
            city.resources.take_food(damage * 20.0);
            city.resources.take_energy(damage * 20.0);
        }
        log.record(*year, format!("{} attacks {}: {} dead", a.name, t.name, dead));

        if allow_counter && !t.is_depopulated() {
            counter = rng.gen::<f32>() < rates.random_attack_counter_chance * (0.5 + t.tech.military);
        }
    }

    if counter {
        launch_attack(galaxy, target, attacker, config, false);
    }
}
