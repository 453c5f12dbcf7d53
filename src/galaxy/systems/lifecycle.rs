//! Lifecycle engine - a year in the life of every citizen of a city

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::SimConfig;
use crate::core::types::{CitizenId, DeathCause, Profession};
use crate::galaxy::citizen::{Citizen, MAX_EDUCATION};
use crate::galaxy::generation::citizen_name;
use crate::galaxy::systems::migration::Migration;
use crate::galaxy::tech::EffectKey;
use crate::galaxy::world::{FederationPolicy, Galaxy};

/// Planet-wide modifiers read once before the city scan
struct Modifiers {
    pollution: f32,
    wealth_growth: f32,
    health_recovery: f32,
    happiness: f32,
    lifespan: f32,
    death_reduction: f32,
}

impl Modifiers {
    fn read(galaxy: &Galaxy, planet: usize) -> Self {
        let p = &galaxy.planets[planet];
        let welfare = if galaxy.federation.is_active(FederationPolicy::WelfareProgram) {
            0.1
        } else {
            0.0
        };
        let stability = if galaxy.federation.is_active(FederationPolicy::StabilityPact) {
            0.02
        } else {
            0.0
        };
        Self {
            pollution: p.pollution,
            wealth_growth: p.bonus(EffectKey::WealthGrowth) + welfare,
            health_recovery: p.bonus(EffectKey::HealthRecovery),
            happiness: p.bonus(EffectKey::Happiness) + stability,
            lifespan: p.bonus(EffectKey::Lifespan),
            death_reduction: p.bonus(EffectKey::NaturalDeathReduction).min(1.0),
        }
    }
}

/// Advance every living citizen of one city by a year. Returns the
/// citizens who decided to emigrate; the moves are applied by the caller.
pub fn update_citizens(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) -> Vec<Migration> {
    arrange_marriages(galaxy, planet, city, config);

    let mods = Modifiers::read(galaxy, planet);
    let rates = &config.citizen;
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let home = &mut planets[planet].cities[city];
    let tax_rate = home.government.tax_rate();

    let snapshot: Vec<CitizenId> = home.citizens.clone();
    let mut births: Vec<(CitizenId, CitizenId)> = Vec::new();
    let mut leaving = Vec::new();
    let mut deaths = 0u32;

    for id in snapshot {
        let Some(citizen) = people.get_mut(id) else {
            continue;
        };
        if !citizen.alive {
            continue;
        }

        // Aging and economy
        citizen.age += 1;
        let income = citizen.profession.income() * (1.0 + mods.wealth_growth);
        citizen.adjust_wealth(income - rates.living_cost);
        if mods.health_recovery > 0.0 {
            citizen.adjust_health(mods.health_recovery);
        }
        if mods.happiness > 0.0 {
            citizen.adjust_happiness(mods.happiness);
        }

        if citizen.profession.is_high_risk() && rng.gen::<f32>() < rates.crime_consequence_chance {
            citizen.adjust_wealth(-rng.gen_range(10.0..50.0));
            citizen.adjust_health(-0.1);
            citizen.adjust_trust(-0.1);
            citizen.adjust_happiness(-0.1);
            log.record(*year, format!("{} paid the price for their life of crime in {}", citizen.name, home.name));
        }

        home.resources.add_tax(citizen.wealth * tax_rate);

        // Education
        if citizen.education < MAX_EDUCATION && rng.gen::<f32>() < rates.education_chance {
            citizen.education += 1;
            let tier: &[Profession] = match citizen.education {
                3 => &Profession::TOP_TIER,
                2 => &Profession::MIDDLE_TIER,
                _ => &[],
            };
            if !tier.is_empty() && rng.gen::<f32>() < rates.profession_change_chance {
                if let Some(profession) = Profession::from_tier(tier, rng) {
                    citizen.profession = profession;
                }
            }
        }

        // Pollution sickness
        let mut cause = None;
        if mods.pollution > rates.pollution_health_threshold && rng.gen::<f32>() < rates.pollution_health_chance {
            citizen.adjust_health(-rng.gen_range(0.05..0.15));
            citizen.adjust_happiness(-0.05);
            if citizen.health <= 0.0 {
                cause = Some(DeathCause::Disease);
            }
        }

        // Old age, then accidents
        if cause.is_none() {
            let old_age = rates.old_age_start as f32 + mods.lifespan;
            if citizen.age as f32 > old_age {
                let years_over = citizen.age as f32 - old_age;
                let p = (rates.natural_death_base + rates.natural_death_per_year * years_over)
                    * (1.0 - mods.death_reduction);
                if rng.gen::<f32>() < p {
                    cause = Some(DeathCause::Natural);
                }
            }
        }
        if cause.is_none() && rng.gen::<f32>() < rates.accident_death_rate {
            cause = Some(DeathCause::Accident);
        }

        if let Some(cause) = cause {
            let (name, age) = (citizen.name.clone(), citizen.age);
            if people.bury(home, id, cause) {
                deaths += 1;
                log.record(*year, format!("{} died in {} at age {} ({})", name, home.name, age, cause));
            }
            continue;
        }

        // Reproduction: the couple rolls once, from the partner with the lower id
        let (age, happiness, wealth) = (citizen.age, citizen.happiness, citizen.wealth);
        if let Some(partner) = people.living_partner(id) {
            let fertile = |a: u32| (rates.reproduction_age_min..=rates.reproduction_age_max).contains(&a);
            let partner_age = people.get(partner).map_or(0, |p| p.age);
            if id < partner
                && fertile(age)
                && fertile(partner_age)
                && home.has_resident(partner)
                && rng.gen::<f32>() < rates.birth_rate * (0.5 + happiness)
            {
                births.push((id, partner));
            }
        }

        // Emigration
        let mut p = rates.immigration_base_chance;
        if wealth < 50.0 || happiness < 0.3 {
            p *= 1.5;
        } else if wealth > 300.0 && happiness > 0.7 {
            p *= 0.5;
        }
        if rng.gen::<f32>() < p {
            leaving.push(Migration {
                citizen: id,
                from: (planet, city),
            });
        }
    }

    for (parent, other) in births {
        let child_id = people.next_id();
        let child = {
            let (Some(a), Some(b)) = (people.get(parent), people.get(other)) else {
                continue;
            };
            let name = citizen_name(a.family.as_deref(), rng);
            Citizen::born(child_id, name, a, b, rng)
        };
        let name = child.name.clone();
        people.spawn(home, child);
        home.birth_count += 1;
        log.record(*year, format!("{} was born in {}", name, home.name));
    }

    if deaths > 0 || home.birth_count > 0 {
        tracing::trace!(city = %home.name, births = home.birth_count, deaths, "Lifecycle pass");
    }
    leaving
}

/// Pair off singles of marriageable age at random
fn arrange_marriages(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let rates = &config.citizen;
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let home = &planets[planet].cities[city];

    let mut singles: Vec<CitizenId> = people
        .residents(home)
        .filter(|c| {
            c.alive && c.is_single() && (rates.marriage_age_min..=rates.marriage_age_max).contains(&c.age)
        })
        .map(|c| c.id)
        .collect();
    if singles.len() < 2 {
        return;
    }
    singles.shuffle(rng);

    for pair in singles.chunks_exact(2) {
        if rng.gen::<f32>() >= rates.marriage_chance {
            continue;
        }
        if let Some(family) = people.marry(pair[0], pair[1], rng) {
            let name = |id| people.get(id).map(|c| c.name.clone()).unwrap_or_default();
            log.record(
                *year,
                format!("{} and {} married in {} (family {})", name(pair[0]), name(pair[1]), home.name, family),
            );
        }
    }
}
