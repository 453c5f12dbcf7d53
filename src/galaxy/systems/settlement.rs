//! Settlement engine - city resources, unrest, elections and government

use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::config::SimConfig;
use crate::core::types::{DeathCause, GovernmentType, Ideology};
use crate::galaxy::citizen::Citizen;
use crate::galaxy::city::City;
use crate::galaxy::population::Population;
use crate::galaxy::systems::migration::Migration;
use crate::galaxy::tech::EffectKey;
use crate::galaxy::world::Galaxy;

/// Average trust, average happiness and the dominant ideology's share
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mood {
    pub trust: f32,
    pub happiness: f32,
    pub dominant_share: f32,
}

impl Mood {
    pub fn of(city: &City, people: &Population) -> Self {
        let residents: Vec<&Citizen> = people.residents(city).collect();
        if residents.is_empty() {
            return Self {
                trust: 0.5,
                happiness: 0.5,
                dominant_share: 0.0,
            };
        }
        let n = residents.len() as f32;
        let dominant = Ideology::ALL
            .iter()
            .map(|i| residents.iter().filter(|c| c.ideology == *i).count())
            .max()
            .unwrap_or(0);
        Self {
            trust: residents.iter().map(|c| c.trust).sum::<f32>() / n,
            happiness: residents.iter().map(|c| c.happiness).sum::<f32>() / n,
            dominant_share: dominant as f32 / n,
        }
    }

    fn below(&self, threshold: f32) -> bool {
        self.trust < threshold && self.happiness < threshold
    }
}

/// One year of a city's economy and politics. Returns citizens fleeing unrest.
pub fn update_city(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) -> Vec<Migration> {
    balance_resources(galaxy, planet, city, config);
    check_shortage(galaxy, planet, city, config);
    check_boom(galaxy, planet, city, config);
    let fleeing = update_unrest(galaxy, planet, city, config);
    update_election(galaxy, planet, city, config);
    drift_government(galaxy, planet, city, config);
    fleeing
}

fn balance_resources(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let rates = &config.city;
    let p = &mut galaxy.planets[planet];
    let production_bonus = p.bonus(EffectKey::Production);
    let reduction = p.bonus(EffectKey::ConsumptionReduction);
    let infinite = p.unlocked(EffectKey::InfiniteResources);
    let home = &mut p.cities[city];

    if infinite {
        home.resources.food = rates.infinite_resource_level;
        home.resources.energy = rates.infinite_resource_level;
        return;
    }

    let n = home.population() as f32;
    let consumption = home.government.consumption_multiplier() * (1.0 - reduction).max(0.0);
    let (food_rate, energy_rate) = home.specialization.production();
    let scale = rates.production_multiplier * (1.0 + production_bonus);

    home.resources.add_food(n * (food_rate * scale - rates.food_consumption * consumption));
    home.resources.add_energy(n * (energy_rate * scale - rates.energy_consumption * consumption));
}

fn check_shortage(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let rates = &config.city;
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let home = &mut planets[planet].cities[city];

    if home.resources.food >= rates.shortage_threshold && home.resources.energy >= rates.shortage_threshold {
        home.shortage_years = 0;
        return;
    }
    home.shortage_years += 1;
    if home.shortage_years < rates.famine_threshold_years {
        return;
    }

    let mut dead = 0;
    for id in home.citizens.clone() {
        let Some(citizen) = people.get_mut(id) else {
            continue;
        };
        citizen.adjust_health(-0.1);
        citizen.adjust_happiness(-0.1);
        if citizen.health <= 0.0 || rng.gen::<f32>() < rates.famine_death_chance {
            if people.bury(home, id, DeathCause::Famine) {
                dead += 1;
            }
        }
    }
    home.resources.take_food(10.0);
    home.resources.take_energy(10.0);

    log.record(
        *year,
        format!("Famine strikes {} after {} lean years: {} perished", home.name, home.shortage_years, dead),
    );
    tracing::debug!(city = %home.name, dead, "Famine");
}

fn check_boom(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let rates = &config.city;
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let p = &mut planets[planet];
    let production_tech = p.tech.production;
    let home = &mut p.cities[city];

    let surplus = home.resources.food > rates.boom_threshold && home.resources.energy > rates.boom_threshold;
    if !surplus || production_tech < rates.boom_tech_threshold || rng.gen::<f32>() >= rates.resource_boom_chance {
        return;
    }

    for id in &home.citizens {
        if let Some(citizen) = people.get_mut(*id) {
            citizen.adjust_wealth(rng.gen_range(10.0..30.0));
            citizen.adjust_happiness(0.05);
        }
    }
    log.record(*year, format!("An economic boom lifts {}", home.name));
}

fn update_unrest(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) -> Vec<Migration> {
    let rates = &config.city;
    let mut fleeing = Vec::new();
    let mut revolt_now = false;
    {
        let Galaxy {
            planets,
            people,
            rng,
            log,
            year,
            ..
        } = &mut *galaxy;
        let home = &mut planets[planet].cities[city];
        let mood = Mood::of(home, people);

        if !home.mass_movement_active {
            if mood.below(rates.unrest_threshold)
                && mood.dominant_share > rates.dominant_ideology_share
                && rng.gen::<f32>() < rates.mass_movement_chance
            {
                home.mass_movement_active = true;
                log.record(*year, format!("A mass movement rises in {}", home.name));
                tracing::info!(city = %home.name, "Mass movement");
            }
            return fleeing;
        }

        if !mood.below(rates.unrest_threshold) {
            home.mass_movement_active = false;
            log.record(*year, format!("The mass movement in {} subsides peacefully", home.name));
            return fleeing;
        }

        let food = home.resources.food;
        let energy = home.resources.energy;
        home.resources.take_food(food * 0.05);
        home.resources.take_energy(energy * 0.05);

        let mut dead = 0;
        for id in home.citizens.clone() {
            let Some(citizen) = people.get_mut(id) else {
                continue;
            };
            citizen.adjust_trust(-0.02);
            citizen.adjust_happiness(-0.02);
            if rng.gen::<f32>() < rates.movement_death_chance {
                if people.bury(home, id, DeathCause::Unrest) {
                    dead += 1;
                }
            } else if rng.gen::<f32>() < rates.movement_flight_chance {
                fleeing.push(Migration {
                    citizen: id,
                    from: (planet, city),
                });
            }
        }
        if dead > 0 {
            log.record(*year, format!("{} died in the unrest in {}", dead, home.name));
        }

        if mood.below(rates.critical_unrest_threshold) && rng.gen::<f32>() < rates.revolution_chance {
            revolt_now = true;
        }
    }

    if revolt_now {
        revolution(galaxy, planet, city);
    }
    fleeing
}

/// Overthrow a city's government: casualties, a new regime, the movement ends
pub fn revolution(galaxy: &mut Galaxy, planet: usize, city: usize) -> String {
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let home = &mut planets[planet].cities[city];

    let mut dead = 0;
    for id in home.citizens.clone() {
        if rng.gen::<f32>() < 0.1 && people.bury(home, id, DeathCause::Rebellion) {
            dead += 1;
        }
    }

    let old = home.government;
    let choices: Vec<GovernmentType> = GovernmentType::ALL.into_iter().filter(|g| *g != old).collect();
    home.government = choices[rng.gen_range(0..choices.len())];
    home.mass_movement_active = false;

    for id in &home.citizens {
        if let Some(citizen) = people.get_mut(*id) {
            citizen.adjust_trust(0.1);
            citizen.adjust_happiness(0.05);
        }
    }

    let message = format!(
        "Revolution in {}! {:?} rule replaced by {:?}; {} died",
        home.name, old, home.government, dead
    );
    log.record(*year, message.clone());
    tracing::info!(city = %home.name, dead, "Revolution");
    message
}

fn update_election(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let rates = &config.city;
    let home = &mut galaxy.planets[planet].cities[city];
    home.election_timer = home.election_timer.saturating_sub(1);
    if home.election_timer > 0 {
        return;
    }
    home.election_timer = galaxy
        .rng
        .gen_range(rates.election_interval_min..=rates.election_interval_max);
    hold_election(galaxy, planet, city, config);
}

/// Tally support among enfranchised residents and seat the winner
pub fn hold_election(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let Galaxy {
        planets,
        people,
        log,
        year,
        ..
    } = galaxy;
    let home = &mut planets[planet].cities[city];
    if home.parties.is_empty() {
        return;
    }

    let roll = home.citizens.clone();
    let voters: Vec<&Citizen> = roll
        .iter()
        .filter_map(|id| people.get(*id))
        .filter(|c| c.alive && c.age >= config.citizen.voting_age)
        .collect();
    if voters.is_empty() {
        log.record(
            *year,
            format!("Election in {} could not be held: no eligible voters", home.name),
        );
        return;
    }

    for party in &mut home.parties {
        party.calculate_support(&voters);
    }
    let Some(winner) = home
        .parties
        .iter()
        .rev()
        .max_by_key(|p| OrderedFloat(p.support))
        .map(|p| p.name.clone())
    else {
        return;
    };

    if home.ruling_party.as_deref() == Some(winner.as_str()) {
        log.record(*year, format!("{} holds on to power in {}", winner, home.name));
    } else {
        log.record(*year, format!("{} wins the election in {}", winner, home.name));
        home.ruling_party = Some(winner);
    }
}

fn drift_government(galaxy: &mut Galaxy, planet: usize, city: usize, config: &SimConfig) {
    let Galaxy {
        planets,
        people,
        rng,
        log,
        year,
        ..
    } = galaxy;
    let home = &mut planets[planet].cities[city];
    if rng.gen::<f32>() >= config.city.gov_change_chance {
        return;
    }

    let trust = Mood::of(home, people).trust;
    let next = match home.government {
        GovernmentType::Democratic if trust < 0.3 => GovernmentType::Authoritarian,
        GovernmentType::Authoritarian if trust > 0.7 => GovernmentType::Republican,
        GovernmentType::Republican if trust < 0.3 => {
            if rng.gen_bool(0.5) {
                GovernmentType::Authoritarian
            } else {
                GovernmentType::Democratic
            }
        }
        _ => return,
    };
    log.record(
        *year,
        format!("{} transitions from {:?} to {:?} government", home.name, home.government, next),
    );
    home.government = next;
}

#[derive(Clone, Copy)]
enum Good {
    Food,
    Energy,
}

impl Good {
    fn stock(self, city: &City) -> f32 {
        match self {
            Good::Food => city.resources.food,
            Good::Energy => city.resources.energy,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Good::Food => "food",
            Good::Energy => "energy",
        }
    }
}

/// Cities with a surplus ship part of it to the neediest city on their planet
pub fn trade_between_cities(galaxy: &mut Galaxy, planet: usize, config: &SimConfig) {
    let rates = &config.city;
    let Galaxy { planets, log, year, .. } = galaxy;
    let cities = &mut planets[planet].cities;

    for good in [Good::Food, Good::Energy] {
        for donor in 0..cities.len() {
            let surplus = good.stock(&cities[donor]) - rates.trade_surplus_threshold;
            if surplus <= 0.0 {
                continue;
            }
            let Some(needy) = (0..cities.len())
                .filter(|ci| *ci != donor && good.stock(&cities[*ci]) < rates.shortage_threshold)
                .min_by_key(|ci| OrderedFloat(good.stock(&cities[*ci])))
            else {
                continue;
            };

            let amount = surplus * rates.trade_fraction;
            match good {
                Good::Food => {
                    let shipped = cities[donor].resources.take_food(amount);
                    cities[needy].resources.add_food(shipped);
                }
                Good::Energy => {
                    let shipped = cities[donor].resources.take_energy(amount);
                    cities[needy].resources.add_energy(shipped);
                }
            }
            log.record(
                *year,
                format!(
                    "{} ships {:.0} {} to {}",
                    cities[donor].name,
                    amount,
                    good.label(),
                    cities[needy].name
                ),
            );
        }
    }
}
