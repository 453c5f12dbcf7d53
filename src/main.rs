//! CitySim - Entry Point
//!
//! Interactive operator console: advance the galaxy year by year, inspect
//! planets and cities, and force events by hand.

use citysim::core::config::SimConfig;
use citysim::core::error::Result;
use citysim::galaxy::generation::WorldConfig;
use citysim::galaxy::metrics::{citizen_metric, metric_by_name, CitizenMetric};
use citysim::galaxy::simulation::{simulate, simulate_year};
use citysim::galaxy::triggers::{trigger_coup, trigger_epidemic, trigger_revolution, trigger_tech_awakening};
use citysim::galaxy::world::Galaxy;

use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const WORLD_FILE: &str = "data/world.toml";
const RATES_FILE: &str = "data/rates.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("citysim=info")))
        .init();

    let world = load_or_default(WORLD_FILE, WorldConfig::load)?;
    let config = load_or_default(RATES_FILE, SimConfig::load)?;
    world.validate()?;
    config.validate()?;

    let mut galaxy = Galaxy::generate(&world, &config);
    tracing::info!(
        planets = galaxy.planets.len(),
        population = galaxy.total_population(),
        "CitySim starting"
    );

    println!("\n=== CITYSIM ===");
    println!("Commands:");
    println!("  tick / t               - Advance one year");
    println!("  run <n>                - Advance n years");
    println!("  status / s             - Show every planet and city");
    println!("  log [year]             - Show the event log for a year (default: latest)");
    println!("  metric <place> <name>  - Query a planet or city metric");
    println!("  citizen <who> <name>   - Query a citizen metric by name or id");
    println!("  revolt <city>          - Force a revolution");
    println!("  epidemic <planet>      - Start an epidemic");
    println!("  coup <city>            - Military coup");
    println!("  awaken <planet>        - Technological awakening");
    println!("  save <file>            - Write the galaxy to JSON");
    println!("  quit / q               - Exit");
    println!();

    loop {
        display_status(&galaxy);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        let (command, arg) = match input.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (input, ""),
        };

        match command {
            "quit" | "q" => break,
            "tick" | "t" => {
                simulate_year(&mut galaxy, &config);
                display_year(&galaxy, galaxy.year);
            }
            "run" => match arg.parse::<u32>() {
                Ok(n) => {
                    let ran = simulate(&mut galaxy, &config, n);
                    println!("Completed {} years. Now at year {}.", ran, galaxy.year);
                }
                Err(_) => println!("Usage: run <number>"),
            },
            "status" | "s" => display_detailed_status(&galaxy),
            "log" => {
                let year = if arg.is_empty() { Ok(galaxy.year) } else { arg.parse() };
                match year {
                    Ok(year) => display_year(&galaxy, year),
                    Err(_) => println!("Usage: log [year]"),
                }
            }
            "metric" => match arg.split_once(' ') {
                Some((place, name)) => report(metric_by_name(&galaxy, place, name).map(|v| format!("{:.3}", v))),
                None => println!("Usage: metric <place> <name>"),
            },
            "citizen" => match arg.rsplit_once(' ') {
                Some((who, name)) => report(
                    name.parse::<CitizenMetric>()
                        .and_then(|metric| citizen_metric(&galaxy, who, metric))
                        .map(|v| format!("{:.3}", v)),
                ),
                None => println!("Usage: citizen <name or id> <metric>"),
            },
            "revolt" => report(trigger_revolution(&mut galaxy, arg)),
            "epidemic" => report(trigger_epidemic(&mut galaxy, arg)),
            "coup" => report(trigger_coup(&mut galaxy, arg)),
            "awaken" => report(trigger_tech_awakening(&mut galaxy, arg)),
            "save" if !arg.is_empty() => {
                std::fs::write(arg, galaxy.to_json()?)?;
                println!("Galaxy written to {}", arg);
            }
            _ => println!("Unknown command. Available: tick, run <n>, status, log, metric, citizen, revolt, epidemic, coup, awaken, save, quit"),
        }
    }

    println!(
        "\nGoodbye! Final state: {} citizens on {} planets, year {}.",
        galaxy.total_population(),
        galaxy.planets.len(),
        galaxy.year
    );
    Ok(())
}

/// Load a TOML file when present, defaults otherwise
fn load_or_default<T: Default>(path: &str, load: fn(&Path) -> Result<T>) -> Result<T> {
    let path = Path::new(path);
    if path.exists() {
        tracing::info!(file = %path.display(), "Loading configuration");
        load(path)
    } else {
        Ok(T::default())
    }
}

fn report(outcome: Result<String>) {
    match outcome {
        Ok(message) => println!("{}", message),
        Err(e) => println!("Error: {}", e),
    }
}

fn display_year(galaxy: &Galaxy, year: u32) {
    let mut any = false;
    for message in galaxy.log.messages_for_year(year) {
        println!("  [{}] {}", year, message);
        any = true;
    }
    if !any {
        println!("  Nothing recorded for year {}", year);
    }
}

/// Brief one-line summary per planet
fn display_status(galaxy: &Galaxy) {
    println!();
    println!(
        "--- Year {} | Population: {} | Planets: {} ---",
        galaxy.year,
        galaxy.total_population(),
        galaxy.planets.len()
    );
    for planet in &galaxy.planets {
        let war = if planet.at_war() { " [AT WAR]" } else { "" };
        println!(
            "  {} - {} citizens, pollution {:.2}, conflict {:.2}{}",
            planet.name,
            planet.population(),
            planet.pollution,
            planet.conflict_level,
            war
        );
    }
    println!();
}

fn display_detailed_status(galaxy: &Galaxy) {
    println!();
    println!("=== Detailed Status (Year {}) ===", galaxy.year);
    if let Some(leader) = galaxy.federation.leader.and_then(|id| galaxy.people.get(id)) {
        println!("Federation leader: {} of {}", leader.name, leader.city);
    }
    if let Some(active) = galaxy.federation.policy {
        println!("Policy: {} ({} years left)", active.policy.name(), active.years_left);
    }
    println!();

    for planet in &galaxy.planets {
        println!("{}{}", planet.name, if planet.alien { " (alien)" } else { "" });
        println!(
            "  Tech: military {:.2}, environment {:.2}, medical {:.2}, production {:.2}",
            planet.tech.military, planet.tech.environment, planet.tech.medical, planet.tech.production
        );
        let breakthroughs: Vec<&str> = planet.breakthroughs.iter().map(|b| b.name()).collect();
        if !breakthroughs.is_empty() {
            println!("  Breakthroughs: {}", breakthroughs.join(", "));
        }
        for (other, state) in &planet.relations {
            println!("  Relation with {}: {:?}", other, state);
        }
        if planet.epidemic_active {
            println!("  Epidemic raging (severity {:.2})", planet.epidemic_severity);
        }

        for city in &planet.cities {
            println!(
                "  {} - {} citizens, food {:.0}, energy {:.0}, tax {:.0}, {:?} rule{}",
                city.name,
                city.population(),
                city.resources.food,
                city.resources.energy,
                city.resources.tax,
                city.government,
                city.ruling_party
                    .as_deref()
                    .map(|p| format!(" ({})", p))
                    .unwrap_or_default()
            );
            println!(
                "    births {}, deaths {}, arrivals {}, departures {}{}",
                city.birth_count,
                city.death_count,
                city.immigration_count,
                city.emigration_count,
                if city.mass_movement_active { ", mass movement active" } else { "" }
            );
        }
        println!();
    }
}
