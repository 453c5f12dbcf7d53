//! Batch galaxy simulation binary

use std::path::PathBuf;

use citysim::core::config::SimConfig;
use citysim::core::error::Result;
use citysim::galaxy::generation::WorldConfig;
use citysim::galaxy::simulation::run;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "galaxy_sim")]
#[command(about = "Run the galaxy for a number of years and write a JSON snapshot")]
struct Args {
    /// Years to simulate
    #[arg(long, default_value_t = 100)]
    years: u32,

    /// World topology (TOML); built-in two-planet world when omitted
    #[arg(long)]
    world: Option<PathBuf>,

    /// Rate table (TOML); built-in defaults when omitted
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshot destination
    #[arg(long, default_value = "simulation_output.json")]
    output: PathBuf,

    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_filter = if args.verbose { "citysim=debug" } else { "citysim=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let mut world = match &args.world {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = args.seed {
        world.seed = seed;
    }
    let config = match &args.rates {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    world.validate()?;
    config.validate()?;

    println!("Starting Galaxy Simulation");
    println!("==========================");
    println!("Seed: {}", world.seed);
    for planet in &world.planets {
        println!(
            "{}{}: {} cities, {} citizens each",
            planet.name,
            if planet.alien { " (alien)" } else { "" },
            planet.cities.len(),
            planet.population
        );
    }
    println!("Simulating {} years...", args.years);
    println!();

    let output = run(&world, &config, args.years);
    println!("{}", output.summary());

    std::fs::write(&args.output, output.to_json()?)?;
    println!("\nFull output written to {}", args.output.display());

    println!("\n--- Surviving Planets ---");
    for planet in &output.final_world.planets {
        println!(
            "{}: {} citizens, tech {:.2}, pollution {:.2}{}",
            planet.name,
            planet.population(),
            planet.tech.average(),
            planet.pollution,
            if planet.at_war() { ", at war" } else { "" }
        );
    }
    Ok(())
}
