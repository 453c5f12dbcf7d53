//! Simulation engines, one module per rule set

mod federation;
pub mod interstellar;
pub mod lifecycle;
pub mod migration;
pub mod settlement;
pub mod technology;

pub use federation::{elect_leader, galaxy_events};
pub use interstellar::{declare_war, launch_attack, update_relations};
pub use lifecycle::update_citizens;
pub use migration::{apply_migrations, Migration};
pub use settlement::{hold_election, revolution, trade_between_cities, update_city, Mood};
pub use technology::{start_epidemic, unlock_breakthroughs, update_planet};
