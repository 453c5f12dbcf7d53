//! CitySim - yearly simulation of a galaxy of planets, cities and citizens

pub mod core;
pub mod galaxy;
