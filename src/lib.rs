// The binary (main.rs) owns the terminal front-end; everything the round
// engine needs lives here so integration tests and benchmarks can reach it.

pub mod config;
pub mod error;
pub mod quiz;
pub mod store;
