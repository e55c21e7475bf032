//! `occumap-runtime` – agents and fleets over the occupancy mapping core.
//!
//! # Modules
//!
//! - [`agent`] – [`Agent`][agent::Agent]: one mapping agent with its clock,
//!   bounded grid position and static/dynamic/recency map.  Exposes
//!   creation, stepping, observation ingestion, fusion and read-only grid
//!   access.
//! - [`fleet`] – [`Fleet`][fleet::Fleet]: a registry of independently locked
//!   agents supporting parallel ingestion and recency-arbitrated map
//!   synchronisation.
//! - [`config`] – [`MapperConfig`][config::MapperConfig]: TOML-backed
//!   tunables (decay constant, sensor model constants, log format) with
//!   `OCCUMAP_*` environment overrides.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber.

pub mod agent;
pub mod config;
pub mod fleet;
pub mod telemetry;

pub use agent::Agent;
pub use config::{LogFormat, MapperConfig};
pub use fleet::{AgentHandle, Fleet};
pub use telemetry::init_tracing;
