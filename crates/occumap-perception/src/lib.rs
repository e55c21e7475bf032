//! `occumap-perception` – probabilistic grid fusion.
//!
//! Turns noisy 3×3 local observations into three co-located grids per agent
//! (static occupancy, dynamic occupancy, recency) and merges grids across
//! agents.
//!
//! # Modules
//!
//! - [`grid`] – [`Grid`][grid::Grid]: fixed-size row-major 2-D container with
//!   an "initialized" flag.
//! - [`layers`] – [`MapLayers`][layers::MapLayers]: the static, dynamic and
//!   recency grids owned by one agent.
//! - [`sensor_model`] – the static and dynamic inverse sensor models built on
//!   a shared three-way prior classification.
//! - [`bayes`] – the clamped log-odds cell update.
//! - [`recency`] – recency stamping and the decay pass.
//! - [`ingest`] – resolves a 3×3 egocentric window into absolute cells and
//!   drives the models, the updater and the recency tracker.
//! - [`fusion`] – recency-arbitrated, cell-wise map fusion between agents.

pub mod bayes;
pub mod fusion;
pub mod grid;
pub mod ingest;
pub mod layers;
pub mod recency;
pub mod sensor_model;

pub use fusion::{FusionReport, fuse_grids, fuse_layers};
pub use grid::Grid;
pub use ingest::{IngestReport, ingest_window, resolve_window};
pub use layers::{MapLayers, NEUTRAL_PROBABILITY};
pub use sensor_model::{PriorClass, SensorModelParams, SensorModels};
