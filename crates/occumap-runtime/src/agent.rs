//! A single mapping agent.
//!
//! An [`Agent`] owns a position inside a fixed grid, a discrete clock and
//! its [`MapLayers`].  It is the external surface of the mapping core:
//! create it, [`step`](Agent::step) it, feed it observation windows, fuse
//! peer maps into it and read its grids back.
//!
//! All operations are synchronous and must not interleave for one agent;
//! see [`Fleet`](crate::fleet::Fleet) for running several agents at once.
//!
//! # Example
//!
//! ```rust
//! use occumap_runtime::Agent;
//! use occumap_types::{Action, GridDims, Position};
//!
//! let mut agent = Agent::new("scout", Position::new(2, 2), GridDims::new(5, 5)).unwrap();
//!
//! agent.ingest_observation(&[[0; 3]; 3]);
//! assert_eq!(agent.time(), 1);
//! assert!(agent.static_grid().get(Position::new(1, 1)).unwrap() < 0.5);
//!
//! assert_eq!(agent.step(Action::Up), Position::new(1, 2));
//! assert_eq!(agent.time(), 2);
//! ```

use occumap_perception::grid::Grid;
use occumap_perception::{FusionReport, IngestReport, MapLayers, fuse_grids, fuse_layers, ingest_window};
use occumap_types::{Action, GridDims, MapError, ObservationWindow, Position};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::MapperConfig;

// ────────────────────────────────────────────────────────────────────────────
// Agent
// ────────────────────────────────────────────────────────────────────────────

/// One agent's state: identity, clock, pose and map.
#[derive(Debug, Clone)]
pub struct Agent {
    id: Uuid,
    name: String,
    time: u64,
    position: Position,
    config: MapperConfig,
    layers: MapLayers,
}

impl Agent {
    /// Create an agent with the default configuration.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyGrid`] for a zero-sized grid and
    /// [`MapError::PositionOutOfBounds`] when `position` lies outside it.
    pub fn new(name: impl Into<String>, position: Position, dims: GridDims) -> Result<Self, MapError> {
        Self::with_config(name, position, dims, MapperConfig::default())
    }

    /// Create an agent with an explicit configuration.
    pub fn with_config(
        name: impl Into<String>,
        position: Position,
        dims: GridDims,
        config: MapperConfig,
    ) -> Result<Self, MapError> {
        config.validate()?;
        if dims.is_empty() {
            return Err(MapError::EmptyGrid);
        }
        if !dims.contains(position) {
            return Err(MapError::PositionOutOfBounds { position, dims });
        }
        let layers = MapLayers::new(dims, config.initial_probability)?;
        let agent = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            time: 0,
            position,
            config,
            layers,
        };
        debug!(agent = %agent.name, id = %agent.id, %position, %dims, "agent created");
        Ok(agent)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current discrete time step.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn dims(&self) -> GridDims {
        self.layers.dims()
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Advance time by one and apply `action`.
    ///
    /// Motion that would leave the grid leaves the position unchanged.
    pub fn step(&mut self, action: Action) -> Position {
        self.time += 1;
        let dims = self.dims();
        let Position { row, col } = self.position;
        let next = match action {
            Action::Up => Position::new(row.saturating_sub(1), col),
            Action::Down if row + 1 < dims.height => Position::new(row + 1, col),
            Action::Left => Position::new(row, col.saturating_sub(1)),
            Action::Right if col + 1 < dims.width => Position::new(row, col + 1),
            Action::Down | Action::Right | Action::Observe => self.position,
        };
        if next == self.position && action != Action::Observe {
            trace!(agent = %self.name, ?action, position = %self.position, "motion blocked at boundary");
        }
        self.position = next;
        next
    }

    /// Ingest a 3×3 observation window centred on the current position.
    ///
    /// Time advances by one first; every updated cell is stamped with the new
    /// time, then the decay pass ages the whole recency grid.
    pub fn ingest_observation(&mut self, window: &ObservationWindow) -> IngestReport {
        self.time += 1;
        let report = ingest_window(
            &mut self.layers,
            &self.config.sensor_models,
            window,
            self.position,
            self.time,
        );
        let decayed = self.layers.decay(self.time, self.config.decay_constant);
        debug!(
            agent = %self.name,
            time = self.time,
            updated = report.updated,
            unobserved = report.skipped_unobserved,
            off_grid = report.skipped_out_of_bounds,
            decayed,
            "observation ingested"
        );
        report
    }

    /// Merge a peer's three grids into this agent's map by recency.
    ///
    /// # Errors
    ///
    /// [`MapError::DimensionMismatch`] if any peer grid differs in size; the
    /// map is left untouched.
    pub fn fuse(
        &mut self,
        other_static: &Grid<f64>,
        other_dynamic: &Grid<f64>,
        other_recency: &Grid<Option<f64>>,
    ) -> Result<FusionReport, MapError> {
        fuse_grids(&mut self.layers, other_static, other_dynamic, other_recency)
    }

    /// [`fuse`](Self::fuse) over a peer's snapshot.
    pub fn fuse_from(&mut self, other: &MapLayers) -> Result<FusionReport, MapError> {
        fuse_layers(&mut self.layers, other)
    }

    pub fn static_grid(&self) -> &Grid<f64> {
        self.layers.static_grid()
    }

    pub fn dynamic_grid(&self) -> &Grid<f64> {
        self.layers.dynamic_grid()
    }

    pub fn recency_grid(&self) -> &Grid<Option<f64>> {
        self.layers.recency()
    }

    pub fn layers(&self) -> &MapLayers {
        &self.layers
    }

    /// Owned copy of the map for handing to another agent.
    pub fn snapshot(&self) -> MapLayers {
        self.layers.snapshot()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
