//! The three co-located grids owned by one agent.

use occumap_types::{GridDims, MapError};
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::recency;

/// Occupancy probability carried by a cell nobody has observed.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Static occupancy, dynamic occupancy and recency for one agent's map.
///
/// The three grids always share the same [`GridDims`].  Recency cells are
/// `None` until first observed, then hold the (possibly decayed) time step
/// of their last update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayers {
    pub(crate) static_grid: Grid<f64>,
    pub(crate) dynamic_grid: Grid<f64>,
    pub(crate) recency: Grid<Option<f64>>,
}

impl MapLayers {
    /// Allocate all three grids; probabilities start at `initial_probability`.
    pub fn new(dims: GridDims, initial_probability: f64) -> Result<Self, MapError> {
        Ok(Self {
            static_grid: Grid::new(dims, initial_probability)?,
            dynamic_grid: Grid::new(dims, initial_probability)?,
            recency: Grid::new(dims, None)?,
        })
    }

    /// Assemble layers from existing grids, rejecting mismatched dimensions.
    pub fn from_grids(
        static_grid: Grid<f64>,
        dynamic_grid: Grid<f64>,
        recency: Grid<Option<f64>>,
    ) -> Result<Self, MapError> {
        static_grid.ensure_same_dims(&dynamic_grid)?;
        static_grid.ensure_same_dims(&recency)?;
        Ok(Self {
            static_grid,
            dynamic_grid,
            recency,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.static_grid.dims()
    }

    pub fn static_grid(&self) -> &Grid<f64> {
        &self.static_grid
    }

    pub fn dynamic_grid(&self) -> &Grid<f64> {
        &self.dynamic_grid
    }

    pub fn recency(&self) -> &Grid<Option<f64>> {
        &self.recency
    }

    /// Run the recency decay pass relative to `now`.
    ///
    /// Only the recency grid changes; see [`recency::decay`].
    pub fn decay(&mut self, now: u64, decay_constant: f64) -> usize {
        recency::decay(&mut self.recency, now, decay_constant)
    }

    /// Owned copy for handing to another agent's fusion pass.
    pub fn snapshot(&self) -> MapLayers {
        self.clone()
    }
}
