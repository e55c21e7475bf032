//! Fixed-size 2-D grid container.
//!
//! A [`Grid`] stores one value per cell in row-major order.  It starts
//! *uninitialized*; the first successful [`Grid::set`] flips the flag so
//! callers can tell a freshly allocated grid from one carrying real data.
//!
//! # Example
//!
//! ```rust
//! use occumap_perception::grid::Grid;
//! use occumap_types::{GridDims, Position};
//!
//! let mut grid = Grid::new(GridDims::new(2, 3), 0.5_f64).unwrap();
//! assert!(!grid.is_initialized());
//!
//! assert!(grid.set(Position::new(1, 2), 0.9));
//! assert_eq!(grid.get(Position::new(1, 2)), Some(0.9));
//! assert!(grid.is_initialized());
//!
//! // Writes outside the grid are refused.
//! assert!(!grid.set(Position::new(2, 0), 0.1));
//! ```

use occumap_types::{GridDims, MapError, Position};
use serde::{Deserialize, Serialize};

/// Row-major 2-D array of `T` with get/set access and a bulk view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    dims: GridDims,
    cells: Vec<T>,
    initialized: bool,
}

impl<T: Copy> Grid<T> {
    /// Allocate a grid with every cell set to `fill`.
    ///
    /// Returns [`MapError::EmptyGrid`] when either dimension is zero.
    pub fn new(dims: GridDims, fill: T) -> Result<Self, MapError> {
        if dims.is_empty() {
            return Err(MapError::EmptyGrid);
        }
        Ok(Self {
            dims,
            cells: vec![fill; dims.cell_count()],
            initialized: false,
        })
    }

    /// Build a grid from row-major values.
    ///
    /// The grid is marked initialized since it carries caller data.
    ///
    /// [`MapError::CellCountMismatch`] unless `cells` has exactly one value
    /// per cell.
    pub fn from_vec(dims: GridDims, cells: Vec<T>) -> Result<Self, MapError> {
        if dims.is_empty() {
            return Err(MapError::EmptyGrid);
        }
        if cells.len() != dims.cell_count() {
            return Err(MapError::CellCountMismatch {
                expected: dims.cell_count(),
                found: cells.len(),
            });
        }
        Ok(Self {
            dims,
            cells,
            initialized: true,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// True once any cell has been written.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Read one cell.  `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<T> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Write one cell.  Returns `false` and leaves the grid untouched when
    /// `pos` lies outside it.
    pub fn set(&mut self, pos: Position, value: T) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                self.initialized = true;
                true
            }
            None => false,
        }
    }

    /// Bulk read-only view of every cell, row-major.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Mutable bulk access for whole-grid passes.
    ///
    /// Marks the grid initialized.
    pub(crate) fn cells_mut(&mut self) -> &mut [T] {
        self.initialized = true;
        &mut self.cells
    }

    /// Every position of the grid in row-major order.
    pub fn iter_positions(&self) -> impl Iterator<Item = Position> + use<T> {
        let GridDims { height, width } = self.dims;
        (0..height).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }

    /// Fail with [`MapError::DimensionMismatch`] unless `other` has the same
    /// dimensions as `self`.
    pub fn ensure_same_dims<U>(&self, other: &Grid<U>) -> Result<(), MapError> {
        if self.dims != other.dims {
            return Err(MapError::DimensionMismatch {
                expected: self.dims,
                found: other.dims,
            });
        }
        Ok(())
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.dims.contains(pos) {
            Some(pos.row * self.dims.width + pos.col)
        } else {
            None
        }
    }
}
