//! Local observation ingestion.
//!
//! A 3×3 egocentric window is resolved to absolute cells, then each cell is
//! pushed through both inverse sensor models, the log-odds updater and the
//! recency tracker.
//!
//! Local index `(i, j)` maps to `position − (1 − i, 1 − j)`; window cells
//! that would land outside the grid are dropped.
//!
//! # Example
//!
//! ```rust
//! use occumap_perception::{ingest_window, MapLayers, SensorModels, NEUTRAL_PROBABILITY};
//! use occumap_types::{GridDims, Position};
//!
//! let mut layers = MapLayers::new(GridDims::new(5, 5), NEUTRAL_PROBABILITY).unwrap();
//! let window = [[0, 0, 0], [0, 0, 0], [-1, -1, -1]];
//!
//! let report = ingest_window(
//!     &mut layers,
//!     &SensorModels::default(),
//!     &window,
//!     Position::new(2, 2),
//!     1,
//! );
//! assert_eq!(report.updated, 6);
//! assert_eq!(report.skipped_unobserved, 3);
//! ```

use std::collections::BTreeMap;

use occumap_types::{GridDims, Observation, ObservationWindow, Position};
use tracing::trace;

use crate::bayes::update_cell;
use crate::layers::MapLayers;
use crate::recency::stamp;
use crate::sensor_model::{SensorModels, dynamic_inverse_sensor_model, static_inverse_sensor_model};

/// Index of the agent inside the 3×3 window, per axis.
const WINDOW_CENTRE: usize = 1;

/// Summary of one ingested window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Cells whose grids were updated.
    pub updated: usize,
    /// Window cells carrying the "not observed" code.
    pub skipped_unobserved: usize,
    /// Window cells that fell outside the grid.
    pub skipped_out_of_bounds: usize,
}

/// Resolved window: absolute cell → occupied flag.
///
/// Later window entries overwrite earlier ones for the same cell; iteration
/// is row-major over absolute positions.
pub type ResolvedWindow = BTreeMap<Position, bool>;

/// Apply the clamp rule and translate the window to absolute coordinates.
///
/// Returns the resolved cells together with a report whose `updated` field
/// is zero.
pub fn resolve_window(
    window: &ObservationWindow,
    position: Position,
    dims: GridDims,
) -> (ResolvedWindow, IngestReport) {
    let mut resolved = ResolvedWindow::new();
    let mut report = IngestReport::default();

    for (i, row) in window.iter().enumerate() {
        for (j, &code) in row.iter().enumerate() {
            let Some(occupied) = Observation::from_code(code).as_occupied() else {
                report.skipped_unobserved += 1;
                continue;
            };
            let target = (position.row + i)
                .checked_sub(WINDOW_CENTRE)
                .zip((position.col + j).checked_sub(WINDOW_CENTRE))
                .map(|(row, col)| Position::new(row, col))
                .filter(|p| dims.contains(*p));
            match target {
                Some(p) => {
                    resolved.insert(p, occupied);
                }
                None => {
                    trace!(local_row = i, local_col = j, %position, "window cell outside grid");
                    report.skipped_out_of_bounds += 1;
                }
            }
        }
    }

    (resolved, report)
}

/// Fuse one observation window into `layers`, stamping recency with `now`.
///
/// Both models are keyed off the static grid's prior, read before either
/// grid is written.  Decay is left to the caller, which runs it once the
/// whole window has been applied.
pub fn ingest_window(
    layers: &mut MapLayers,
    models: &SensorModels,
    window: &ObservationWindow,
    position: Position,
    now: u64,
) -> IngestReport {
    let (resolved, mut report) = resolve_window(window, position, layers.dims());

    for (pos, occupied) in resolved {
        let Some(prior_static) = layers.static_grid.get(pos) else {
            continue;
        };
        let l_static = static_inverse_sensor_model(&models.static_model, prior_static, occupied);
        let l_dynamic = dynamic_inverse_sensor_model(&models.dynamic_model, prior_static, occupied);

        update_cell(&mut layers.static_grid, pos, l_static);
        update_cell(&mut layers.dynamic_grid, pos, l_dynamic);
        stamp(&mut layers.recency, pos, now);
        report.updated += 1;
    }

    report
}
