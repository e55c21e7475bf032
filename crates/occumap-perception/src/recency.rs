//! Recency tracking and decay.
//!
//! Every cell touched by an update is stamped with the current time step.
//! Once per step a decay pass ages every observed cell:
//!
//! ```text
//! delta = (now − r) / decay_constant
//! r     ← r − delta
//! ```
//!
//! so cells that have not been refreshed fall further behind with every
//! step, and lose to fresher data during fusion.  Unobserved (`None`) cells
//! are never touched; neither are the occupancy grids.
//!
//! A cell stamped later than `now` (adopted from a peer whose clock runs
//! ahead) is left as is: decay only ever lowers a value.

use occumap_types::Position;

use crate::grid::Grid;

/// Default decay time-constant, in time steps.
pub const DEFAULT_DECAY_CONSTANT: f64 = 80.0;

/// Mark `pos` as updated at time `now`.
pub fn stamp(recency: &mut Grid<Option<f64>>, pos: Position, now: u64) -> bool {
    recency.set(pos, Some(now as f64))
}

/// Age every observed cell relative to `now`.
///
/// Cells with `r >= now` are unchanged.  Returns the number of cells whose value changed.
pub fn decay(recency: &mut Grid<Option<f64>>, now: u64, decay_constant: f64) -> usize {
    if !recency.is_initialized() {
        return 0;
    }
    let now = now as f64;
    let mut changed = 0;
    for value in recency.cells_mut().iter_mut().flatten() {
        let delta = ((now - *value) / decay_constant).max(0.0);
        if delta != 0.0 {
            *value -= delta;
            changed += 1;
        }
    }
    changed
}
