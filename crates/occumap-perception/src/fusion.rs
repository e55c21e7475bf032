//! Cross-agent map fusion.
//!
//! A peer's static, dynamic and recency grids are merged into the local
//! [`MapLayers`] cell by cell: where the peer's recency is strictly fresher,
//! all three local values at that cell are replaced by the peer's.  No
//! probabilities are blended.
//!
//! Dimensions are validated for all three peer grids before any write, so a
//! rejected fusion leaves the destination untouched.  Fusing the same source
//! twice changes nothing the second time.
//!
//! # Example
//!
//! ```rust
//! use occumap_perception::{fuse_layers, ingest_window, MapLayers, SensorModels};
//! use occumap_types::{GridDims, Position};
//!
//! let dims = GridDims::new(5, 5);
//! let mut robot_a = MapLayers::new(dims, 0.5).unwrap();
//! let mut robot_b = MapLayers::new(dims, 0.5).unwrap();
//!
//! ingest_window(&mut robot_b, &SensorModels::default(), &[[1; 3]; 3], Position::new(2, 2), 3);
//!
//! let report = fuse_layers(&mut robot_a, &robot_b.snapshot()).unwrap();
//! assert_eq!(report.adopted, 9);
//! assert_eq!(robot_a.static_grid(), robot_b.static_grid());
//! ```

use occumap_types::MapError;
use tracing::debug;

use crate::grid::Grid;
use crate::layers::MapLayers;

/// Summary of one fusion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionReport {
    /// Cells whose values were replaced by the peer's.
    pub adopted: usize,
}

/// True when `theirs` should win over `ours`.
///
/// Any observation beats none; between two observations the strictly larger
/// recency wins.
fn is_fresher(theirs: Option<f64>, ours: Option<f64>) -> bool {
    match (theirs, ours) {
        (Some(t), Some(o)) => t > o,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Merge a peer's three grids into `dst` by recency.
pub fn fuse_grids(
    dst: &mut MapLayers,
    other_static: &Grid<f64>,
    other_dynamic: &Grid<f64>,
    other_recency: &Grid<Option<f64>>,
) -> Result<FusionReport, MapError> {
    dst.static_grid.ensure_same_dims(other_static)?;
    dst.dynamic_grid.ensure_same_dims(other_dynamic)?;
    dst.recency.ensure_same_dims(other_recency)?;

    let mut report = FusionReport::default();
    for pos in dst.recency.iter_positions() {
        let theirs = other_recency.get(pos).flatten();
        let ours = dst.recency.get(pos).flatten();
        if !is_fresher(theirs, ours) {
            continue;
        }
        if let (Some(s), Some(d)) = (other_static.get(pos), other_dynamic.get(pos)) {
            dst.static_grid.set(pos, s);
            dst.dynamic_grid.set(pos, d);
            dst.recency.set(pos, theirs);
            report.adopted += 1;
        }
    }

    debug!(adopted = report.adopted, dims = %dst.dims(), "fused peer map");
    Ok(report)
}

/// [`fuse_grids`] over a peer's [`MapLayers`] snapshot.
pub fn fuse_layers(dst: &mut MapLayers, other: &MapLayers) -> Result<FusionReport, MapError> {
    fuse_grids(dst, &other.static_grid, &other.dynamic_grid, &other.recency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use occumap_types::{GridDims, Position};

    fn layers() -> MapLayers {
        MapLayers::new(GridDims::new(3, 3), 0.5).unwrap()
    }

    fn observe(l: &mut MapLayers, pos: Position, p: f64, t: f64) {
        l.static_grid.set(pos, p);
        l.dynamic_grid.set(pos, 1.0 - p);
        l.recency.set(pos, Some(t));
    }

    #[test]
    fn fresher_peer_cells_are_adopted() {
        let mut a = layers();
        let mut b = layers();
        let pos = Position::new(0, 1);
        observe(&mut a, pos, 0.2, 1.0);
        observe(&mut b, pos, 0.9, 4.0);

        let report = fuse_layers(&mut a, &b).unwrap();
        assert_eq!(report.adopted, 1);
        assert_eq!(a.static_grid().get(pos), Some(0.9));
        assert_eq!(a.dynamic_grid().get(pos), Some(1.0 - 0.9));
        assert_eq!(a.recency().get(pos), Some(Some(4.0)));
    }

    #[test]
    fn stale_or_equal_peer_cells_are_ignored() {
        let mut a = layers();
        let mut b = layers();
        observe(&mut a, Position::new(0, 0), 0.2, 5.0);
        observe(&mut b, Position::new(0, 0), 0.9, 5.0);
        observe(&mut a, Position::new(1, 1), 0.3, 6.0);
        observe(&mut b, Position::new(1, 1), 0.8, 2.0);

        let report = fuse_layers(&mut a, &b).unwrap();
        assert_eq!(report.adopted, 0);
        assert_eq!(a.static_grid().get(Position::new(0, 0)), Some(0.2));
        assert_eq!(a.static_grid().get(Position::new(1, 1)), Some(0.3));
    }

    #[test]
    fn unobserved_peer_cells_never_win() {
        let mut a = layers();
        let b = layers();
        let before = a.clone();
        assert_eq!(fuse_layers(&mut a, &b).unwrap().adopted, 0);
        assert_eq!(a, before);
    }

    #[test]
    fn fusion_is_idempotent() {
        let mut a = layers();
        let mut b = layers();
        observe(&mut a, Position::new(2, 2), 0.4, 3.0);
        observe(&mut b, Position::new(0, 2), 0.7, 1.0);
        observe(&mut b, Position::new(2, 2), 0.1, 9.0);

        fuse_layers(&mut a, &b).unwrap();
        let once = a.clone();
        let report = fuse_layers(&mut a, &b).unwrap();
        assert_eq!(report.adopted, 0);
        assert_eq!(a, once);
    }

    #[test]
    fn recency_becomes_cellwise_max() {
        let mut a = layers();
        let mut b = layers();
        observe(&mut a, Position::new(0, 0), 0.4, 3.0);
        observe(&mut a, Position::new(1, 0), 0.4, 8.0);
        observe(&mut b, Position::new(0, 0), 0.6, 5.0);
        observe(&mut b, Position::new(1, 0), 0.6, 2.0);
        observe(&mut b, Position::new(2, 0), 0.6, 1.0);
        let original = a.clone();

        fuse_layers(&mut a, &b).unwrap();
        for pos in a.recency().iter_positions() {
            let mine = original.recency().get(pos).flatten();
            let theirs = b.recency().get(pos).flatten();
            let fused = a.recency().get(pos).flatten();
            let expected = match (mine, theirs) {
                (Some(m), Some(t)) => Some(m.max(t)),
                (m, t) => m.or(t),
            };
            assert_eq!(fused, expected, "at {pos}");
        }
    }

    #[test]
    fn mismatched_peer_is_rejected_without_writes() {
        let mut a = layers();
        let mut big = MapLayers::new(GridDims::new(4, 3), 0.5).unwrap();
        observe(&mut big, Position::new(0, 0), 0.9, 10.0);
        let before = a.clone();

        let err = fuse_layers(&mut a, &big).unwrap_err();
        assert!(matches!(err, MapError::DimensionMismatch { .. }));
        assert_eq!(a, before);
    }

    #[test]
    fn a_single_mismatched_grid_rejects_the_whole_fusion() {
        let mut a = layers();
        let mut b = layers();
        observe(&mut b, Position::new(0, 0), 0.9, 10.0);
        let wrong_recency = Grid::new(GridDims::new(3, 4), Some(99.0)).unwrap();
        let before = a.clone();

        let result = fuse_grids(&mut a, b.static_grid(), b.dynamic_grid(), &wrong_recency);
        assert!(result.is_err());
        assert_eq!(a, before);
    }
}
