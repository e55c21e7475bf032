//! Log-odds Bayesian cell update.
//!
//! Fuses an inverse-sensor-model likelihood `L` into a cell's current
//! probability `p` by summing log-odds:
//!
//! ```text
//! odds = exp( ln(L / (1 − L)) + ln(p / (1 − p)) )
//! p'   = odds / (1 + odds)
//! ```
//!
//! Exact 0 or 1 would send the logarithm to ±∞, so both inputs and the
//! result are clamped to `[ε, 1 − ε]` with ε = [`PROBABILITY_EPSILON`].

use occumap_types::Position;

use crate::grid::Grid;

/// Distance kept between any stored probability and 0 or 1.
pub const PROBABILITY_EPSILON: f64 = 1e-5;

/// Clamp `p` into `[ε, 1 − ε]`.  NaN becomes the neutral 0.5.
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        return 0.5;
    }
    p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON)
}

/// `ln(p / (1 − p))` of the clamped probability.
pub fn log_odds(p: f64) -> f64 {
    let p = clamp_probability(p);
    (p / (1.0 - p)).ln()
}

/// Inverse of [`log_odds`], clamped.
pub fn from_log_odds(l: f64) -> f64 {
    let odds = l.exp();
    clamp_probability(odds / (1.0 + odds))
}

/// Updated probability after fusing `likelihood` into `prior`.
///
/// # Example
///
/// ```rust
/// use occumap_perception::bayes::log_odds_update;
///
/// // A neutral likelihood carries no information.
/// assert!((log_odds_update(0.5, 0.3) - 0.3).abs() < 1e-12);
///
/// // Evidence of occupancy pushes the estimate up.
/// assert!(log_odds_update(0.85, 0.5) > 0.5);
/// ```
pub fn log_odds_update(likelihood: f64, prior: f64) -> f64 {
    from_log_odds(log_odds(likelihood) + log_odds(prior))
}

/// Read-modify-write one cell of `grid` with `likelihood`.
///
/// Returns the new value, or `None` when `pos` lies outside the grid.
pub fn update_cell(grid: &mut Grid<f64>, pos: Position, likelihood: f64) -> Option<f64> {
    let prior = grid.get(pos)?;
    let posterior = log_odds_update(likelihood, prior);
    grid.set(pos, posterior);
    Some(posterior)
}
