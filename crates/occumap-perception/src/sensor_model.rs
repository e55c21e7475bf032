//! Inverse sensor models.
//!
//! Both models map the current **static** occupancy probability of a cell
//! and a binary observation to a likelihood that the log-odds updater treats
//! as evidence.  The prior is first bucketed by [`classify`] into
//! free / occupied / unknown using a per-model threshold pair; each bucket
//! crossed with the observation selects one calibrated constant.
//!
//! | Model   | Free thr | Occupied thr | Low  | High | Contradiction |
//! |---------|----------|--------------|------|------|---------------|
//! | Static  | 0.45     | 0.55         | 0.05 | 0.85 | 0.01          |
//! | Dynamic | 0.10     | 0.90         | 0.05 | 0.99 | 0.20          |
//!
//! The tables are asymmetric: a cell already believed static is unlikely to
//! be a transient obstacle, and a cell believed free that suddenly reads
//! occupied is evidence for a dynamic obstacle rather than a static one.
//!
//! # Example
//!
//! ```rust
//! use occumap_perception::sensor_model::{
//!     dynamic_inverse_sensor_model, static_inverse_sensor_model, SensorModelParams,
//! };
//!
//! let s = SensorModelParams::static_default();
//! let d = SensorModelParams::dynamic_default();
//!
//! // Unknown prior, occupied reading: strong static evidence, weak dynamic.
//! assert_eq!(static_inverse_sensor_model(&s, 0.5, true), 0.85);
//! assert_eq!(dynamic_inverse_sensor_model(&d, 0.5, true), 0.05);
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Prior classification
// ────────────────────────────────────────────────────────────────────────────

/// Three-way bucket of a prior occupancy probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorClass {
    /// At or below the free threshold.
    Free,
    /// At or above the occupied threshold.
    Occupied,
    /// Strictly between the two thresholds.
    Unknown,
}

/// Bucket `prior` by the `(free_threshold, occupied_threshold)` pair.
///
/// The free test runs first, so overlapping thresholds resolve to
/// [`PriorClass::Free`].
pub fn classify(prior: f64, free_threshold: f64, occupied_threshold: f64) -> PriorClass {
    if prior <= free_threshold {
        PriorClass::Free
    } else if prior >= occupied_threshold {
        PriorClass::Occupied
    } else {
        PriorClass::Unknown
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parameters
// ────────────────────────────────────────────────────────────────────────────

/// Calibrated constants for one inverse sensor model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorModelParams {
    /// Priors at or below this are "certainly free".
    pub free_threshold: f64,
    /// Priors at or above this are "certainly occupied".
    pub occupied_threshold: f64,
    /// Likelihood returned for weak / negative evidence.
    pub low: f64,
    /// Likelihood returned for strong positive evidence.
    pub high: f64,
    /// Likelihood for the one prior/observation pair the model distrusts:
    /// free prior with an occupied reading for the static model, occupied
    /// prior with a free reading for the dynamic model.
    pub contradiction: f64,
}

impl SensorModelParams {
    pub const STATIC: Self = Self {
        free_threshold: 0.45,
        occupied_threshold: 0.55,
        low: 0.05,
        high: 0.85,
        contradiction: 0.01,
    };

    pub const DYNAMIC: Self = Self {
        free_threshold: 0.10,
        occupied_threshold: 0.90,
        low: 0.05,
        high: 0.99,
        contradiction: 0.20,
    };

    pub fn static_default() -> Self {
        Self::STATIC
    }

    pub fn dynamic_default() -> Self {
        Self::DYNAMIC
    }

    fn classify(&self, prior: f64) -> PriorClass {
        classify(prior, self.free_threshold, self.occupied_threshold)
    }

    /// True when every field is a probability in (0, 1) and the thresholds
    /// are ordered.
    pub fn is_valid(&self) -> bool {
        let in_range = |p: f64| p > 0.0 && p < 1.0;
        in_range(self.free_threshold)
            && in_range(self.occupied_threshold)
            && in_range(self.low)
            && in_range(self.high)
            && in_range(self.contradiction)
            && self.free_threshold <= self.occupied_threshold
    }
}

/// The static/dynamic parameter pair used by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorModels {
    #[serde(default = "SensorModelParams::static_default")]
    pub static_model: SensorModelParams,
    #[serde(default = "SensorModelParams::dynamic_default")]
    pub dynamic_model: SensorModelParams,
}

impl Default for SensorModels {
    fn default() -> Self {
        Self {
            static_model: SensorModelParams::STATIC,
            dynamic_model: SensorModelParams::DYNAMIC,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inverse sensor models
// ────────────────────────────────────────────────────────────────────────────

/// Likelihood that a cell is a permanent obstacle.
pub fn static_inverse_sensor_model(
    params: &SensorModelParams,
    prior_static: f64,
    occupied: bool,
) -> f64 {
    match (params.classify(prior_static), occupied) {
        (PriorClass::Free, true) => params.contradiction,
        (PriorClass::Free, false) => params.low,
        (PriorClass::Occupied, true) => params.high,
        (PriorClass::Occupied, false) => params.low,
        (PriorClass::Unknown, true) => params.high,
        (PriorClass::Unknown, false) => params.low,
    }
}

/// Likelihood that a cell holds a transient obstacle.
///
/// Classified on the *static* prior, not the dynamic grid's own value.
pub fn dynamic_inverse_sensor_model(
    params: &SensorModelParams,
    prior_static: f64,
    occupied: bool,
) -> f64 {
    match (params.classify(prior_static), occupied) {
        (PriorClass::Free, true) => params.high,
        (PriorClass::Free, false) => params.low,
        (PriorClass::Occupied, true) => params.low,
        (PriorClass::Occupied, false) => params.contradiction,
        (PriorClass::Unknown, _) => params.low,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const S: SensorModelParams = SensorModelParams::STATIC;
    const D: SensorModelParams = SensorModelParams::DYNAMIC;

    #[test]
    fn classify_thresholds_are_inclusive() {
        assert_eq!(classify(0.45, 0.45, 0.55), PriorClass::Free);
        assert_eq!(classify(0.55, 0.45, 0.55), PriorClass::Occupied);
        assert_eq!(classify(0.5, 0.45, 0.55), PriorClass::Unknown);
        assert_eq!(classify(0.0, 0.45, 0.55), PriorClass::Free);
        assert_eq!(classify(1.0, 0.45, 0.55), PriorClass::Occupied);
    }

    #[test]
    fn static_model_table() {
        // free prior
        assert_eq!(static_inverse_sensor_model(&S, 0.2, true), 0.01);
        assert_eq!(static_inverse_sensor_model(&S, 0.2, false), 0.05);
        // occupied prior
        assert_eq!(static_inverse_sensor_model(&S, 0.8, true), 0.85);
        assert_eq!(static_inverse_sensor_model(&S, 0.8, false), 0.05);
        // unknown prior
        assert_eq!(static_inverse_sensor_model(&S, 0.5, true), 0.85);
        assert_eq!(static_inverse_sensor_model(&S, 0.5, false), 0.05);
    }

    #[test]
    fn dynamic_model_table() {
        // free prior
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.05, true), 0.99);
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.05, false), 0.05);
        // occupied prior
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.95, true), 0.05);
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.95, false), 0.20);
        // unknown prior
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.5, true), 0.05);
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.5, false), 0.05);
    }

    #[test]
    fn models_use_their_own_thresholds() {
        // 0.3 is free for the static model but unknown for the dynamic one.
        assert_eq!(static_inverse_sensor_model(&S, 0.3, true), 0.01);
        assert_eq!(dynamic_inverse_sensor_model(&D, 0.3, true), 0.05);
    }

    #[test]
    fn default_params_are_valid() {
        assert!(S.is_valid());
        assert!(D.is_valid());
        let broken = SensorModelParams { high: 1.0, ..S };
        assert!(!broken.is_valid());
        let inverted = SensorModelParams {
            free_threshold: 0.7,
            occupied_threshold: 0.3,
            ..S
        };
        assert!(!inverted.is_valid());
    }

    #[test]
    fn sensor_models_deserialize_with_defaults() {
        let models: SensorModels = serde_json::from_str("{}").unwrap();
        assert_eq!(models, SensorModels::default());
    }
}
