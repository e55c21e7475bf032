//! Mapper configuration – reads/writes a TOML file such as `occumap.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! calibrated behaviour.  A minimal override looks like:
//!
//! ```toml
//! decay_constant = 40.0
//!
//! [sensor_models.static_model]
//! free_threshold = 0.40
//! occupied_threshold = 0.60
//! low = 0.05
//! high = 0.85
//! contradiction = 0.01
//! ```

use std::fs;
use std::path::Path;

use occumap_perception::recency::DEFAULT_DECAY_CONSTANT;
use occumap_perception::{NEUTRAL_PROBABILITY, SensorModels};
use occumap_types::MapError;
use serde::{Deserialize, Serialize};

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Tunables shared by every agent built from this configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Time-constant of the recency decay pass, in time steps.
    #[serde(default = "default_decay_constant")]
    pub decay_constant: f64,

    /// Occupancy probability every static/dynamic cell starts at.
    #[serde(default = "default_initial_probability")]
    pub initial_probability: f64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Inverse sensor model constants.
    #[serde(default)]
    pub sensor_models: SensorModels,
}

fn default_decay_constant() -> f64 {
    DEFAULT_DECAY_CONSTANT
}
fn default_initial_probability() -> f64 {
    NEUTRAL_PROBABILITY
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            decay_constant: default_decay_constant(),
            initial_probability: default_initial_probability(),
            log_format: LogFormat::default(),
            sensor_models: SensorModels::default(),
        }
    }
}

impl MapperConfig {
    /// Reject values that would break the log-odds arithmetic.
    pub fn validate(&self) -> Result<(), MapError> {
        if !(self.decay_constant.is_finite() && self.decay_constant > 0.0) {
            return Err(MapError::Config(format!(
                "decay_constant must be positive, got {}",
                self.decay_constant
            )));
        }
        if !(self.initial_probability > 0.0 && self.initial_probability < 1.0) {
            return Err(MapError::Config(format!(
                "initial_probability must lie in (0, 1), got {}",
                self.initial_probability
            )));
        }
        if !self.sensor_models.static_model.is_valid() {
            return Err(MapError::Config("invalid static sensor model parameters".into()));
        }
        if !self.sensor_models.dynamic_model.is_valid() {
            return Err(MapError::Config("invalid dynamic sensor model parameters".into()));
        }
        Ok(())
    }
}

/// Load a config from `path`.  Returns `None` if the file does not exist.
///
/// Environment overrides are applied and the result is validated.
pub fn load_from(path: &Path) -> Result<Option<MapperConfig>, MapError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| MapError::Config(format!("failed to read {}: {e}", path.display())))?;
    let mut cfg: MapperConfig =
        toml::from_str(&raw).map_err(|e| MapError::Config(format!("failed to parse config: {e}")))?;
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Apply `OCCUMAP_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `OCCUMAP_DECAY_CONSTANT` | `decay_constant` |
/// | `OCCUMAP_LOG_FORMAT` | `log_format` (`compact` or `json`) |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut MapperConfig) {
    if let Ok(v) = std::env::var("OCCUMAP_DECAY_CONSTANT")
        && let Ok(c) = v.parse::<f64>()
    {
        cfg.decay_constant = c;
    }
    if let Ok(v) = std::env::var("OCCUMAP_LOG_FORMAT")
        && let Some(format) = parse_log_format(&v)
    {
        cfg.log_format = format;
    }
}

/// Parse a log format name, ignoring case.  `None` for anything else.
pub fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "compact" => Some(LogFormat::Compact),
        _ => None,
    }
}

/// Write `cfg` to `path`, creating parent directories as needed.
pub fn save_to(cfg: &MapperConfig, path: &Path) -> Result<(), MapError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| MapError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| MapError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| MapError::Config(format!("failed to write {}: {e}", path.display())))
}
