//! Tracing subscriber setup.
//!
//! Call [`init_tracing`] once at process startup.  Library code in this
//! workspace only emits `tracing` events; the embedding process decides
//! whether and how they are printed.
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `OCCUMAP_LOG_FORMAT` | `json` or `compact` (any case), overriding `format`. |

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, parse_log_format};

/// Install the global subscriber.
///
/// Returns `false` when a global subscriber was already set (for example by
/// a test harness); the existing one is kept.
pub fn init_tracing(format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    let env_format = std::env::var("OCCUMAP_LOG_FORMAT").ok();
    let result = match resolve_format(format, env_format.as_deref()) {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .try_init(),
    };
    result.is_ok()
}

/// Same parsing rule as `config::apply_env_overrides`.
fn resolve_format(requested: LogFormat, env_value: Option<&str>) -> LogFormat {
    env_value.and_then(parse_log_format).unwrap_or(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused_not_panicking() {
        let _ = init_tracing(LogFormat::Compact);
        assert!(!init_tracing(LogFormat::Json));
    }

    #[test]
    fn requested_format_is_kept_without_override() {
        assert_eq!(resolve_format(LogFormat::Compact, None), LogFormat::Compact);
        assert_eq!(resolve_format(LogFormat::Json, None), LogFormat::Json);
        assert_eq!(resolve_format(LogFormat::Json, Some("yaml")), LogFormat::Json);
    }

    #[test]
    fn env_format_matches_config_rule() {
        assert_eq!(resolve_format(LogFormat::Compact, Some("JSON")), LogFormat::Json);
        assert_eq!(resolve_format(LogFormat::Json, Some("Compact")), LogFormat::Compact);
    }
}
