//! Subscriber setup for applications embedding the plugin
//!
//! Only available with the `logging` feature. Libraries should install their
//! own subscriber; the plugin itself only emits `tracing` events.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Environment variable consulted by [`init_logging_from_env`]
pub const LOG_ENV_VAR: &str = "FOB_OXC_LOG";

/// Verbosity of the plugin's own events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    /// Non-fatal tsconfig.json problems (default)
    #[default]
    Warn,
    /// Per-module resolution decisions
    Debug,
    /// Everything, including per-module compile timings
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Warn => "warn",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter that applies this level to the plugin and keeps everything
    /// else at `warn`.
    fn filter(self) -> EnvFilter {
        EnvFilter::new(format!("warn,fob_plugin_oxc={}", self.as_str()))
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "silent" => Ok(LogLevel::Off),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install a global subscriber at `level`.
///
/// Only the first call in a process has any effect.
pub fn init_logging(level: LogLevel) {
    install(level.filter());
}

/// Install a global subscriber configured from `FOB_OXC_LOG`.
///
/// The variable accepts either a [`LogLevel`] name or a full `EnvFilter`
/// directive string. Falls back to [`LogLevel::Warn`] when unset or invalid.
pub fn init_logging_from_env() {
    let filter = match std::env::var(LOG_ENV_VAR) {
        Ok(value) => match value.parse::<LogLevel>() {
            Ok(level) => level.filter(),
            Err(_) => EnvFilter::try_new(&value).unwrap_or_else(|_| LogLevel::Warn.filter()),
        },
        Err(_) => LogLevel::Warn.filter(),
    };
    install(filter);
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        // Another subscriber may already be installed by the host
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer::layer().compact().with_target(false).without_time())
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("DEBUG".parse(), Ok(LogLevel::Debug));
        assert_eq!("silent".parse(), Ok(LogLevel::Off));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_filter_targets_plugin() {
        assert_eq!(
            LogLevel::Debug.filter().to_string(),
            "warn,fob_plugin_oxc=debug"
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(LogLevel::Off);
        init_logging(LogLevel::Trace);
    }
}
