//! Logging configuration.
//!
//! Level and format come from `REQDUMP_LOG` / `REQDUMP_LOG_FORMAT`, then
//! from `--log-level` / `--log-format`. A valid `RUST_LOG` replaces the
//! level filter entirely when logging is initialized.

use clap::ValueEnum;

pub const ENV_LOG: &str = "REQDUMP_LOG";
pub const ENV_LOG_FORMAT: &str = "REQDUMP_LOG_FORMAT";

/// Where diagnostics are rendered for humans or machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

/// Minimum level of diagnostics and dump lines routed through the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    /// Dump lines are logged at this level.
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "quiet")]
    Off,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogConfig {
    /// Build from the process environment, then apply CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::from_env_with(|key| std::env::var(key).ok(), cli_level, cli_format)
    }

    /// Like [`LogConfig::from_env`] with an explicit environment lookup.
    /// Unparseable values are ignored.
    pub fn from_env_with<F>(
        env: F,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let level = cli_level
            .or_else(|| from_env(ENV_LOG).and_then(|v| LogLevel::from_str(v.trim(), true).ok()))
            .unwrap_or_default();
        let format = cli_format
            .or_else(|| {
                from_env(ENV_LOG_FORMAT).and_then(|v| LogFormat::from_str(v.trim(), true).ok())
            })
            .unwrap_or_default();

        LogConfig { format, level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_level_and_format() {
        let config = LogConfig::from_env_with(
            env_of(&[("REQDUMP_LOG", "Warning"), ("REQDUMP_LOG_FORMAT", "json")]),
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Jsonl);
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = LogConfig::from_env_with(
            env_of(&[("REQDUMP_LOG", "trace"), ("REQDUMP_LOG_FORMAT", "jsonl")]),
            Some(LogLevel::Error),
            Some(LogFormat::Human),
        );
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        let config = LogConfig::from_env_with(
            env_of(&[("REQDUMP_LOG", "loud"), ("REQDUMP_LOG_FORMAT", "")]),
            None,
            None,
        );
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_quiet_alias() {
        assert_eq!(LogLevel::from_str("quiet", true), Ok(LogLevel::Off));
        assert_eq!(LogLevel::Off.as_directive(), "off");
    }
}
