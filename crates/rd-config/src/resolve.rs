//! Configuration resolution and path discovery.
//!
//! Resolution order for the config file: CLI argument → `REQDUMP_CONFIG`
//! → XDG config directory → `/etc/reqdump/` → built-in defaults.
//!
//! Values are then layered, later wins: defaults → file → `REQDUMP_*`
//! environment variables → CLI overrides.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigError, DumperConfig, Result};

/// Environment variable naming an explicit config file.
const ENV_CONFIG_PATH: &str = "REQDUMP_CONFIG";

/// Standard config file name.
const CONFIG_FILENAME: &str = "config.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "reqdump";

/// Where the configuration file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Named by `REQDUMP_CONFIG`.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/reqdump/.
    SystemConfig,

    /// No file; built-in defaults only.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Options for [`load_config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Config file given on the command line.
    pub config_path: Option<PathBuf>,

    /// Values given on the command line; applied last.
    pub overrides: DumperConfig,

    /// Skip XDG and system config discovery.
    pub no_discovery: bool,
}

/// A resolved, validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DumperConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve, layer and validate the configuration using the process
/// environment.
pub fn load_config(options: &ConfigOptions) -> Result<LoadedConfig> {
    load_config_with_env(options, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading environment variables through `env`.
pub fn load_config_with_env<F>(options: &ConfigOptions, env: F) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (path, source) = resolve_config_path(options, &env)?;

    let mut config = DumperConfig::default();
    if let Some(ref path) = path {
        config.merge(DumperConfig::load(path)?);
    }
    config.merge(DumperConfig::from_env_with(&env)?);
    config.merge(options.overrides.clone());

    config.validate()?;
    debug!(%source, path = ?path, "dumper configuration resolved");

    Ok(LoadedConfig {
        config,
        path,
        source,
    })
}

fn resolve_config_path<F>(
    options: &ConfigOptions,
    env: &F,
) -> Result<(Option<PathBuf>, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. CLI argument; must exist when given.
    if let Some(ref path) = options.config_path {
        require_exists(path)?;
        return Ok((Some(path.clone()), ConfigSource::CliArgument));
    }

    // 2. Environment variable; must exist when set.
    if let Some(env_path) = env(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(env_path);
        require_exists(&path)?;
        return Ok((Some(path), ConfigSource::Environment));
    }

    if options.no_discovery {
        return Ok((None, ConfigSource::BuiltinDefault));
    }

    // 3. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(APP_NAME).join(CONFIG_FILENAME);
        if path.exists() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    // 4. System config
    let system_path = Path::new("/etc").join(APP_NAME).join(CONFIG_FILENAME);
    if system_path.exists() {
        return Ok((Some(system_path), ConfigSource::SystemConfig));
    }

    Ok((None, ConfigSource::BuiltinDefault))
}

fn require_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        })
    }
}
