//! Request dumper configuration loading and validation.
//!
//! This crate provides:
//! - The [`DumperConfig`] struct read from TOML/JSON files, the environment,
//!   CLI flags and host init parameters
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Validation that compiles every filter before any request is dumped

pub mod dumper;
pub mod error;
pub mod resolve;

pub use dumper::{DumperConfig, TimestampZone};
pub use error::{ConfigError, Result};
pub use resolve::{load_config, load_config_with_env, ConfigOptions, ConfigSource, LoadedConfig};
