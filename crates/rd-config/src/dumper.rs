//! Request dumper configuration.
//!
//! Every field is optional. An absent filter leaves the policy default in
//! place, while an empty filter string disables redaction for that class.

use std::collections::HashMap;
use std::path::Path;

use rd_redact::{FieldClass, NameFilter, RedactionPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, Result};

/// Init-parameter key for the timestamp zone.
pub const TIMESTAMP_ZONE_PARAMETER: &str = "timestampZone";

/// Init-parameter key for the extended response dump.
pub const EXTENDED_RESPONSE_PARAMETER: &str = "extendedResponse";

/// Environment variables read by [`DumperConfig::from_env_with`].
pub const ENV_PARAM_FILTER: &str = "REQDUMP_PARAM_FILTER";
pub const ENV_COOKIE_FILTER: &str = "REQDUMP_COOKIE_FILTER";
pub const ENV_REQUEST_HEADER_FILTER: &str = "REQDUMP_REQUEST_HEADER_FILTER";
pub const ENV_RESPONSE_HEADER_FILTER: &str = "REQDUMP_RESPONSE_HEADER_FILTER";
pub const ENV_TIMESTAMP_ZONE: &str = "REQDUMP_TIMESTAMP_ZONE";

/// Zone used to render the START/END TIME lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// The host's local time zone (default).
    #[default]
    Local,
    /// Coordinated universal time.
    Utc,
}

impl std::str::FromStr for TimestampZone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(TimestampZone::Local),
            "utc" | "gmt" | "z" => Ok(TimestampZone::Utc),
            _ => Err(format!("unknown timestamp zone: {}", s)),
        }
    }
}

impl std::fmt::Display for TimestampZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampZone::Local => write!(f, "local"),
            TimestampZone::Utc => write!(f, "utc"),
        }
    }
}

/// Configuration for a request dumper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumperConfig {
    /// Regex for parameter names whose values are masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_filter: Option<String>,

    /// Regex for cookie names whose values are masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_filter: Option<String>,

    /// Regex for request header names whose values are masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_header_filter: Option<String>,

    /// Regex for response header names whose values are masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_header_filter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_zone: Option<TimestampZone>,

    /// Also dump response content length, cookies and status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_response: Option<bool>,
}

impl DumperConfig {
    /// Create an empty configuration (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// The configured filter for `class`, if any.
    pub fn filter(&self, class: FieldClass) -> Option<&str> {
        match class {
            FieldClass::Parameter => self.param_filter.as_deref(),
            FieldClass::Cookie => self.cookie_filter.as_deref(),
            FieldClass::RequestHeader => self.request_header_filter.as_deref(),
            FieldClass::ResponseHeader => self.response_header_filter.as_deref(),
        }
    }

    /// Set the filter for `class`. An empty pattern disables the class.
    pub fn set_filter(&mut self, class: FieldClass, pattern: impl Into<String>) {
        let slot = match class {
            FieldClass::Parameter => &mut self.param_filter,
            FieldClass::Cookie => &mut self.cookie_filter,
            FieldClass::RequestHeader => &mut self.request_header_filter,
            FieldClass::ResponseHeader => &mut self.response_header_filter,
        };
        *slot = Some(pattern.into());
    }

    /// Builder form of [`DumperConfig::set_filter`].
    pub fn with_filter(mut self, class: FieldClass, pattern: impl Into<String>) -> Self {
        self.set_filter(class, pattern);
        self
    }

    /// Effective timestamp zone.
    pub fn zone(&self) -> TimestampZone {
        self.timestamp_zone.unwrap_or_default()
    }

    /// Whether the extended response block is enabled.
    pub fn extended(&self) -> bool {
        self.extended_response.unwrap_or(false)
    }

    /// Overlay `other` on top of `self`; values present in `other` win.
    pub fn merge(&mut self, other: DumperConfig) {
        if other.param_filter.is_some() {
            self.param_filter = other.param_filter;
        }
        if other.cookie_filter.is_some() {
            self.cookie_filter = other.cookie_filter;
        }
        if other.request_header_filter.is_some() {
            self.request_header_filter = other.request_header_filter;
        }
        if other.response_header_filter.is_some() {
            self.response_header_filter = other.response_header_filter;
        }
        if other.timestamp_zone.is_some() {
            self.timestamp_zone = other.timestamp_zone;
        }
        if other.extended_response.is_some() {
            self.extended_response = other.extended_response;
        }
    }

    /// Load a configuration file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Build a configuration from the host's init parameters.
    ///
    /// Recognizes `paramFilter`, `cookieFilter`, `requestHeaderFilter`,
    /// `responseHeaderFilter`, `timestampZone` and `extendedResponse`.
    /// Other keys belong to the host and are ignored.
    pub fn from_init_params(params: &HashMap<String, String>) -> Result<Self> {
        let mut config = DumperConfig::default();

        for class in FieldClass::ALL {
            if let Some(pattern) = params.get(class.config_key()) {
                config.set_filter(class, pattern.as_str());
            }
        }

        if let Some(zone) = params.get(TIMESTAMP_ZONE_PARAMETER) {
            config.timestamp_zone = Some(parse_value(TIMESTAMP_ZONE_PARAMETER, zone)?);
        }
        if let Some(extended) = params.get(EXTENDED_RESPONSE_PARAMETER) {
            config.extended_response = Some(parse_value(EXTENDED_RESPONSE_PARAMETER, extended)?);
        }

        Ok(config)
    }

    /// Build a configuration from `REQDUMP_*` variables supplied by `env`.
    pub fn from_env_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DumperConfig::default();
        let vars = [
            (FieldClass::Parameter, ENV_PARAM_FILTER),
            (FieldClass::Cookie, ENV_COOKIE_FILTER),
            (FieldClass::RequestHeader, ENV_REQUEST_HEADER_FILTER),
            (FieldClass::ResponseHeader, ENV_RESPONSE_HEADER_FILTER),
        ];
        for (class, var) in vars {
            if let Some(pattern) = env(var) {
                config.set_filter(class, pattern);
            }
        }
        if let Some(zone) = env(ENV_TIMESTAMP_ZONE) {
            config.timestamp_zone = Some(parse_value(ENV_TIMESTAMP_ZONE, &zone)?);
        }
        Ok(config)
    }

    /// Compile every configured filter.
    ///
    /// Returns the compiled filters in [`FieldClass::ALL`] order. `None`
    /// at the outer level means "keep the default"; `Some(None)` means the
    /// class is disabled.
    pub fn compile(&self) -> Result<Vec<(FieldClass, Option<NameFilter>)>> {
        let mut compiled = Vec::new();
        for class in FieldClass::ALL {
            if let Some(pattern) = self.filter(class) {
                let filter = if pattern.is_empty() {
                    None
                } else {
                    Some(NameFilter::compile(class, pattern)?)
                };
                compiled.push((class, filter));
            }
        }
        Ok(compiled)
    }

    /// Check that every configured filter compiles.
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }

    /// Build a fresh policy: defaults overlaid with this configuration.
    pub fn build_policy(&self) -> Result<RedactionPolicy> {
        let policy = RedactionPolicy::default();
        self.apply_to(&policy)?;
        Ok(policy)
    }

    /// Apply this configuration to a live policy.
    ///
    /// All filters are compiled before any is published, so an invalid
    /// pattern leaves the policy untouched.
    pub fn apply_to(&self, policy: &RedactionPolicy) -> Result<()> {
        for (class, filter) in self.compile()? {
            policy.replace_filter(class, filter);
        }
        debug!(?policy, "redaction policy configured");
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
