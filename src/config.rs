//! # Service Configuration
//!
//! Settings the hosting process hands to the orchestrator:
//!
//! - [`ServiceInfo`] - identity of the service (name, version, build).
//! - [`ServiceArgs`] - command line flags, each with an environment variable fallback.
//! - [`Settings`] - free-form `key=value` settings read by components during configuration.
//! - [`OrchestratorConfig`] - runtime knobs for [`Orchestrator`](crate::lifecycle::Orchestrator).
//!
//! ## Settings lookup
//!
//! A setting is looked up in the explicit `--set key=value` pairs first, then in the
//! environment under the upper-cased key with `.` and `-` replaced by `_`:
//!
//! ```text
//! --set status-listener.addr=0.0.0.0:9000   or   STATUS_LISTENER_ADDR=0.0.0.0:9000
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::framework::ComponentError;

/// Identity of the hosting service, attached to every log line of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub build: String,
}

impl ServiceInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        build: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            build: build.into(),
        }
    }

    /// Renders the identity as a single JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human readable lines.
    Human,
    /// One JSON object per line.
    #[default]
    Json,
}

/// Command line flags of a service built on the orchestrator.
#[derive(Debug, Clone, Parser)]
#[command(
    about = "Runs a set of interdependent service components",
    disable_version_flag = true
)]
pub struct ServiceArgs {
    /// Print the service identity as JSON and exit.
    #[arg(long, short = 'V')]
    pub version: bool,

    /// Enable debug logging.
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Log output format.
    #[arg(long = "log-format", env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Component setting as `key=value` (repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

/// Key/value settings visible to components during configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
    use_env: bool,
}

impl Settings {
    /// Settings with environment fallback enabled.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            use_env: true,
        }
    }

    /// Settings that never consult the environment.
    pub fn isolated() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Looks up `key`, falling back to the environment when enabled.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.get(key) {
            return Some(value.clone());
        }
        if self.use_env {
            return std::env::var(env_key(key)).ok();
        }
        None
    }

    /// Like [`get`](Self::get) but fails with [`ComponentError::MissingSetting`].
    pub fn require(&self, key: &str) -> Result<String, ComponentError> {
        self.get(key)
            .ok_or_else(|| ComponentError::MissingSetting(key.to_string()))
    }

    /// Parses `key` into `T`; `Ok(None)` when unset.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, ComponentError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| ComponentError::InvalidSetting {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Settings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Settings::new();
        for (k, v) in iter {
            settings.insert(k, v);
        }
        settings
    }
}

/// Environment variable consulted for a setting key.
pub fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Runtime configuration of the orchestrator.
///
/// ## Field semantics
/// - `debug`: exposed to components through the configure context
/// - `settings`: component settings
/// - `handle_os_signals`: listen for SIGINT/SIGTERM/SIGQUIT and request shutdown on receipt
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub debug: bool,
    pub settings: Settings,
    pub handle_os_signals: bool,
}

impl Default for OrchestratorConfig {
    /// Default configuration:
    ///
    /// - `debug = false`
    /// - `settings` empty, environment fallback on
    /// - `handle_os_signals = true`
    fn default() -> Self {
        Self {
            debug: false,
            settings: Settings::new(),
            handle_os_signals: true,
        }
    }
}

impl From<&ServiceArgs> for OrchestratorConfig {
    fn from(args: &ServiceArgs) -> Self {
        Self {
            debug: args.debug,
            settings: args.settings.iter().cloned().collect(),
            handle_os_signals: true,
        }
    }
}
