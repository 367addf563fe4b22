use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Thresholds, deadlines, paths and defaults used by the probes
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Filesystem whose free space is checked
    pub disk_path: PathBuf,
    /// Minimum free space in GiB
    pub min_free_disk_gib: f64,
    /// Kernel memory table
    pub meminfo_path: PathBuf,
    /// Minimum total memory in GiB
    pub min_total_memory_gib: f64,
    /// Subnet checked when `NETUID` is unset
    pub default_netuid: String,
    pub default_wallet_name: String,
    pub default_wallet_hotkey: String,
    /// Registration CLI executable
    pub btcli_program: String,
    /// S3-compatible storage CLI executable
    pub aws_program: String,
    pub registration_timeout_secs: u64,
    pub storage_timeout_secs: u64,
    pub gpu_timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            disk_path: PathBuf::from("/"),
            min_free_disk_gib: 50.0,
            meminfo_path: PathBuf::from(hostinfo::PROC_MEMINFO),
            min_total_memory_gib: 200.0,
            default_netuid: "3".to_string(),
            default_wallet_name: "default".to_string(),
            default_wallet_hotkey: "miner".to_string(),
            btcli_program: "btcli".to_string(),
            aws_program: "aws".to_string(),
            registration_timeout_secs: 30,
            storage_timeout_secs: 10,
            gpu_timeout_secs: 10,
        }
    }
}

impl HealthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a TOML file and validate the result
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        config
            .validate()
            .map_err(|message| ConfigError::Invalid { message })?;
        Ok(config)
    }

    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    pub fn with_min_free_disk_gib(mut self, gib: f64) -> Self {
        self.min_free_disk_gib = gib;
        self
    }

    pub fn with_meminfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo_path = path.into();
        self
    }

    pub fn with_min_total_memory_gib(mut self, gib: f64) -> Self {
        self.min_total_memory_gib = gib;
        self
    }

    pub fn with_default_netuid(mut self, netuid: impl Into<String>) -> Self {
        self.default_netuid = netuid.into();
        self
    }

    pub fn registration_timeout(&self) -> Duration {
        Duration::from_secs(self.registration_timeout_secs)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    pub fn gpu_timeout(&self) -> Duration {
        Duration::from_secs(self.gpu_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_free_disk_gib.is_finite() && self.min_free_disk_gib > 0.0) {
            return Err("min_free_disk_gib must be a positive number".to_string());
        }

        if !(self.min_total_memory_gib.is_finite() && self.min_total_memory_gib > 0.0) {
            return Err("min_total_memory_gib must be a positive number".to_string());
        }

        if self.disk_path.as_os_str().is_empty() {
            return Err("disk_path cannot be empty".to_string());
        }

        if self.meminfo_path.as_os_str().is_empty() {
            return Err("meminfo_path cannot be empty".to_string());
        }

        if self.default_netuid.trim().is_empty() {
            return Err("default_netuid cannot be empty".to_string());
        }

        if self.btcli_program.is_empty() || self.aws_program.is_empty() {
            return Err("Tool programs cannot be empty".to_string());
        }

        if self.registration_timeout_secs == 0
            || self.storage_timeout_secs == 0
            || self.gpu_timeout_secs == 0
        {
            return Err("Timeouts must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Immutable snapshot of environment variables taken at start of run
///
/// Probes read configuration from the snapshot instead of the process
/// environment, so tests can hand them synthetic values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment; non-UTF-8 entries are skipped
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    /// Raw value, possibly empty
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value if set and non-empty
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Non-empty value or `default`
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.non_empty(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Values include tokens and keys; only names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.vars.keys()).finish()
    }
}
