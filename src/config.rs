// Configuration loader: reads the YAML settings file that names the seal
// service endpoint and the API key used to talk to it.
//
// The file is read once at startup. Any problem (missing file, bad YAML,
// empty key, unparsable URL) is an error; the caller never gets a
// half-filled `Config`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Default settings file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "sealfile.cfg";

/// Request timeout used when the settings file does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Validated settings for one run.
///
/// `Debug` redacts `api_key` so the struct can be traced safely.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    /// Registration endpoint. Requests are POSTed here as-is.
    pub seal_url: Url,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("seal_url", &self.seal_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// On-disk shape. Keys mirror the settings file exactly.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    apikey: Option<String>,
    #[serde(default)]
    baseurl: Option<String>,
    #[serde(default)]
    timeout: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(String),
    #[error("config key `{0}` is missing or empty")]
    MissingField(&'static str),
    #[error("invalid `baseurl` {0:?}: {1}")]
    InvalidUrl(String, String),
    #[error("`apikey` contains characters not allowed in an HTTP header")]
    InvalidApiKey,
}

impl Config {
    /// Read and validate the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw)?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let api_key = non_empty(raw.apikey, "apikey")?;
        let base = non_empty(raw.baseurl, "baseurl")?;
        let seal_url =
            Url::parse(&base).map_err(|e| ConfigError::InvalidUrl(base.clone(), e.to_string()))?;
        if !matches!(seal_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(
                base,
                format!("unsupported scheme `{}`", seal_url.scheme()),
            ));
        }

        Ok(Config {
            api_key,
            seal_url,
            timeout_secs: raw.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

fn non_empty(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField(key)),
    }
}
