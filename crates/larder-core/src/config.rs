//! Configuration types for Larder components.
//!
//! Values are layered: built-in defaults, then the optional
//! `larder/config.toml` file, then CLI flags and environment variables
//! (applied by the binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;

/// Upper bound for `max_retries` read from the config file.
pub const MAX_HTTP_RETRIES: u32 = 10;

/// Default Elasticsearch endpoint.
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";

/// Database connection pool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// HTTP client configuration for search cluster calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Search cluster location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LarderConfig {
    pub db: DbConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    search: SearchSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSection {
    max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchSection {
    url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}

impl ConfigFile {
    fn apply(self, mut config: LarderConfig) -> LarderConfig {
        if let Some(max) = self.database.max_connections {
            config.db.max_connections = max;
        }
        if let Some(url) = self.search.url {
            config.search.url = url;
        }
        if let Some(secs) = self.search.timeout_secs {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.search.max_retries {
            config.http.max_retries = retries.min(MAX_HTTP_RETRIES);
        }
        if let Some(ms) = self.search.retry_base_delay_ms {
            config.http.retry_base_delay = Duration::from_millis(ms);
        }
        config
    }
}

/// Returns the default config file location (`<config dir>/larder/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("larder").join("config.toml"))
}

/// Loads configuration from `path`, or from [`default_config_path`] when
/// `path` is `None`.
///
/// A missing file yields the defaults. A file that exists but cannot be read
/// or parsed is an error.
pub fn load_config(path: Option<&Path>) -> Result<LarderConfig, AppError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(LarderConfig::default()),
        },
    };

    if !path.exists() {
        return Ok(LarderConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
    parse_config(&contents)
        .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))
}

fn parse_config(contents: &str) -> Result<LarderConfig, toml::de::Error> {
    let file: ConfigFile = toml::from_str(contents)?;
    Ok(file.apply(LarderConfig::default()))
}
