//! Redirector configuration loaded from the environment

use crate::ConfigError;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TABLE_NAME: &str = "redirection";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(3000);

/// Which store backend serves lookups
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process tables, optionally seeded from a mappings file
    Memory,
    /// Kubernetes ConfigMaps, one per table
    ConfigMap,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "configmap" => Ok(StoreBackend::ConfigMap),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Redirector configuration
#[derive(Clone, Debug)]
pub struct RedirectConfig {
    /// Table (collection) queried for every lookup
    pub table_name: String,
    /// Upper bound on a single store lookup
    pub lookup_timeout: Duration,
    pub bind_address: SocketAddr,
    /// Listener for /healthz and /metrics
    pub admin_address: SocketAddr,
    pub store: StoreBackend,
    /// YAML file seeding the memory store
    pub mappings_file: Option<PathBuf>,
    /// Namespace holding the ConfigMap tables
    pub namespace: String,
    pub log_format: LogFormat,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            admin_address: SocketAddr::from(([0, 0, 0, 0], 9090)),
            store: StoreBackend::Memory,
            mappings_file: None,
            namespace: "default".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl RedirectConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Unset or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let table_name = get("REDIRECT_TABLE")
            .or_else(|| get("DYNAMODB_TABLE"))
            .unwrap_or(defaults.table_name);

        let lookup_timeout = match get("REDIRECT_LOOKUP_TIMEOUT_MS") {
            Some(raw) => {
                let ms: u64 = parse("REDIRECT_LOOKUP_TIMEOUT_MS", &raw)?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        key: "REDIRECT_LOOKUP_TIMEOUT_MS",
                        reason: "timeout must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
            None => defaults.lookup_timeout,
        };

        Ok(Self {
            table_name,
            lookup_timeout,
            bind_address: get_parsed(&get, "REDIRECT_BIND_ADDRESS")?
                .unwrap_or(defaults.bind_address),
            admin_address: get_parsed(&get, "REDIRECT_ADMIN_ADDRESS")?
                .unwrap_or(defaults.admin_address),
            store: get_parsed(&get, "REDIRECT_STORE")?.unwrap_or(defaults.store),
            mappings_file: get("REDIRECT_MAPPINGS_FILE").map(PathBuf::from),
            namespace: get("REDIRECT_NAMESPACE").unwrap_or(defaults.namespace),
            log_format: get_parsed(&get, "REDIRECT_LOG_FORMAT")?.unwrap_or(defaults.log_format),
        })
    }
}

fn get_parsed<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key).map(|raw| parse(key, &raw)).transpose()
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: format!("'{}': {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RedirectConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RedirectConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.table_name, "redirection");
        assert_eq!(config.lookup_timeout, Duration::from_millis(3000));
        assert_eq!(config.bind_address, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.admin_address, "0.0.0.0:9090".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.mappings_file, None);
        assert_eq!(config.namespace, "default");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_table_name_sources() {
        let config = load(&[("REDIRECT_TABLE", "links")]).unwrap();
        assert_eq!(config.table_name, "links");

        let config = load(&[("DYNAMODB_TABLE", "legacy")]).unwrap();
        assert_eq!(config.table_name, "legacy");

        let config = load(&[("REDIRECT_TABLE", "links"), ("DYNAMODB_TABLE", "legacy")]).unwrap();
        assert_eq!(config.table_name, "links");

        let config = load(&[("REDIRECT_TABLE", "  ")]).unwrap();
        assert_eq!(config.table_name, "redirection");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REDIRECT_LOOKUP_TIMEOUT_MS", "250"),
            ("REDIRECT_BIND_ADDRESS", "127.0.0.1:3000"),
            ("REDIRECT_STORE", "ConfigMap"),
            ("REDIRECT_MAPPINGS_FILE", "/etc/redirects.yaml"),
            ("REDIRECT_NAMESPACE", "edge"),
            ("REDIRECT_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.lookup_timeout, Duration::from_millis(250));
        assert_eq!(config.bind_address, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store, StoreBackend::ConfigMap);
        assert_eq!(config.mappings_file, Some(PathBuf::from("/etc/redirects.yaml")));
        assert_eq!(config.namespace, "edge");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("REDIRECT_LOOKUP_TIMEOUT_MS", "soon")]),
            Err(ConfigError::Invalid { key: "REDIRECT_LOOKUP_TIMEOUT_MS", .. })
        ));
        assert!(matches!(
            load(&[("REDIRECT_LOOKUP_TIMEOUT_MS", "0")]),
            Err(ConfigError::Invalid { key: "REDIRECT_LOOKUP_TIMEOUT_MS", .. })
        ));
        assert!(matches!(
            load(&[("REDIRECT_STORE", "dynamodb")]),
            Err(ConfigError::Invalid { key: "REDIRECT_STORE", .. })
        ));
        assert!(matches!(
            load(&[("REDIRECT_BIND_ADDRESS", "localhost")]),
            Err(ConfigError::Invalid { key: "REDIRECT_BIND_ADDRESS", .. })
        ));
    }
}
