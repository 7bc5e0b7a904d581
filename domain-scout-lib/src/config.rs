//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and merging
//! configurations with proper precedence rules.

use crate::error::DomainScoutError;
use crate::protocols::registry::{RegistryEntry, TldRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// This represents the structure of configuration files that users can create
/// to set default values and add or replace registry entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Per-TLD registry overrides (`[registry.<tld>]`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<BTreeMap<String, RegistryEntry>>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Default TLD list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlds: Option<Vec<String>>,

    /// Default timeout (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Milliseconds between request starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,

    /// Default detailed info setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_info: Option<bool>,

    /// Whether to write the CSV export file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<bool>,
}

impl FileConfig {
    /// Built-in registry with this file's `[registry]` sections applied.
    pub fn build_registry(&self) -> Result<TldRegistry, DomainScoutError> {
        match &self.registry {
            Some(overrides) => TldRegistry::builtin().with_overrides(overrides),
            None => Ok(TldRegistry::builtin()),
        }
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which files were loaded
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if parsing or validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainScoutError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainScoutError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainScoutError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig =
            toml::from_str(&content).map_err(|e| DomainScoutError::ConfigError {
                message: format!(
                    "Failed to parse TOML configuration '{}': {}",
                    path.display(),
                    e
                ),
            })?;

        self.validate_config(&config)?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config < `~/.domain-scout.toml` < `./domain-scout.toml`. A file
    /// that exists but fails to parse or validate is an error.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainScoutError> {
        let home = env::var_os("HOME").map(PathBuf::from);
        let xdg = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        self.load_tiers(discovery_tiers(home.as_deref(), xdg.as_deref()))
    }

    /// Load an explicit file if one is given, otherwise run discovery.
    pub fn load(&self, explicit: Option<&Path>) -> Result<FileConfig, DomainScoutError> {
        match explicit {
            Some(path) => self.load_file(path),
            None => self.discover_and_load(),
        }
    }

    /// Merge the first existing file of each tier, later tiers winning.
    fn load_tiers(&self, tiers: Vec<Vec<PathBuf>>) -> Result<FileConfig, DomainScoutError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let found = tiers
            .into_iter()
            .filter_map(|tier| tier.into_iter().find(|path| path.exists()));

        for path in found {
            let config = self.load_file(&path)?;
            merged_config = self.merge_configs(merged_config, config);
            loaded_files.push(path);
        }

        if self.verbose && loaded_files.len() > 1 {
            for (i, path) in loaded_files.iter().enumerate() {
                let precedence = if i == loaded_files.len() - 1 {
                    "highest"
                } else {
                    "overridden"
                };
                tracing::info!(path = %path.display(), precedence, "config file merged");
            }
        }

        Ok(merged_config)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.concurrency.is_some() {
                        lower_defaults.concurrency = higher_defaults.concurrency;
                    }
                    if higher_defaults.tlds.is_some() {
                        lower_defaults.tlds = higher_defaults.tlds;
                    }
                    if higher_defaults.timeout.is_some() {
                        lower_defaults.timeout = higher_defaults.timeout;
                    }
                    if higher_defaults.delay_ms.is_some() {
                        lower_defaults.delay_ms = higher_defaults.delay_ms;
                    }
                    if higher_defaults.detailed_info.is_some() {
                        lower_defaults.detailed_info = higher_defaults.detailed_info;
                    }
                    if higher_defaults.export.is_some() {
                        lower_defaults.export = higher_defaults.export;
                    }
                    Some(lower_defaults)
                }
                (None, Some(higher_defaults)) => Some(higher_defaults),
                (Some(lower_defaults), None) => Some(lower_defaults),
                (None, None) => None,
            },
            registry: match (lower.registry, higher.registry) {
                (Some(mut lower_registry), Some(higher_registry)) => {
                    // Whole entries are replaced, never merged field by field
                    lower_registry.extend(higher_registry);
                    Some(lower_registry)
                }
                (None, Some(higher_registry)) => Some(higher_registry),
                (Some(lower_registry), None) => Some(lower_registry),
                (None, None) => None,
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainScoutError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(DomainScoutError::ConfigError {
                        message: "Concurrency must be between 1 and 100".to_string(),
                    });
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(DomainScoutError::ConfigError {
                        message: format!(
                            "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                            timeout_str
                        ),
                    });
                }
            }

            if let Some(tlds) = &defaults.tlds {
                if tlds.is_empty() {
                    return Err(DomainScoutError::config("Default TLD list cannot be empty"));
                }
                for tld in tlds {
                    let tld = tld.trim().trim_start_matches('.');
                    if tld.is_empty() || tld.contains('.') || tld.contains(' ') {
                        return Err(DomainScoutError::ConfigError {
                            message: format!("Invalid TLD '{}' in defaults", tld),
                        });
                    }
                }
            }
        }

        if let Some(registry) = &config.registry {
            for (tld, entry) in registry {
                entry.to_descriptor(tld)?;
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DS_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub tlds: Option<Vec<String>>,
    pub timeout: Option<String>,
    pub delay_ms: Option<u64>,
    pub config: Option<String>,
}

/// Load configuration from `DS_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] but reads variables through `lookup`.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("DS_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if concurrency > 0 && concurrency <= 100 => {
                tracing::debug!(concurrency, "using DS_CONCURRENCY");
                env_config.concurrency = Some(concurrency);
            }
            _ => tracing::warn!(value = %val, "invalid DS_CONCURRENCY, must be 1-100"),
        }
    }

    if let Some(tld_str) = lookup("DS_TLD") {
        let tlds: Vec<String> = tld_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !tlds.is_empty() {
            tracing::debug!(tlds = %tld_str, "using DS_TLD");
            env_config.tlds = Some(tlds);
        }
    }

    if let Some(timeout_str) = lookup("DS_TIMEOUT") {
        if parse_timeout_string(&timeout_str).is_some() {
            tracing::debug!(timeout = %timeout_str, "using DS_TIMEOUT");
            env_config.timeout = Some(timeout_str);
        } else {
            tracing::warn!(
                value = %timeout_str,
                "invalid DS_TIMEOUT, use format like '5s', '30s', '2m'"
            );
        }
    }

    if let Some(val) = lookup("DS_DELAY_MS") {
        match val.trim().parse::<u64>() {
            Ok(delay) => {
                tracing::debug!(delay_ms = delay, "using DS_DELAY_MS");
                env_config.delay_ms = Some(delay);
            }
            Err(_) => tracing::warn!(value = %val, "invalid DS_DELAY_MS, expected milliseconds"),
        }
    }

    if let Some(config_path) = lookup("DS_CONFIG") {
        if !config_path.trim().is_empty() {
            tracing::debug!(path = %config_path, "using DS_CONFIG");
            env_config.config = Some(config_path);
        }
    }

    env_config
}

/// Config file candidates, lowest precedence first: XDG, home, then the
/// working directory. `XDG_CONFIG_HOME` falls back to `~/.config`.
fn discovery_tiers(home: Option<&Path>, xdg_config: Option<&Path>) -> Vec<Vec<PathBuf>> {
    let xdg_dir = xdg_config
        .map(Path::to_path_buf)
        .or_else(|| home.map(|home| home.join(".config")));

    let mut tiers = Vec::new();
    if let Some(dir) = xdg_dir {
        tiers.push(vec![dir.join("domain-scout").join("config.toml")]);
    }
    if let Some(home) = home {
        tiers.push(vec![
            home.join(".domain-scout.toml"),
            home.join("domain-scout.toml"),
        ]);
    }
    tiers.push(vec![
        PathBuf::from("./domain-scout.toml"),
        PathBuf::from("./.domain-scout.toml"),
    ]);
    tiers
}

/// Parse a timeout string like "5s", "30s", "2m" into a duration.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (seconds > 0).then(|| Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Protocol;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("8"), Some(Duration::from_secs(8)));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string("307445734561825861m"), None);
        assert_eq!(
            parse_timeout_string("307445734561825860m"),
            Some(Duration::from_secs(307445734561825860 * 60))
        );
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
concurrency = 25
tlds = ["com", "io"]
timeout = "5s"
delay_ms = 400
export = false

[registry.xyz]
rdap = "https://rdap.example.net/xyz"

[registry.me]
whois = "whois.example.net"
port = 4343
available_patterns = ["is free"]
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.clone().unwrap();
        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.tlds, Some(vec!["com".to_string(), "io".to_string()]));
        assert_eq!(defaults.delay_ms, Some(400));
        assert_eq!(defaults.export, Some(false));

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.resolve("xyz").unwrap().protocol(), Protocol::Rdap);
        let me = registry.resolve("me").unwrap();
        assert_eq!(me.protocol(), Protocol::Whois);
        assert_eq!(me.endpoint_display(), "whois.example.net:4343");
        // Built-in entries survive
        assert!(registry.contains("com"));
    }

    #[test]
    fn test_invalid_concurrency() {
        let temp_file = write_config("[defaults]\nconcurrency = 0\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let temp_file = write_config("[defaults]\ntimeout = \"soon\"\n");
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, DomainScoutError::ConfigError { .. }));
    }

    #[test]
    fn test_registry_entry_with_both_protocols_rejected() {
        let temp_file = write_config(
            r#"
[registry.io]
rdap = "https://rdap.example.net/io"
whois = "whois.example.net"
"#,
        );
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let temp_file = write_config("[defaults\nconcurrency = ");
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, DomainScoutError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let manager = ConfigManager::new(false);
        let err = manager
            .load(Some(Path::new("/nonexistent/domain-scout.toml")))
            .unwrap_err();
        assert!(matches!(err, DomainScoutError::FileError { .. }));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                tlds: Some(vec!["com".to_string()]),
                export: Some(true),
                ..Default::default()
            }),
            registry: Some(BTreeMap::from([(
                "xyz".to_string(),
                RegistryEntry {
                    rdap: Some("https://lower.example/rdap".to_string()),
                    ..Default::default()
                },
            )])),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(25),
                export: Some(false),
                ..Default::default()
            }),
            registry: Some(BTreeMap::from([(
                "xyz".to_string(),
                RegistryEntry {
                    whois: Some("whois.higher.example".to_string()),
                    ..Default::default()
                },
            )])),
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.tlds, Some(vec!["com".to_string()]));
        assert_eq!(defaults.export, Some(false));

        let entry = &merged.registry.unwrap()["xyz"];
        assert!(entry.rdap.is_none());
        assert_eq!(entry.whois.as_deref(), Some("whois.higher.example"));
    }

    #[test]
    fn test_discovery_tiers_order() {
        let home = Path::new("/home/scout");
        let tiers = discovery_tiers(Some(home), None);

        assert_eq!(tiers.len(), 3);
        assert_eq!(
            tiers[0],
            vec![PathBuf::from("/home/scout/.config/domain-scout/config.toml")]
        );
        assert_eq!(tiers[1][0], PathBuf::from("/home/scout/.domain-scout.toml"));
        assert_eq!(tiers[2][0], PathBuf::from("./domain-scout.toml"));

        let xdg = discovery_tiers(Some(home), Some(Path::new("/xdg")));
        assert_eq!(xdg[0], vec![PathBuf::from("/xdg/domain-scout/config.toml")]);

        // Without HOME only the XDG and local tiers remain
        assert_eq!(discovery_tiers(None, Some(Path::new("/xdg"))).len(), 2);
        assert_eq!(discovery_tiers(None, None).len(), 1);
    }

    #[test]
    fn test_load_tiers_first_match_per_tier_later_wins() {
        let dir = tempfile::tempdir().unwrap();
        let xdg = dir.path().join("config.toml");
        let hidden = dir.path().join(".domain-scout.toml");
        let plain = dir.path().join("domain-scout.toml");
        fs::write(&xdg, "[defaults]\nconcurrency = 5\ntlds = [\"com\"]\n").unwrap();
        fs::write(&hidden, "[defaults]\nconcurrency = 20\n").unwrap();
        fs::write(&plain, "[defaults]\nconcurrency = 99\n").unwrap();

        let manager = ConfigManager::new(false);
        let tiers = vec![
            vec![xdg],
            vec![dir.path().join("missing.toml"), hidden, plain],
        ];
        let defaults = manager.load_tiers(tiers).unwrap().defaults.unwrap();

        // Second tier stops at its first existing file
        assert_eq!(defaults.concurrency, Some(20));
        assert_eq!(defaults.tlds, Some(vec!["com".to_string()]));
    }

    #[test]
    fn test_env_config_reads_ds_vars() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DS_CONCURRENCY", "20"),
            ("DS_TLD", "com, io ,,ai"),
            ("DS_TIMEOUT", "3s"),
            ("DS_DELAY_MS", "250"),
            ("DS_CONFIG", "/tmp/scout.toml"),
        ]);

        let env_config = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(env_config.concurrency, Some(20));
        assert_eq!(
            env_config.tlds,
            Some(vec!["com".to_string(), "io".to_string(), "ai".to_string()])
        );
        assert_eq!(env_config.timeout.as_deref(), Some("3s"));
        assert_eq!(env_config.delay_ms, Some(250));
        assert_eq!(env_config.config.as_deref(), Some("/tmp/scout.toml"));
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DS_CONCURRENCY", "500"),
            ("DS_TIMEOUT", "later"),
            ("DS_DELAY_MS", "-1"),
            ("DS_TLD", " , "),
        ]);

        let env_config = load_env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config, EnvConfig::default());
    }
}
