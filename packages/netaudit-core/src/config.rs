//! Runtime configuration.
//!
//! Every setting is resolved with the same priority:
//! 1. Environment variable (a `.env` file in the working directory counts)
//! 2. Config file (`~/.config/netaudit/config.toml`)
//! 3. Built-in default

use crate::dropdowns::default_dropdowns;
use crate::requirements::{default_network_os_rules, NetworkOsRule, RequirementTable, Requirements};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Default Infrahub base URL
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default NetBox base URL
const DEFAULT_NETBOX_URL: &str = "https://localhost";

/// Default schema namespace prefixing GraphQL kinds
const DEFAULT_SCHEMA_NAMESPACE: &str = "Jeylan";

/// Request timeout for API calls, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default directory for JSON reports (relative to the working directory)
const DEFAULT_REPORTS_DIR: &str = "reports";

const ENV_API_URL: &str = "INFRAHUB_API_URL";
const ENV_API_TOKEN: &str = "INFRAHUB_API_TOKEN";
const ENV_API_TOKEN_FALLBACK: &str = "INFRAHUB_TOKEN";
const ENV_VERIFY_SSL: &str = "INFRAHUB_VERIFY_SSL";
const ENV_REPORTS_DIR: &str = "NETAUDIT_REPORTS_DIR";
const ENV_NETBOX_URL: &str = "NETBOX_URL";
const ENV_NETBOX_TOKEN: &str = "NETBOX_TOKEN";

/// Configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    infrahub: Option<InfrahubSection>,
    netbox: Option<NetboxSection>,
    reports: Option<ReportsSection>,
    /// Requirement table overrides keyed by type name (`InfraDevice`, ...)
    #[serde(default)]
    requirements: BTreeMap<String, RequirementTable>,
    /// Replaces the expected network OS table when present
    network_os: Option<Vec<NetworkOsRule>>,
    /// Replaces the sample SNMP dropdowns when present
    dropdowns: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize, Default)]
struct InfrahubSection {
    api_url: Option<String>,
    api_token: Option<String>,
    verify_ssl: Option<bool>,
    timeout_secs: Option<u64>,
    schema_namespace: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct NetboxSection {
    url: Option<String>,
    token: Option<String>,
    verify_ssl: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ReportsSection {
    dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Where the API URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Using default hardcoded values
    Default,
    /// Loaded from environment variable
    Environment,
    /// Loaded from config file
    ConfigFile,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// NetBox REST settings
#[derive(Debug, Clone)]
pub struct NetboxConfig {
    pub url: String,
    pub token: Option<String>,
    pub verify_ssl: bool,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Base URL of the Infrahub instance
    pub api_url: String,
    /// `<api_url>/graphql`
    pub graphql_endpoint: String,
    pub api_token: Option<String>,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
    pub reports_dir: PathBuf,
    /// Prefix of GraphQL kinds, e.g. `Jeylan` for `JeylanDevice`
    pub schema_namespace: String,
    pub requirements: Requirements,
    pub expected_network_os: Vec<NetworkOsRule>,
    pub dropdowns: BTreeMap<String, Vec<String>>,
    pub netbox: NetboxConfig,
    /// Source of the API URL (for display)
    pub source: ConfigSource,
}

fn clean_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    (!url.is_empty()).then(|| url.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl AuditConfig {
    /// Resolve configuration from an environment lookup and an optional
    /// parsed config file.
    pub fn resolve<F>(env: F, file: Option<ConfigFile>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let infrahub = file.infrahub.unwrap_or_default();
        let netbox = file.netbox.unwrap_or_default();

        let (api_url, source) = if let Some(url) = env(ENV_API_URL).as_deref().and_then(clean_url) {
            tracing::info!("Using Infrahub URL from environment variable: {}", url);
            (url, ConfigSource::Environment)
        } else if let Some(url) = infrahub.api_url.as_deref().and_then(clean_url) {
            tracing::info!("Using Infrahub URL from config file: {}", url);
            (url, ConfigSource::ConfigFile)
        } else {
            tracing::debug!("Using default Infrahub URL: {}", DEFAULT_API_URL);
            (DEFAULT_API_URL.to_string(), ConfigSource::Default)
        };

        let api_token = env(ENV_API_TOKEN)
            .and_then(non_empty)
            .or_else(|| env(ENV_API_TOKEN_FALLBACK).and_then(non_empty))
            .or_else(|| infrahub.api_token.and_then(non_empty));

        let verify_ssl = env(ENV_VERIFY_SSL)
            .map(|v| parse_bool(&v))
            .or(infrahub.verify_ssl)
            .unwrap_or(false);

        let reports_dir = env(ENV_REPORTS_DIR)
            .and_then(non_empty)
            .map(PathBuf::from)
            .or(file.reports.and_then(|r| r.dir))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR));

        let mut requirements = Requirements::default();
        requirements.apply_overrides(&file.requirements);

        let netbox = NetboxConfig {
            url: env(ENV_NETBOX_URL)
                .as_deref()
                .and_then(clean_url)
                .or_else(|| netbox.url.as_deref().and_then(clean_url))
                .unwrap_or_else(|| DEFAULT_NETBOX_URL.to_string()),
            token: env(ENV_NETBOX_TOKEN)
                .and_then(non_empty)
                .or_else(|| netbox.token.and_then(non_empty)),
            verify_ssl: netbox.verify_ssl.unwrap_or(false),
        };

        Self {
            graphql_endpoint: format!("{}/graphql", api_url),
            api_url,
            api_token,
            verify_ssl,
            timeout_secs: infrahub.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            reports_dir,
            schema_namespace: infrahub
                .schema_namespace
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_SCHEMA_NAMESPACE.to_string()),
            requirements,
            expected_network_os: file.network_os.unwrap_or_else(default_network_os_rules),
            dropdowns: file.dropdowns.unwrap_or_else(default_dropdowns),
            netbox,
            source,
        }
    }
}

/// Get the path to the configuration file
fn get_config_file_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("netaudit").join("config.toml"))
}

/// Load configuration from the config file
fn load_config_file() -> Option<ConfigFile> {
    let path = get_config_file_path()?;

    if !path.exists() {
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match ConfigFile::parse(&content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {:?}: {}", path, e);
            None
        }
    }
}

/// Load configuration from `.env`, the process environment and the config file
pub fn load_config() -> AuditConfig {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    AuditConfig::resolve(|key| std::env::var(key).ok(), load_config_file())
}

/// Get the path to the config file for documentation purposes
pub fn get_config_file_path_string() -> String {
    get_config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/netaudit/config.toml".to_string())
}

/// Generate example config file content
pub fn generate_example_config() -> String {
    r#"# netaudit configuration
# Place this file at: ~/.config/netaudit/config.toml

[infrahub]
# api_url = "http://infrahub.example.net:8000"
# api_token = "..."            # prefer INFRAHUB_API_TOKEN
# verify_ssl = true
# timeout_secs = 30
# schema_namespace = "Jeylan"  # queries JeylanDevice, JeylanSite, ...

[netbox]
# url = "https://netbox.example.net"
# token = "..."                # prefer NETBOX_TOKEN

[reports]
# dir = "/var/lib/netaudit/reports"

# Override the fields required on an object type
# [requirements.InfraDevice]
# critical = ["name", "primary_address"]
# important = ["site", "platform", "role"]
# optional = ["type", "interfaces", "description"]

# Replace the expected ansible_network_os table
# [[network_os]]
# network_os = "cisco_ios"
# keywords = ["cisco", "ios", "catalyst"]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::ObjectKind;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AuditConfig::resolve(env_from(&[]), None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.graphql_endpoint, "http://localhost:8000/graphql");
        assert_eq!(config.source, ConfigSource::Default);
        assert_eq!(config.api_token, None);
        assert!(!config.verify_ssl);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.schema_namespace, "Jeylan");
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.expected_network_os.len(), 8);
    }

    #[test]
    fn test_environment_beats_file() {
        let file = ConfigFile::parse(
            r#"
            [infrahub]
            api_url = "http://file.example:8000/"
            api_token = "file-token"
            verify_ssl = false
            "#,
        )
        .unwrap();
        let env = env_from(&[
            (ENV_API_URL, "http://env.example:8080/"),
            (ENV_API_TOKEN_FALLBACK, "legacy-token"),
            (ENV_VERIFY_SSL, "TRUE"),
        ]);
        let config = AuditConfig::resolve(env, Some(file));

        assert_eq!(config.api_url, "http://env.example:8080");
        assert_eq!(config.graphql_endpoint, "http://env.example:8080/graphql");
        assert_eq!(config.source, ConfigSource::Environment);
        assert_eq!(config.api_token.as_deref(), Some("legacy-token"));
        assert!(config.verify_ssl);
    }

    #[test]
    fn test_file_values_and_overrides() {
        let file = ConfigFile::parse(
            r#"
            [infrahub]
            api_url = "http://file.example:8000"
            api_token = "file-token"
            timeout_secs = 5
            schema_namespace = "Infra"

            [reports]
            dir = "/tmp/audits"

            [requirements.InfraSite]
            critical = ["name", "location"]

            [[network_os]]
            network_os = "vyos"
            keywords = ["vyos"]

            [dropdowns]
            snmp_community = ["public"]
            "#,
        )
        .unwrap();
        let config = AuditConfig::resolve(env_from(&[(ENV_API_URL, "  ")]), Some(file));

        assert_eq!(config.source, ConfigSource::ConfigFile);
        assert_eq!(config.api_token.as_deref(), Some("file-token"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.schema_namespace, "Infra");
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/audits"));
        assert_eq!(
            config.requirements.table(ObjectKind::Site).critical,
            vec!["name", "location"]
        );
        assert_eq!(config.expected_network_os.len(), 1);
        assert_eq!(config.dropdowns.len(), 1);
    }

    #[test]
    fn test_example_config_parses() {
        assert!(ConfigFile::parse(&generate_example_config()).is_ok());
    }
}
