//! NetBox REST export, inventory dump and lookup of SNMP custom fields.

use crate::config::NetboxConfig;
use crate::error::ApiError;
use crate::report::save_report;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEVICES_PATH: &str = "/api/dcim/devices/";
const INTERFACES_PATH: &str = "/api/dcim/interfaces/";
const IP_ADDRESSES_PATH: &str = "/api/ipam/ip-addresses/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NetboxClient {
    http: reqwest::Client,
    base_url: String,
}

impl NetboxClient {
    pub fn new(config: &NetboxConfig) -> Result<Self, ApiError> {
        let token = config.token.as_deref().ok_or(ApiError::MissingToken("NETBOX_TOKEN"))?;

        let mut headers = reqwest::header::HeaderMap::new();
        let auth = reqwest::header::HeaderValue::from_str(&format!("Token {}", token))
            .map_err(|e| ApiError::Config(format!("NETBOX_TOKEN is not a valid header value: {}", e)))?;
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `<url><path>` and decode the JSON body
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .inspect_err(|e| tracing::error!("NetBox request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("NetBox returned {}: {}", status, body);
            return Err(ApiError::Status { status, body });
        }

        resp.json().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn devices(&self) -> Result<Value, ApiError> {
        self.get(DEVICES_PATH).await
    }

    pub async fn interfaces(&self) -> Result<Value, ApiError> {
        self.get(INTERFACES_PATH).await
    }

    pub async fn ip_addresses(&self) -> Result<Value, ApiError> {
        self.get(IP_ADDRESSES_PATH).await
    }

    /// Fetch devices, interfaces and IP addresses, one after another
    pub async fn fetch_inventory(&self) -> Result<InventoryDump, ApiError> {
        Ok(InventoryDump {
            devices: self.devices().await?,
            interfaces: self.interfaces().await?,
            ip_addresses: self.ip_addresses().await?,
        })
    }
}

/// Raw responses of the three inventory collections
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryDump {
    pub devices: Value,
    pub interfaces: Value,
    pub ip_addresses: Value,
}

impl InventoryDump {
    /// Write `devices.json`, `ifaces.json` and `ips.json` under `dir`
    pub fn save(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files = [
            ("devices.json", &self.devices),
            ("ifaces.json", &self.interfaces),
            ("ips.json", &self.ip_addresses),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (file, value) in files {
            let path = dir.join(file);
            save_report(value, &path)?;
            written.push(path);
        }
        tracing::info!("Saved NetBox inventory to {}", dir.display());
        Ok(written)
    }

    /// Entry count per collection, from each response's `results`
    pub fn counts(&self) -> (usize, usize, usize) {
        let len = |v: &Value| v.get("results").and_then(Value::as_array).map_or(0, Vec::len);
        (len(&self.devices), len(&self.interfaces), len(&self.ip_addresses))
    }
}

/// SNMP-relevant projection of a NetBox device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRow {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "IP")]
    pub ip: Option<String>,
    pub snmp_loc: Option<String>,
    pub snmp_com: Option<String>,
    pub snmp_srv: Option<String>,
}

fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Rows for every entry of `results` in a device list response
pub fn project_devices(response: &Value) -> Vec<DeviceRow> {
    let Some(results) = response.get("results").and_then(Value::as_array) else {
        tracing::warn!("NetBox response has no results array");
        return Vec::new();
    };

    results
        .iter()
        .map(|d| DeviceRow {
            name: str_at(d, &["name"]),
            ip: str_at(d, &["primary_ip", "address"]),
            snmp_loc: str_at(d, &["custom_fields", "snmp_location"]),
            snmp_com: str_at(d, &["custom_fields", "snmp_community"]),
            snmp_srv: str_at(d, &["custom_fields", "snmp_server"]),
        })
        .collect()
}

pub fn filter_by_name<'a>(rows: &'a [DeviceRow], name: &str) -> Vec<&'a DeviceRow> {
    rows.iter().filter(|r| r.name.as_deref() == Some(name)).collect()
}

/// Parse every `*.json` file of `dir`, in file-name order, into one array.
///
/// `skip` excludes a file, typically the merge output living in the same
/// directory.
pub fn merge_json_files(dir: &Path, skip: Option<&Path>) -> Result<Vec<Value>> {
    let skip = skip.and_then(|p| p.canonicalize().ok());

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut merged = Vec::with_capacity(paths.len());
    for path in paths {
        if skip.is_some() && path.canonicalize().ok() == skip {
            tracing::debug!("Skipping merge output {}", path.display());
            continue;
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let value: Value =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        merged.push(value);
    }

    tracing::info!("Merged {} JSON files from {}", merged.len(), dir.display());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> Value {
        json!({
            "count": 2,
            "results": [
                {
                    "name": "sw-core-01",
                    "primary_ip": { "address": "192.168.0.10/24" },
                    "custom_fields": {
                        "snmp_location": "Annecy",
                        "snmp_community": "jeyricorp",
                        "snmp_server": "192.168.0.239"
                    }
                },
                { "name": "ap-01", "primary_ip": null, "custom_fields": {} }
            ]
        })
    }

    #[test]
    fn test_project_devices() {
        let rows = project_devices(&response());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ip.as_deref(), Some("192.168.0.10/24"));
        assert_eq!(rows[0].snmp_com.as_deref(), Some("jeyricorp"));
        assert_eq!(rows[1].ip, None);

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["Name"], "sw-core-01");
        assert_eq!(json["snmp_srv"], "192.168.0.239");
    }

    #[test]
    fn test_inventory_dump_writes_three_files() {
        let dump = InventoryDump {
            devices: response(),
            interfaces: json!({
                "count": 1,
                "results": [{ "name": "Gi0/1", "device": { "name": "sw-core-01" } }]
            }),
            ip_addresses: json!({
                "count": 1,
                "results": [{ "address": "192.168.0.10/24", "assigned_object_id": 7 }]
            }),
        };
        assert_eq!(dump.counts(), (2, 1, 1));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("netbox");
        let written = dump.save(&out).unwrap();
        assert_eq!(
            written,
            vec![out.join("devices.json"), out.join("ifaces.json"), out.join("ips.json")]
        );

        let ifaces: Value = serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(ifaces["results"][0]["name"], "Gi0/1");
        let ips: Value = serde_json::from_str(&std::fs::read_to_string(&written[2]).unwrap()).unwrap();
        assert_eq!(ips["results"][0]["address"], "192.168.0.10/24");
    }

    #[test]
    fn test_filter_by_name() {
        let rows = project_devices(&response());
        assert_eq!(filter_by_name(&rows, "ap-01").len(), 1);
        assert!(filter_by_name(&rows, "nope").is_empty());
        assert!(project_devices(&json!({ "detail": "Invalid token" })).is_empty());
    }

    #[test]
    fn test_merge_json_files_sorted_and_skips_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"n": 2}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"n": 1}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let output = dir.path().join("merged.json");
        std::fs::write(&output, "[]").unwrap();

        let merged = merge_json_files(dir.path(), Some(&output)).unwrap();
        assert_eq!(merged, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn test_merge_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{").unwrap();
        let err = merge_json_files(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_client_requires_token() {
        let config = NetboxConfig {
            url: "https://netbox.local".into(),
            token: None,
            verify_ssl: true,
        };
        assert!(matches!(NetboxClient::new(&config), Err(ApiError::MissingToken(_))));

        let config = NetboxConfig {
            token: Some("bad\ntoken".into()),
            ..config
        };
        assert!(matches!(NetboxClient::new(&config), Err(ApiError::Config(_))));
    }
}
