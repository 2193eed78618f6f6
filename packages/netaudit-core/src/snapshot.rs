//! Fetched inventory, kept in memory for the audits or on disk for replay.

use crate::client::InfrahubClient;
use crate::error::ApiError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Every object the audits need, fetched once
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub devices: Vec<Value>,
    #[serde(default)]
    pub interfaces: Vec<Value>,
    #[serde(default)]
    pub sites: Vec<Value>,
    #[serde(default)]
    pub platforms: Vec<Value>,
    /// RFC 3339 time of the fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

impl Snapshot {
    /// Fetch all four object kinds, one query after the other
    pub async fn fetch(client: &InfrahubClient) -> Result<Self, ApiError> {
        let devices = client.get_all_devices().await?;
        let interfaces = client.get_all_interfaces().await?;
        let sites = client.get_all_sites().await?;
        let platforms = client.get_all_platforms().await?;

        Ok(Self {
            devices,
            interfaces,
            sites,
            platforms,
            fetched_at: Some(chrono::Local::now().to_rfc3339()),
        })
    }

    /// Read a snapshot previously written by [`Snapshot::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        tracing::info!(
            "Loaded snapshot: {} devices, {} interfaces, {} sites, {} platforms",
            snapshot.devices.len(),
            snapshot.interfaces.len(),
            snapshot.sites.len(),
            snapshot.platforms.len()
        );
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::report::save_report(self, path)?;
        tracing::debug!("Saved snapshot with {} objects", self.len());
        Ok(())
    }

    /// Total number of objects across kinds
    pub fn len(&self) -> usize {
        self.devices.len() + self.interfaces.len() + self.sites.len() + self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");

        let snapshot = Snapshot {
            devices: vec![json!({ "name": { "value": "rtr-01" } })],
            sites: vec![json!({ "name": { "value": "PAR1" } })],
            fetched_at: Some("2024-05-01T10:00:00+02:00".into()),
            ..Default::default()
        };
        snapshot.save(&path).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded.devices, snapshot.devices);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.fetched_at.as_deref(), Some("2024-05-01T10:00:00+02:00"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "devices": [ { "id": "1" } ] }"#).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded.devices.len(), 1);
        assert!(loaded.platforms.is_empty());
        assert!(loaded.fetched_at.is_none());
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let err = Snapshot::load(Path::new("/nonexistent/snap.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snap.json"));
    }
}
