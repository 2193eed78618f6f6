//! Unified device inventory audit.
//!
//! Unlike the requirement-table audits this looks at devices only, through
//! the lens an operator uses when walking the inventory: health counters,
//! how devices spread over roles and platforms, and a one-line-per-device
//! table.

use super::timestamp;
use crate::record::{count_value, display_value, extract_str, object_name};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const MGMT_ADDRESS_PATH: &str = "primary_address.node.address.value";
const ACTIVE_STATUS: &str = "active";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStats {
    pub total: usize,
    pub without_ip: usize,
    pub without_role: usize,
    pub without_platform: usize,
    pub without_interfaces: usize,
    pub status_inactive: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceFindings {
    pub device: String,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub stats: HealthStats,
    pub issues: Vec<DeviceFindings>,
}

fn device_label(device: &Value) -> String {
    object_name(device).unwrap_or_else(|| "<unnamed>".to_string())
}

/// Count devices lacking a management address, role, platform or
/// interfaces, or not in `active` status
pub fn device_health(devices: &[Value]) -> HealthReport {
    let mut stats = HealthStats {
        total: devices.len(),
        ..Default::default()
    };
    let mut issues = Vec::new();

    for device in devices {
        let mut found = Vec::new();

        if extract_str(device, MGMT_ADDRESS_PATH).filter(|s| !s.is_empty()).is_none() {
            stats.without_ip += 1;
            found.push("No management address".to_string());
        }
        if display_value(device, "role").is_none() {
            stats.without_role += 1;
            found.push("No role".to_string());
        }
        if display_value(device, "platform").is_none() {
            stats.without_platform += 1;
            found.push("No platform".to_string());
        }
        if count_value(device, "interfaces") == 0 {
            stats.without_interfaces += 1;
            found.push("No interfaces".to_string());
        }
        let status = display_value(device, "status");
        if status.as_deref() != Some(ACTIVE_STATUS) {
            stats.status_inactive += 1;
            found.push(format!("Status: {}", status.as_deref().unwrap_or("none")));
        }

        if !found.is_empty() {
            issues.push(DeviceFindings {
                device: device_label(device),
                issues: found,
            });
        }
    }

    HealthReport { stats, issues }
}

/// Devices sharing one role or platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    /// Largest group first
    pub groups: Vec<Group>,
    /// Devices with no value for the grouping field
    pub unassigned: Vec<String>,
}

/// Group device names by the display value of `field` (`role`, `platform`)
pub fn distribution(devices: &[Value], field: &str) -> Distribution {
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut unassigned = Vec::new();

    for device in devices {
        match display_value(device, field) {
            Some(value) => by_name.entry(value).or_default().push(device_label(device)),
            None => unassigned.push(device_label(device)),
        }
    }

    let mut groups: Vec<Group> = by_name
        .into_iter()
        .map(|(name, devices)| Group { name, devices })
        .collect();
    // Stable sort keeps equal-sized groups in name order.
    groups.sort_by(|a, b| b.devices.len().cmp(&a.devices.len()));

    Distribution { groups, unassigned }
}

/// One line of the device summary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub ip: String,
    pub status: String,
    pub role: String,
    pub platform: String,
    pub interfaces: u64,
}

pub fn summary_rows(devices: &[Value]) -> Vec<SummaryRow> {
    let or_na = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut rows: Vec<SummaryRow> = devices
        .iter()
        .map(|device| SummaryRow {
            name: device_label(device),
            ip: or_na(extract_str(device, MGMT_ADDRESS_PATH)),
            status: or_na(display_value(device, "status")),
            role: or_na(display_value(device, "role")),
            platform: or_na(display_value(device, "platform")),
            interfaces: count_value(device, "interfaces"),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// Which inventory sections to produce
#[derive(Debug, Clone, Copy, Default)]
pub struct Sections {
    pub devices: bool,
    pub roles: bool,
    pub platforms: bool,
    pub summary: bool,
}

impl Sections {
    pub fn all() -> Self {
        Self {
            devices: true,
            roles: true,
            platforms: true,
            summary: true,
        }
    }

    /// No section selected means every section
    pub fn or_all(self) -> Self {
        if self.devices || self.roles || self.platforms || self.summary {
            self
        } else {
            Self::all()
        }
    }
}

/// Selected inventory sections combined into one document
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<HealthReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryRow>>,
}

pub fn audit_inventory(devices: &[Value], sections: Sections) -> InventoryReport {
    let sections = sections.or_all();
    tracing::info!("Inventory audit over {} devices", devices.len());

    InventoryReport {
        timestamp: timestamp(),
        devices: sections.devices.then(|| device_health(devices)),
        roles: sections.roles.then(|| distribution(devices, "role")),
        platforms: sections.platforms.then(|| distribution(devices, "platform")),
        summary: sections.summary.then(|| summary_rows(devices)),
    }
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn render_distribution(out: &mut Vec<String>, title: &str, label: &str, dist: &Distribution) {
    out.push(format!("{} ({} found)", title, dist.groups.len()));
    for group in &dist.groups {
        out.push(format!("  {}: {} devices", group.name, group.devices.len()));
    }
    if !dist.unassigned.is_empty() {
        out.push(format!("  {} devices without {}:", dist.unassigned.len(), label));
        out.extend(crate::report::render_list(&dist.unassigned, 5));
    }
}

impl InventoryReport {
    /// Plain-text rendering of the selected sections
    pub fn render(&self) -> String {
        let mut out = Vec::new();

        if let Some(health) = &self.devices {
            let s = &health.stats;
            out.push("Devices".to_string());
            out.push(format!("  Total: {}", s.total));
            out.push(format!("  Without management address: {}", s.without_ip));
            out.push(format!("  Without role: {}", s.without_role));
            out.push(format!("  Without platform: {}", s.without_platform));
            out.push(format!("  Without interfaces: {}", s.without_interfaces));
            out.push(format!("  Status not active: {}", s.status_inactive));
            if !health.issues.is_empty() {
                out.push(format!("  {} devices with problems:", health.issues.len()));
                for finding in health.issues.iter().take(10) {
                    out.push(format!("    - {}", finding.device));
                    for issue in &finding.issues {
                        out.push(format!("        {}", issue));
                    }
                }
                if health.issues.len() > 10 {
                    out.push(format!("    ... and {} more", health.issues.len() - 10));
                }
            }
        }

        if let Some(roles) = &self.roles {
            render_distribution(&mut out, "Roles", "role", roles);
        }
        if let Some(platforms) = &self.platforms {
            render_distribution(&mut out, "Platforms", "platform", platforms);
        }

        if let Some(rows) = &self.summary {
            out.push(format!(
                "{:40} | {:15} | {:8} | {:12} | {:12} | {}",
                "Name", "IP", "Status", "Role", "Platform", "Interfaces"
            ));
            out.push("-".repeat(105));
            for row in rows {
                out.push(format!(
                    "{:40} | {:15} | {:8} | {:12} | {:12} | {:2}",
                    truncate(&row.name, 40),
                    row.ip,
                    row.status,
                    row.role,
                    row.platform,
                    row.interfaces
                ));
            }
        }

        out.join("\n")
    }
}
