use super::{name_set, timestamp, AuditOutcome, Tally};
use crate::check::{check_required_fields, AuditResult, Severity};
use crate::record::{extract_str, object_name};
use crate::requirements::{ObjectKind, Requirements};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Path to the parent device name on an interface
const PARENT_DEVICE_PATH: &str = "device.node.name.value";

/// Interface whose parent device is not in the device list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanInterface {
    pub interface: Option<String>,
    pub device: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceSummary {
    pub total_interfaces: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub missing_critical: usize,
    pub orphan_interfaces: usize,
    pub devices_without_interfaces: usize,
    pub avg_interfaces_per_device: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceReport {
    pub timestamp: String,
    pub audit_type: &'static str,
    pub summary: InterfaceSummary,
    pub issues: Vec<AuditResult>,
    pub orphan_interfaces: Vec<OrphanInterface>,
    pub devices_without_interfaces: Vec<String>,
}

impl InterfaceReport {
    pub fn critical_issues(&self) -> impl Iterator<Item = &AuditResult> {
        self.issues.iter().filter(|r| r.is_critical())
    }
}

impl AuditOutcome for InterfaceReport {
    fn has_findings(&self) -> bool {
        self.summary.missing_critical > 0 || !self.orphan_interfaces.is_empty()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Check interfaces and cross-reference them with devices.
///
/// An interface naming a device absent from `devices` is an orphan; a named
/// device with no interface pointing at it is listed as without interfaces.
pub fn audit_interfaces(interfaces: &[Value], devices: &[Value], requirements: &Requirements) -> InterfaceReport {
    tracing::info!(
        "Auditing {} interfaces against {} devices",
        interfaces.len(),
        devices.len()
    );

    let table = requirements.table(ObjectKind::Interface);
    let device_names = name_set(devices);

    let mut tally = Tally::default();
    let mut orphans = Vec::new();
    let mut per_device: BTreeMap<String, usize> = BTreeMap::new();

    for interface in interfaces {
        let result = check_required_fields(interface, ObjectKind::Interface, table);

        if let Some(device) = extract_str(interface, PARENT_DEVICE_PATH).filter(|d| !d.is_empty()) {
            if !device_names.contains(&device) {
                tracing::debug!("Orphan interface on unknown device '{}'", device);
                orphans.push(OrphanInterface {
                    interface: object_name(interface),
                    device: device.clone(),
                });
            }
            *per_device.entry(device).or_insert(0) += 1;
        }

        tally.record(result, Severity::Ok);
    }

    let devices_without_interfaces: Vec<String> = devices
        .iter()
        .filter_map(object_name)
        .filter(|name| !per_device.contains_key(name))
        .collect();

    let avg = if devices.is_empty() {
        0.0
    } else {
        round2(interfaces.len() as f64 / devices.len() as f64)
    };

    InterfaceReport {
        timestamp: timestamp(),
        audit_type: "interfaces",
        summary: InterfaceSummary {
            total_interfaces: interfaces.len(),
            complete: tally.complete,
            incomplete: tally.incomplete,
            missing_critical: tally.critical,
            orphan_interfaces: orphans.len(),
            devices_without_interfaces: devices_without_interfaces.len(),
            avg_interfaces_per_device: avg,
        },
        issues: tally.issues,
        orphan_interfaces: orphans,
        devices_without_interfaces,
    }
}
