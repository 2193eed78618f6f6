//! Completeness audits over a snapshot of the source of truth.
//!
//! Every audit is a pure function of already-fetched records and returns a
//! serializable report. Fetching lives in [`crate::snapshot`].

pub mod devices;
pub mod full;
pub mod interfaces;
pub mod inventory;
pub mod platforms;
pub mod sites;

pub use devices::{audit_devices, DeviceReport, DeviceSummary};
pub use full::{full_audit, FullAudit, FullReport};
pub use interfaces::{audit_interfaces, InterfaceReport, InterfaceSummary, OrphanInterface};
pub use inventory::{audit_inventory, InventoryReport, Sections};
pub use platforms::{audit_platforms, InvalidNetworkOs, PlatformReport, PlatformSummary};
pub use sites::{audit_sites, SiteReport, SiteSummary};

use crate::check::{AuditResult, Severity};
use crate::record::{extract_str, object_name};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Exit status when an audit found problems worth failing a pipeline on
pub const EXIT_FINDINGS: i32 = 1;

/// Exit status for a clean audit
pub const EXIT_CLEAN: i32 = 0;

/// Reports that map to a process exit status
pub trait AuditOutcome {
    /// Whether the report contains blocking findings
    fn has_findings(&self) -> bool;

    fn exit_code(&self) -> i32 {
        if self.has_findings() {
            EXIT_FINDINGS
        } else {
            EXIT_CLEAN
        }
    }
}

/// Timestamp stamped on reports
pub fn timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Running counts of complete / incomplete / critical objects
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub complete: usize,
    pub incomplete: usize,
    pub critical: usize,
    pub issues: Vec<AuditResult>,
}

impl Tally {
    /// Count a result; anything above `complete_up_to` is an incomplete object
    /// and is kept as an issue.
    pub fn record(&mut self, result: AuditResult, complete_up_to: Severity) {
        if result.severity <= complete_up_to {
            self.complete += 1;
            return;
        }
        self.incomplete += 1;
        if result.is_critical() {
            self.critical += 1;
        }
        self.issues.push(result);
    }
}

/// How devices reference another object kind by name
#[derive(Debug, Default)]
pub(crate) struct References {
    /// Referenced name → number of devices referencing it
    pub per_target: BTreeMap<String, usize>,
    /// Names of devices with no reference
    pub unreferenced: Vec<String>,
}

impl References {
    /// Group devices by the name found at `path` (e.g. `site.node.name.value`)
    pub fn collect(devices: &[Value], path: &str) -> Self {
        let mut refs = References::default();
        for device in devices {
            match extract_str(device, path).filter(|s| !s.is_empty()) {
                Some(target) => *refs.per_target.entry(target).or_insert(0) += 1,
                None => refs.unreferenced.push(object_name(device).unwrap_or_default()),
            }
        }
        refs
    }

    /// Referenced names that no defined object carries, sorted
    pub fn undefined(&self, defined: &BTreeSet<String>) -> Vec<String> {
        self.per_target
            .keys()
            .filter(|name| !defined.contains(*name))
            .cloned()
            .collect()
    }

    pub fn count_for(&self, name: Option<&str>) -> usize {
        name.and_then(|n| self.per_target.get(n)).copied().unwrap_or(0)
    }
}

/// Names of a set of records, unnamed records skipped
pub(crate) fn name_set(records: &[Value]) -> BTreeSet<String> {
    records.iter().filter_map(object_name).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn device(name: &str, site: Option<&str>, platform: Option<&str>) -> Value {
        let mut d = json!({
            "id": format!("dev-{}", name),
            "name": { "value": name },
            "primary_address": { "node": { "address": { "value": "10.0.0.1/32" } } },
            "role": { "value": "core" },
            "type": { "value": "router" },
            "status": { "value": "active" },
            "interfaces": { "count": 4 },
            "description": { "value": "lab" }
        });
        d["site"] = match site {
            Some(s) => json!({ "node": { "name": { "value": s } } }),
            None => json!({ "node": null }),
        };
        d["platform"] = match platform {
            Some(p) => json!({ "node": { "name": { "value": p } } }),
            None => json!({ "node": null }),
        };
        d
    }

    pub fn interface(name: &str, device: &str) -> Value {
        json!({
            "id": format!("if-{}-{}", device, name),
            "name": { "value": name },
            "device": { "node": { "name": { "value": device } } },
            "status": { "value": "active" },
            "enabled": { "value": true },
            "mtu": { "value": 1500 },
            "ip_addresses": { "count": 1 },
            "description": { "value": "uplink" }
        })
    }

    pub fn site(name: &str) -> Value {
        json!({
            "id": format!("site-{}", name),
            "name": { "value": name },
            "location": { "value": "Annecy" },
            "devices": { "count": 1 },
            "description": { "value": "dc" }
        })
    }

    pub fn platform(name: &str, network_os: Option<&str>) -> Value {
        let mut p = json!({
            "id": format!("plat-{}", name),
            "name": { "value": name },
            "manufacturer": { "value": "vendor" },
            "description": { "value": "platform" }
        });
        if let Some(os) = network_os {
            p["ansible_network_os"] = json!({ "value": os });
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::device;
    use super::*;
    use crate::check::{Issue, IssueKind};
    use crate::requirements::ObjectKind;

    #[test]
    fn test_references_collect_and_undefined() {
        let devices = vec![
            device("a", Some("PAR1"), None),
            device("b", Some("PAR1"), None),
            device("c", Some("LYS"), None),
            device("d", None, None),
        ];
        let refs = References::collect(&devices, "site.node.name.value");
        assert_eq!(refs.per_target["PAR1"], 2);
        assert_eq!(refs.unreferenced, vec!["d"]);
        assert_eq!(refs.count_for(Some("LYS")), 1);
        assert_eq!(refs.count_for(None), 0);

        let defined: BTreeSet<String> = ["PAR1".to_string()].into();
        assert_eq!(refs.undefined(&defined), vec!["LYS"]);
    }

    #[test]
    fn test_tally_thresholds() {
        let result = |severity| AuditResult {
            object_type: ObjectKind::Platform,
            object_id: None,
            object_name: None,
            issues: vec![Issue::new(IssueKind::NoDevices, "x")],
            severity,
            device_count: None,
        };
        let mut tally = Tally::default();
        tally.record(result(Severity::Info), Severity::Info);
        tally.record(result(Severity::Warning), Severity::Info);
        tally.record(result(Severity::Critical), Severity::Info);
        assert_eq!((tally.complete, tally.incomplete, tally.critical), (1, 2, 1));
        assert_eq!(tally.issues.len(), 2);
    }
}
