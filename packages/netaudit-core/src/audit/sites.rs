use super::{name_set, timestamp, AuditOutcome, References, Tally};
use crate::check::{check_required_fields, AuditResult, Issue, IssueKind, Severity};
use crate::requirements::{ObjectKind, Requirements};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const DEVICE_SITE_PATH: &str = "site.node.name.value";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub total_sites: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub missing_critical: usize,
    pub sites_without_devices: usize,
    pub devices_without_site: usize,
    pub undefined_sites_referenced: usize,
    pub total_devices: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub timestamp: String,
    pub audit_type: &'static str,
    pub summary: SiteSummary,
    pub issues: Vec<AuditResult>,
    pub sites_without_devices: Vec<String>,
    pub devices_without_site: Vec<String>,
    pub undefined_sites: Vec<String>,
    pub devices_per_site: BTreeMap<String, usize>,
}

impl SiteReport {
    pub fn critical_issues(&self) -> impl Iterator<Item = &AuditResult> {
        self.issues.iter().filter(|r| r.is_critical())
    }
}

impl AuditOutcome for SiteReport {
    fn has_findings(&self) -> bool {
        self.summary.missing_critical > 0 || !self.undefined_sites.is_empty()
    }
}

/// Check sites and cross-reference them with the sites devices point at.
///
/// A site no device uses gets a `no_devices` issue and becomes at least a
/// warning.
pub fn audit_sites(sites: &[Value], devices: &[Value], requirements: &Requirements) -> SiteReport {
    tracing::info!("Auditing {} sites against {} devices", sites.len(), devices.len());

    let table = requirements.table(ObjectKind::Site);
    let refs = References::collect(devices, DEVICE_SITE_PATH);
    let undefined_sites = refs.undefined(&name_set(sites));

    let mut tally = Tally::default();
    let mut sites_without_devices = Vec::new();

    for site in sites {
        let mut result = check_required_fields(site, ObjectKind::Site, table);
        let device_count = refs.count_for(result.object_name.as_deref());
        result.device_count = Some(device_count);

        if device_count == 0 {
            let name = result.object_name.clone().unwrap_or_default();
            result.push_issue(
                Issue::new(IssueKind::NoDevices, format!("No device assigned to site '{}'", name)),
                Severity::Warning,
            );
            sites_without_devices.push(name);
        }

        tally.record(result, Severity::Ok);
    }

    if !undefined_sites.is_empty() {
        tracing::warn!("{} sites referenced by devices but not defined", undefined_sites.len());
    }

    SiteReport {
        timestamp: timestamp(),
        audit_type: "sites",
        summary: SiteSummary {
            total_sites: sites.len(),
            complete: tally.complete,
            incomplete: tally.incomplete,
            missing_critical: tally.critical,
            sites_without_devices: sites_without_devices.len(),
            devices_without_site: refs.unreferenced.len(),
            undefined_sites_referenced: undefined_sites.len(),
            total_devices: devices.len(),
        },
        issues: tally.issues,
        sites_without_devices,
        devices_without_site: refs.unreferenced,
        undefined_sites,
        devices_per_site: refs.per_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::fixtures::{device, site};

    #[test]
    fn test_cross_reference() {
        let sites = vec![site("PAR1"), site("LYS")];
        let devices = vec![
            device("a", Some("PAR1"), None),
            device("b", Some("PAR1"), None),
            device("c", Some("GVA"), None),
            device("d", None, None),
        ];
        let report = audit_sites(&sites, &devices, &Requirements::default());

        assert_eq!(report.undefined_sites, vec!["GVA"]);
        assert_eq!(report.devices_without_site, vec!["d"]);
        assert_eq!(report.sites_without_devices, vec!["LYS"]);
        assert_eq!(report.devices_per_site["PAR1"], 2);
        assert_eq!(report.summary.complete, 1);
        assert_eq!(report.summary.incomplete, 1);

        let lys = &report.issues[0];
        assert_eq!(lys.severity, Severity::Warning);
        assert_eq!(lys.device_count, Some(0));
        assert_eq!(lys.issues[0].message, "No device assigned to site 'LYS'");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_all_sites_used_and_defined_is_clean() {
        let report = audit_sites(
            &[site("PAR1")],
            &[device("a", Some("PAR1"), None)],
            &Requirements::default(),
        );
        assert!(report.issues.is_empty());
        assert_eq!(report.summary.total_devices, 1);
        assert_eq!(report.exit_code(), 0);
    }
}
