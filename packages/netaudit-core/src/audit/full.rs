use super::{
    audit_devices, audit_interfaces, audit_platforms, audit_sites, timestamp, AuditOutcome, DeviceReport,
    DeviceSummary, InterfaceReport, InterfaceSummary, InvalidNetworkOs, OrphanInterface, PlatformReport,
    PlatformSummary, SiteReport, SiteSummary,
};
use crate::check::AuditResult;
use crate::config::AuditConfig;
use crate::snapshot::Snapshot;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FullSummary {
    pub total_objects_audited: usize,
    pub total_issues: usize,
    pub total_critical: usize,
    pub devices: DeviceSummary,
    pub interfaces: InterfaceSummary,
    pub sites: SiteSummary,
    pub platforms: PlatformSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceSection {
    pub summary: DeviceSummary,
    pub critical_issues: Vec<AuditResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceSection {
    pub summary: InterfaceSummary,
    pub critical_issues: Vec<AuditResult>,
    pub orphan_interfaces: Vec<OrphanInterface>,
    pub devices_without_interfaces: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteSection {
    pub summary: SiteSummary,
    pub critical_issues: Vec<AuditResult>,
    pub undefined_sites: Vec<String>,
    pub devices_without_site: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformSection {
    pub summary: PlatformSummary,
    pub critical_issues: Vec<AuditResult>,
    pub undefined_platforms: Vec<String>,
    pub invalid_network_os: Vec<InvalidNetworkOs>,
    pub devices_without_platform: Vec<String>,
}

/// Consolidated report of the four audits
#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    pub timestamp: String,
    pub audit_type: &'static str,
    pub summary: FullSummary,
    pub devices: DeviceSection,
    pub interfaces: InterfaceSection,
    pub sites: SiteSection,
    pub platforms: PlatformSection,
}

impl FullReport {
    /// One line per problem class worth looking at first
    pub fn priority_issues(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut push = |count: usize, label: &str| {
            if count > 0 {
                lines.push(format!("{}: {}", label, count));
            }
        };
        push(self.devices.critical_issues.len(), "Devices with critical issues");
        push(self.interfaces.orphan_interfaces.len(), "Orphan interfaces");
        push(self.sites.undefined_sites.len(), "Sites referenced but not defined");
        push(
            self.platforms.undefined_platforms.len(),
            "Platforms referenced but not defined",
        );
        push(self.platforms.devices_without_platform.len(), "Devices without platform");
        lines
    }
}

impl AuditOutcome for FullReport {
    fn has_findings(&self) -> bool {
        self.summary.total_critical > 0 || self.summary.total_issues > 0
    }
}

/// Full audit with the individual reports kept for separate saving
#[derive(Debug, Clone)]
pub struct FullAudit {
    pub report: FullReport,
    pub devices: DeviceReport,
    pub interfaces: InterfaceReport,
    pub sites: SiteReport,
    pub platforms: PlatformReport,
}

fn critical(issues: &[AuditResult]) -> Vec<AuditResult> {
    issues.iter().filter(|r| r.is_critical()).cloned().collect()
}

/// Run the four audits over one snapshot and consolidate them
pub fn full_audit(snapshot: &Snapshot, config: &AuditConfig) -> FullAudit {
    let requirements = &config.requirements;

    tracing::info!("Running full audit");
    let devices = audit_devices(&snapshot.devices, requirements);
    let interfaces = audit_interfaces(&snapshot.interfaces, &snapshot.devices, requirements);
    let sites = audit_sites(&snapshot.sites, &snapshot.devices, requirements);
    let platforms = audit_platforms(
        &snapshot.platforms,
        &snapshot.devices,
        requirements,
        &config.expected_network_os,
    );

    let total_issues = devices.issues.len() + interfaces.issues.len() + sites.issues.len() + platforms.issues.len();
    let total_critical = devices.summary.missing_critical
        + interfaces.summary.missing_critical
        + sites.summary.missing_critical
        + platforms.summary.missing_critical;

    let report = FullReport {
        timestamp: timestamp(),
        audit_type: "full_audit",
        summary: FullSummary {
            total_objects_audited: devices.summary.total_devices
                + interfaces.summary.total_interfaces
                + sites.summary.total_sites
                + platforms.summary.total_platforms,
            total_issues,
            total_critical,
            devices: devices.summary.clone(),
            interfaces: interfaces.summary.clone(),
            sites: sites.summary.clone(),
            platforms: platforms.summary.clone(),
        },
        devices: DeviceSection {
            summary: devices.summary.clone(),
            critical_issues: critical(&devices.issues),
        },
        interfaces: InterfaceSection {
            summary: interfaces.summary.clone(),
            critical_issues: critical(&interfaces.issues),
            orphan_interfaces: interfaces.orphan_interfaces.clone(),
            devices_without_interfaces: interfaces.devices_without_interfaces.clone(),
        },
        sites: SiteSection {
            summary: sites.summary.clone(),
            critical_issues: critical(&sites.issues),
            undefined_sites: sites.undefined_sites.clone(),
            devices_without_site: sites.devices_without_site.clone(),
        },
        platforms: PlatformSection {
            summary: platforms.summary.clone(),
            critical_issues: critical(&platforms.issues),
            undefined_platforms: platforms.undefined_platforms.clone(),
            invalid_network_os: platforms.invalid_network_os.clone(),
            devices_without_platform: platforms.devices_without_platform.clone(),
        },
    };

    tracing::info!(
        "Full audit done: {} objects, {} issues, {} critical",
        report.summary.total_objects_audited,
        total_issues,
        total_critical
    );

    FullAudit {
        report,
        devices,
        interfaces,
        sites,
        platforms,
    }
}
