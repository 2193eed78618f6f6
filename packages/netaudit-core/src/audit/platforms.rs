use super::{name_set, timestamp, AuditOutcome, References, Tally};
use crate::check::{check_required_fields, AuditResult, Issue, IssueKind, Severity};
use crate::record::extract_str;
use crate::requirements::{expected_network_os, NetworkOsRule, ObjectKind, Requirements};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const DEVICE_PLATFORM_PATH: &str = "platform.node.name.value";

/// Platform whose `ansible_network_os` disagrees with its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidNetworkOs {
    pub platform: String,
    pub current: String,
    pub expected: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformSummary {
    pub total_platforms: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub missing_critical: usize,
    pub platforms_without_devices: usize,
    pub devices_without_platform: usize,
    pub undefined_platforms_referenced: usize,
    pub invalid_network_os: usize,
    pub total_devices: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub timestamp: String,
    pub audit_type: &'static str,
    pub summary: PlatformSummary,
    pub issues: Vec<AuditResult>,
    pub platforms_without_devices: Vec<String>,
    pub devices_without_platform: Vec<String>,
    pub undefined_platforms: Vec<String>,
    pub invalid_network_os: Vec<InvalidNetworkOs>,
    pub devices_per_platform: BTreeMap<String, usize>,
}

impl PlatformReport {
    pub fn critical_issues(&self) -> impl Iterator<Item = &AuditResult> {
        self.issues.iter().filter(|r| r.is_critical())
    }
}

impl AuditOutcome for PlatformReport {
    fn has_findings(&self) -> bool {
        self.summary.missing_critical > 0
            || !self.undefined_platforms.is_empty()
            || !self.devices_without_platform.is_empty()
    }
}

/// Validate a platform's network OS against the name-derived expectation
fn check_network_os(
    result: &mut AuditResult,
    platform_name: &str,
    network_os: &str,
    rules: &[NetworkOsRule],
) -> Option<InvalidNetworkOs> {
    let Some(rule) = expected_network_os(rules, platform_name) else {
        result.push_issue(
            Issue::new(
                IssueKind::UnknownNetworkOs,
                format!("ansible_network_os='{}' is not in the expected mapping", network_os),
            ),
            Severity::Ok,
        );
        return None;
    };

    if network_os.eq_ignore_ascii_case(&rule.network_os) {
        return None;
    }

    result.push_issue(
        Issue::new(
            IssueKind::InvalidNetworkOs,
            format!(
                "ansible_network_os='{}' does not match the platform name (expected '{}')",
                network_os, rule.network_os
            ),
        ),
        Severity::Warning,
    );
    Some(InvalidNetworkOs {
        platform: platform_name.to_string(),
        current: network_os.to_string(),
        expected: rule.network_os.clone(),
    })
}

/// Check platforms, their device usage, and their `ansible_network_os`.
///
/// Unused platforms are informational; `ok` and `info` both count as complete.
pub fn audit_platforms(
    platforms: &[Value],
    devices: &[Value],
    requirements: &Requirements,
    rules: &[NetworkOsRule],
) -> PlatformReport {
    tracing::info!(
        "Auditing {} platforms against {} devices",
        platforms.len(),
        devices.len()
    );

    let table = requirements.table(ObjectKind::Platform);
    let refs = References::collect(devices, DEVICE_PLATFORM_PATH);
    let undefined_platforms = refs.undefined(&name_set(platforms));

    let mut tally = Tally::default();
    let mut platforms_without_devices = Vec::new();
    let mut invalid_network_os = Vec::new();

    for platform in platforms {
        let mut result = check_required_fields(platform, ObjectKind::Platform, table);
        let name = result.object_name.clone().unwrap_or_default();
        let device_count = refs.count_for(result.object_name.as_deref());
        result.device_count = Some(device_count);

        if device_count == 0 {
            result.push_issue(
                Issue::new(IssueKind::NoDevices, format!("No device uses platform '{}'", name)),
                Severity::Info,
            );
            platforms_without_devices.push(name.clone());
        }

        if let Some(os) = extract_str(platform, "ansible_network_os.value").filter(|s| !s.is_empty()) {
            if let Some(invalid) = check_network_os(&mut result, &name, &os, rules) {
                invalid_network_os.push(invalid);
            }
        }

        tally.record(result, Severity::Info);
    }

    PlatformReport {
        timestamp: timestamp(),
        audit_type: "platforms",
        summary: PlatformSummary {
            total_platforms: platforms.len(),
            complete: tally.complete,
            incomplete: tally.incomplete,
            missing_critical: tally.critical,
            platforms_without_devices: platforms_without_devices.len(),
            devices_without_platform: refs.unreferenced.len(),
            undefined_platforms_referenced: undefined_platforms.len(),
            invalid_network_os: invalid_network_os.len(),
            total_devices: devices.len(),
        },
        issues: tally.issues,
        platforms_without_devices,
        devices_without_platform: refs.unreferenced,
        undefined_platforms,
        invalid_network_os,
        devices_per_platform: refs.per_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::fixtures::{device, platform};
    use crate::requirements::default_network_os_rules;

    fn run(platforms: &[Value], devices: &[Value]) -> PlatformReport {
        audit_platforms(platforms, devices, &Requirements::default(), &default_network_os_rules())
    }

    #[test]
    fn test_unused_platform_is_info_and_complete() {
        let report = run(&[platform("Arista EOS", Some("arista_eos"))], &[]);
        assert_eq!(report.summary.complete, 1);
        assert!(report.issues.is_empty());
        assert_eq!(report.platforms_without_devices, vec!["Arista EOS"]);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_invalid_network_os() {
        let platforms = vec![platform("Cisco Nexus 9k", Some("cisco_ios"))];
        let devices = vec![device("leaf-01", Some("PAR1"), Some("Cisco Nexus 9k"))];
        let report = run(&platforms, &devices);

        assert_eq!(
            report.invalid_network_os,
            vec![InvalidNetworkOs {
                platform: "Cisco Nexus 9k".into(),
                current: "cisco_ios".into(),
                expected: "cisco_nxos".into(),
            }]
        );
        assert_eq!(report.summary.incomplete, 1);
        assert_eq!(report.issues[0].severity, Severity::Warning);
        assert_eq!(report.issues[0].device_count, Some(1));
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_case_insensitive_match_and_unknown_os() {
        let platforms = vec![
            platform("Juniper MX", Some("JUNIPER_JUNOS")),
            platform("Mikrotik CCR", Some("routeros")),
        ];
        let devices = vec![
            device("a", None, Some("Juniper MX")),
            device("b", None, Some("Mikrotik CCR")),
        ];
        let report = run(&platforms, &devices);
        assert!(report.invalid_network_os.is_empty());
        assert_eq!(report.summary.complete, 2);
        assert_eq!(report.devices_without_platform.len(), 0);
    }

    #[test]
    fn test_unknown_network_os_does_not_escalate() {
        let mut bare = platform("Mikrotik CCR", Some("routeros"));
        bare.as_object_mut().unwrap().remove("manufacturer");
        let devices = vec![device("r1", None, Some("Mikrotik CCR"))];
        let report = run(&[bare], &devices);

        assert_eq!(report.issues.len(), 1);
        let result = &report.issues[0];
        let kinds: Vec<IssueKind> = result.issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::MissingImportantFields, IssueKind::UnknownNetworkOs]);
        assert_eq!(result.severity, Severity::Warning);
        assert!(report.invalid_network_os.is_empty());
    }

    #[test]
    fn test_missing_network_os_and_undefined_platform() {
        let platforms = vec![platform("PAN-OS", None)];
        let devices = vec![
            device("fw-01", None, Some("PAN-OS")),
            device("fw-02", None, Some("FortiGate")),
            device("fw-03", None, None),
        ];
        let report = run(&platforms, &devices);

        assert_eq!(report.summary.missing_critical, 1);
        assert_eq!(report.undefined_platforms, vec!["FortiGate"]);
        assert_eq!(report.devices_without_platform, vec!["fw-03"]);
        assert_eq!(report.exit_code(), 1);
    }
}
