use super::{timestamp, AuditOutcome, Tally};
use crate::check::{check_required_fields, AuditResult, Severity};
use crate::requirements::{ObjectKind, Requirements};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub total_devices: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub missing_critical: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub timestamp: String,
    pub audit_type: &'static str,
    pub summary: DeviceSummary,
    pub issues: Vec<AuditResult>,
}

impl DeviceReport {
    pub fn critical_issues(&self) -> impl Iterator<Item = &AuditResult> {
        self.issues.iter().filter(|r| r.is_critical())
    }
}

impl AuditOutcome for DeviceReport {
    fn has_findings(&self) -> bool {
        self.summary.missing_critical > 0
    }
}

/// Check every device against the device requirement table
pub fn audit_devices(devices: &[Value], requirements: &Requirements) -> DeviceReport {
    tracing::info!("Auditing {} devices", devices.len());

    let table = requirements.table(ObjectKind::Device);
    let mut tally = Tally::default();
    for device in devices {
        tally.record(check_required_fields(device, ObjectKind::Device, table), Severity::Ok);
    }

    DeviceReport {
        timestamp: timestamp(),
        audit_type: "devices",
        summary: DeviceSummary {
            total_devices: devices.len(),
            complete: tally.complete,
            incomplete: tally.incomplete,
            missing_critical: tally.critical,
        },
        issues: tally.issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::fixtures::device;
    use serde_json::json;

    #[test]
    fn test_audit_devices_counts() {
        let mut no_role = device("sw-02", Some("PAR1"), Some("EOS"));
        no_role["role"] = json!({ "value": null });
        let mut no_address = device("sw-03", Some("PAR1"), Some("EOS"));
        no_address.as_object_mut().unwrap().remove("primary_address");

        let devices = vec![device("sw-01", Some("PAR1"), Some("EOS")), no_role, no_address];
        let report = audit_devices(&devices, &Requirements::default());

        assert_eq!(
            report.summary,
            DeviceSummary {
                total_devices: 3,
                complete: 1,
                incomplete: 2,
                missing_critical: 1,
            }
        );
        assert_eq!(report.critical_issues().count(), 1);
        assert_eq!(report.critical_issues().next().unwrap().display_name(), "sw-03");
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_warnings_alone_exit_clean() {
        let mut d = device("sw-01", None, Some("EOS"));
        d["description"] = json!({ "value": "" });
        let report = audit_devices(&[d], &Requirements::default());
        assert_eq!(report.summary.incomplete, 1);
        assert_eq!(report.issues[0].severity, Severity::Warning);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_empty_inventory() {
        let report = audit_devices(&[], &Requirements::default());
        assert_eq!(report.summary, DeviceSummary::default());
        assert_eq!(report.exit_code(), 0);
    }
}
