//! Completeness checking of a single record against a requirement table.

use crate::record::{has_field, object_id, object_name};
use crate::requirements::{ObjectKind, RequirementTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Severity of an audited object, ordered from harmless to blocking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Ok,
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Raise to `other` if it is more severe; never lowers
    pub fn escalate(&mut self, other: Severity) {
        if other > *self {
            *self = other;
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingCriticalFields,
    MissingImportantFields,
    MissingOptionalFields,
    NoDevices,
    InvalidNetworkOs,
    UnknownNetworkOs,
}

/// One problem found on an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            message: message.into(),
        }
    }

    fn missing(kind: IssueKind, label: &str, fields: Vec<String>) -> Self {
        let message = format!("Missing {} fields: {}", label, fields.join(", "));
        Self {
            kind,
            fields,
            message,
        }
    }
}

/// Outcome of auditing one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub object_type: ObjectKind,
    pub object_id: Option<String>,
    pub object_name: Option<String>,
    pub issues: Vec<Issue>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_count: Option<usize>,
}

impl AuditResult {
    pub fn push_issue(&mut self, issue: Issue, severity: Severity) {
        self.issues.push(issue);
        self.severity.escalate(severity);
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// Issues of one kind, e.g. to print only missing critical fields
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn display_name(&self) -> &str {
        self.object_name.as_deref().unwrap_or("<unnamed>")
    }
}

fn missing_fields(record: &Value, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| !has_field(record, f))
        .cloned()
        .collect()
}

/// Check a record for the fields listed in `table`.
///
/// Missing critical fields make the result critical, missing important fields
/// a warning; missing optional fields are reported without raising severity.
pub fn check_required_fields(record: &Value, kind: ObjectKind, table: &RequirementTable) -> AuditResult {
    let mut result = AuditResult {
        object_type: kind,
        object_id: object_id(record),
        object_name: object_name(record),
        issues: Vec::new(),
        severity: Severity::Ok,
        device_count: None,
    };

    let tiers = [
        (&table.critical, IssueKind::MissingCriticalFields, "critical", Severity::Critical),
        (&table.important, IssueKind::MissingImportantFields, "important", Severity::Warning),
        (&table.optional, IssueKind::MissingOptionalFields, "optional", Severity::Ok),
    ];

    for (fields, issue_kind, label, severity) in tiers {
        let missing = missing_fields(record, fields);
        if !missing.is_empty() {
            result.push_issue(Issue::missing(issue_kind, label, missing), severity);
        }
    }

    tracing::trace!(
        "{} '{}': {} ({} issues)",
        kind,
        result.display_name(),
        result.severity,
        result.issues.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::Requirements;
    use serde_json::json;

    #[test]
    fn test_severity_ordering_and_escalation() {
        assert!(Severity::Ok < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);

        let mut s = Severity::Warning;
        s.escalate(Severity::Info);
        assert_eq!(s, Severity::Warning);
        s.escalate(Severity::Critical);
        assert_eq!(s, Severity::Critical);
    }

    #[test]
    fn test_complete_device_is_ok() {
        let reqs = Requirements::default();
        let device = json!({
            "id": "1",
            "name": { "value": "sw-01" },
            "primary_address": { "node": { "address": { "value": "10.0.0.1/24" } } },
            "site": { "node": { "name": { "value": "PAR1" } } },
            "platform": { "node": { "name": { "value": "Cisco Catalyst" } } },
            "role": { "value": "access" },
            "type": { "value": "C9300" },
            "interfaces": { "count": 48 },
            "description": { "value": "floor 2" }
        });
        let result = check_required_fields(&device, ObjectKind::Device, reqs.table(ObjectKind::Device));
        assert_eq!(result.severity, Severity::Ok);
        assert!(result.issues.is_empty());
        assert_eq!(result.object_name.as_deref(), Some("sw-01"));
    }

    #[test]
    fn test_missing_critical_wins() {
        let reqs = Requirements::default();
        let device = json!({ "id": "2", "name": { "value": "rtr-02" } });
        let result = check_required_fields(&device, ObjectKind::Device, reqs.table(ObjectKind::Device));

        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.issues.len(), 3);
        assert_eq!(result.issues[0].kind, IssueKind::MissingCriticalFields);
        assert_eq!(result.issues[0].fields, vec!["primary_address"]);
        assert_eq!(result.issues[0].message, "Missing critical fields: primary_address");
        assert_eq!(result.issues[1].fields, vec!["site", "platform", "role"]);
        assert_eq!(result.issues[2].kind, IssueKind::MissingOptionalFields);
    }

    #[test]
    fn test_missing_important_is_warning_and_optional_is_ok() {
        let table = RequirementTable {
            critical: vec!["name".into()],
            important: vec!["location".into()],
            optional: vec!["description".into()],
        };
        let site = json!({ "name": { "value": "LYS" } });
        let result = check_required_fields(&site, ObjectKind::Site, &table);
        assert_eq!(result.severity, Severity::Warning);

        let site = json!({ "name": { "value": "LYS" }, "location": { "value": "Lyon" } });
        let result = check_required_fields(&site, ObjectKind::Site, &table);
        assert_eq!(result.severity, Severity::Ok);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues_of(IssueKind::MissingOptionalFields).count(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut result = check_required_fields(
            &json!({ "name": { "value": "x" } }),
            ObjectKind::Site,
            &RequirementTable::default(),
        );
        result.push_issue(Issue::new(IssueKind::NoDevices, "No device assigned"), Severity::Warning);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["object_type"], "InfraSite");
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["issues"][0]["type"], "no_devices");
        assert!(value["issues"][0].get("fields").is_none());
        assert!(value.get("device_count").is_none());
    }
}
