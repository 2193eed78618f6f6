//! Report output shared by the audit commands.

use crate::{Cli, OutputFormat};
use anyhow::{Context, Result};
use netaudit_core::audit::{
    AuditOutcome, DeviceReport, FullReport, InterfaceReport, PlatformReport, SiteReport,
};
use netaudit_core::report::{render_list, render_summary, save_report};
use netaudit_core::{AuditResult, IssueKind};
use serde::Serialize;
use std::path::Path;

/// Entries shown per list before truncating
const LIST_LIMIT: usize = 10;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

/// Save a report, print it in the selected format and map it to an exit code
pub fn finish_audit<T>(cli: &Cli, report: &T, path: &Path, details: Vec<String>) -> Result<u8>
where
    T: Serialize + AuditOutcome,
{
    let value = serde_json::to_value(report).context("Failed to serialize report")?;
    save_report(&value, path)?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", render_summary(&value));
            for line in details {
                println!("{}", line);
            }
            println!();
            println!("Report saved: {}", path.display());
        }
        OutputFormat::Json => print_json(&value)?,
    }

    Ok(report.exit_code() as u8)
}

/// `title (n):` followed by a truncated list, nothing when empty
pub fn list_section<S: AsRef<str>>(title: &str, items: &[S]) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), format!("{} ({}):", title, items.len())];
    lines.extend(render_list(items, LIST_LIMIT));
    lines
}

fn critical_section<'a>(results: impl Iterator<Item = &'a AuditResult>) -> Vec<String> {
    let names: Vec<String> = results
        .map(|r| {
            let fields: Vec<&str> = r
                .issues_of(IssueKind::MissingCriticalFields)
                .flat_map(|i| i.fields.iter().map(String::as_str))
                .collect();
            format!("{} (missing: {})", r.display_name(), fields.join(", "))
        })
        .collect();
    list_section("Critical issues", &names)
}

pub fn device_details(report: &DeviceReport) -> Vec<String> {
    critical_section(report.critical_issues())
}

pub fn interface_details(report: &InterfaceReport) -> Vec<String> {
    let orphans: Vec<String> = report
        .orphan_interfaces
        .iter()
        .map(|o| format!("{} -> {}", o.interface.as_deref().unwrap_or("<unnamed>"), o.device))
        .collect();

    let mut lines = critical_section(report.critical_issues());
    lines.extend(list_section("Orphan interfaces", &orphans));
    lines.extend(list_section("Devices without interfaces", &report.devices_without_interfaces));
    lines
}

pub fn site_details(report: &SiteReport) -> Vec<String> {
    let mut lines = critical_section(report.critical_issues());
    lines.extend(list_section("Sites referenced but not defined", &report.undefined_sites));
    lines.extend(list_section("Sites without devices", &report.sites_without_devices));
    lines.extend(list_section("Devices without site", &report.devices_without_site));
    lines
}

pub fn platform_details(report: &PlatformReport) -> Vec<String> {
    let invalid: Vec<String> = report
        .invalid_network_os
        .iter()
        .map(|i| format!("{}: '{}' (expected '{}')", i.platform, i.current, i.expected))
        .collect();

    let mut lines = critical_section(report.critical_issues());
    lines.extend(list_section("Invalid ansible_network_os", &invalid));
    lines.extend(list_section("Platforms referenced but not defined", &report.undefined_platforms));
    lines.extend(list_section("Devices without platform", &report.devices_without_platform));
    lines.extend(list_section("Platforms without devices", &report.platforms_without_devices));
    lines
}

pub fn full_details(report: &FullReport) -> Vec<String> {
    let s = &report.summary;
    let mut lines = vec![
        String::new(),
        "Devices:".to_string(),
        format!(
            "  Total: {}  Complete: {}  Incomplete: {}  Critical: {}",
            s.devices.total_devices, s.devices.complete, s.devices.incomplete, s.devices.missing_critical
        ),
        "Interfaces:".to_string(),
        format!(
            "  Total: {}  Complete: {}  Incomplete: {}  Critical: {}  Orphans: {}  Devices without interfaces: {}",
            s.interfaces.total_interfaces,
            s.interfaces.complete,
            s.interfaces.incomplete,
            s.interfaces.missing_critical,
            s.interfaces.orphan_interfaces,
            s.interfaces.devices_without_interfaces
        ),
        "Sites:".to_string(),
        format!(
            "  Total: {}  Complete: {}  Incomplete: {}  Critical: {}  Undefined: {}  Devices without site: {}",
            s.sites.total_sites,
            s.sites.complete,
            s.sites.incomplete,
            s.sites.missing_critical,
            s.sites.undefined_sites_referenced,
            s.sites.devices_without_site
        ),
        "Platforms:".to_string(),
        format!(
            "  Total: {}  Complete: {}  Incomplete: {}  Critical: {}  Undefined: {}  Invalid network OS: {}  Devices without platform: {}",
            s.platforms.total_platforms,
            s.platforms.complete,
            s.platforms.incomplete,
            s.platforms.missing_critical,
            s.platforms.undefined_platforms_referenced,
            s.platforms.invalid_network_os,
            s.platforms.devices_without_platform
        ),
    ];

    let priority = report.priority_issues();
    if !priority.is_empty() {
        lines.push(String::new());
        lines.push("Priority issues:".to_string());
        lines.extend(priority.into_iter().map(|p| format!("  {}", p)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use netaudit_core::audit::audit_sites;
    use netaudit_core::Requirements;
    use serde_json::json;

    fn named(kind: &str, name: &str) -> serde_json::Value {
        json!({
            "id": format!("{}-{}", kind, name),
            "name": { "value": name },
            "location": { "value": "Annecy" },
            "site": { "node": { "name": { "value": "GVA" } } }
        })
    }

    #[test]
    fn test_list_section() {
        assert!(list_section::<String>("Empty", &[]).is_empty());

        let items: Vec<String> = (0..12).map(|i| format!("sw-{:02}", i)).collect();
        let lines = list_section("Devices", &items);
        assert_eq!(lines[1], "Devices (12):");
        assert_eq!(lines.last().map(String::as_str), Some("    ... and 2 more"));
    }

    #[test]
    fn test_site_details_list_undefined_sites() {
        let report = audit_sites(&[], &[named("dev", "sw-01")], &Requirements::default());
        let lines = site_details(&report);
        assert!(lines.contains(&"Sites referenced but not defined (1):".to_string()));
        assert!(lines.contains(&"    - GVA".to_string()));
    }
}
