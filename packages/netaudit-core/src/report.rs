//! Writing reports to disk and rendering them for the terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const BANNER_WIDTH: usize = 80;

/// Write `value` as pretty JSON, creating parent directories
pub fn save_report<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write report {}", path.display()))?;

    tracing::info!("Report saved: {}", path.display());
    Ok(())
}

/// `<dir>/audit_<stem>_<YYYYmmdd_HHMMSS>.json`
pub fn default_report_path<Tz>(reports_dir: &Path, stem: &str, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    reports_dir.join(format!("audit_{}_{}.json", stem, now.format("%Y%m%d_%H%M%S")))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Banner, timestamp, summary counters and per-severity issue counts
pub fn render_summary(report: &Value) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let audit_type = report.get("audit_type").and_then(Value::as_str).unwrap_or("audit");

    let mut out = vec![
        rule.clone(),
        format!("AUDIT REPORT: {}", audit_type.to_uppercase()),
        rule.clone(),
    ];
    if let Some(ts) = report.get("timestamp").and_then(Value::as_str) {
        out.push(format!("Timestamp: {}", ts));
    }

    if let Some(summary) = report.get("summary").and_then(Value::as_object) {
        out.push(String::new());
        out.push("Summary:".to_string());
        for (key, value) in summary {
            // Nested per-type summaries are rendered by the caller.
            if !value.is_object() {
                out.push(format!("  {}: {}", key, scalar(value)));
            }
        }
    }

    if let Some(issues) = report.get("issues").and_then(Value::as_array) {
        out.push(String::new());
        out.push(format!("Issues detected: {}", issues.len()));

        let mut by_severity: BTreeMap<&str, usize> = BTreeMap::new();
        for issue in issues {
            let severity = issue.get("severity").and_then(Value::as_str).unwrap_or("unknown");
            *by_severity.entry(severity).or_insert(0) += 1;
        }
        for (severity, count) in by_severity {
            out.push(format!("  {}: {}", severity.to_uppercase(), count));
        }
    }

    out.push(rule);
    out.join("\n")
}

/// Bulleted lines for the first `limit` items, then `... and N more`
pub fn render_list<S: AsRef<str>>(items: &[S], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = items
        .iter()
        .take(limit)
        .map(|item| format!("    - {}", item.as_ref()))
        .collect();
    if items.len() > limit {
        lines.push(format!("    ... and {} more", items.len() - limit));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_default_report_path() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = default_report_path(Path::new("reports"), "devices", &now);
        assert_eq!(path, PathBuf::from("reports/audit_devices_20240309_070501.json"));
    }

    #[test]
    fn test_save_report_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("r.json");
        save_report(&json!({ "audit_type": "devices", "name": "é" }), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"audit_type\""));
        assert!(content.contains("é"));
    }

    #[test]
    fn test_render_summary_counts_severities() {
        let report = json!({
            "timestamp": "2024-03-09T07:05:01+00:00",
            "audit_type": "sites",
            "summary": { "total_sites": 3, "complete": 1, "incomplete": 2 },
            "issues": [
                { "severity": "warning" },
                { "severity": "critical" },
                { "severity": "warning" }
            ]
        });
        let text = render_summary(&report);
        assert!(text.contains("AUDIT REPORT: SITES"));
        assert!(text.contains("  total_sites: 3"));
        assert!(text.contains("Issues detected: 3"));

        // Summary keys keep report order
        let total = text.find("  total_sites: 3").unwrap();
        let complete = text.find("  complete: 1").unwrap();
        let incomplete = text.find("  incomplete: 2").unwrap();
        assert!(total < complete && complete < incomplete);

        let critical = text.find("CRITICAL: 1").unwrap();
        let warning = text.find("WARNING: 2").unwrap();
        assert!(critical < warning);
    }

    #[test]
    fn test_render_list_truncates() {
        let items: Vec<String> = (0..13).map(|i| format!("dev-{}", i)).collect();
        let lines = render_list(&items, 10);
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "    - dev-0");
        assert_eq!(lines[10], "    ... and 3 more");
        assert_eq!(render_list(&items[..2], 10).len(), 2);
    }
}
