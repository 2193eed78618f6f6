//! Parser for Cisco `show version` output.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fields recovered from one `show version` capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Set when none of the fields above could be found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    pub raw: String,
}

fn multiline(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .case_insensitive(true)
        .build()
        .expect("valid regex")
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}

pub fn parse_show_version(text: &str) -> ShowVersion {
    let prompt_re = Regex::new(r"(?m)^([A-Za-z0-9_\-]+)[#>]\s*$").expect("valid regex");
    let version_re = Regex::new(r"Version\s+([\d\.A-Za-z\-\(\)]+)").expect("valid regex");
    let model_re = multiline(r"^\s*cisco\s+(\S+)\s+.*bytes of memory");
    let model_number_re = multiline(r"^\s*Model number\s*:\s*(\S+)");
    let board_id_re = Regex::new(r"Processor board ID\s+(\S+)").expect("valid regex");
    let system_serial_re = multiline(r"System serial number\s*:\s*(\S+)");

    let mut parsed = ShowVersion {
        hostname: first_capture(&prompt_re, text),
        version: first_capture(&version_re, text),
        model: first_capture(&model_re, text).or_else(|| first_capture(&model_number_re, text)),
        serial: first_capture(&board_id_re, text).or_else(|| first_capture(&system_serial_re, text)),
        parse_error: None,
        raw: text.to_string(),
    };

    if parsed.hostname.is_none() && parsed.version.is_none() && parsed.model.is_none() && parsed.serial.is_none() {
        tracing::warn!("No show version field recognized");
        parsed.parse_error = Some("no recognizable show version field".to_string());
    }

    parsed
}

/// Write `<prefix>.json` and `<prefix>.yml`, returning both paths
pub fn write_outputs(parsed: &ShowVersion, prefix: &Path) -> Result<(PathBuf, PathBuf)> {
    let json_path = prefix.with_extension("json");
    let yaml_path = prefix.with_extension("yml");

    let json = serde_json::to_string_pretty(parsed).context("Failed to serialize show version")?;
    std::fs::write(&json_path, json).with_context(|| format!("Failed to write {}", json_path.display()))?;

    let yaml = serde_yaml::to_string(parsed).context("Failed to serialize show version as YAML")?;
    std::fs::write(&yaml_path, yaml).with_context(|| format!("Failed to write {}", yaml_path.display()))?;

    Ok((json_path, yaml_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IOS_SAMPLE: &str = "\
Cisco IOS Software, C2960X Software (C2960X-UNIVERSALK9-M), Version 15.2(7)E4, RELEASE SOFTWARE (fc2)
Technical Support: http://www.cisco.com/techsupport
ROM: Bootstrap program is C2960X boot loader
sw-acc-01 uptime is 12 weeks, 3 days, 2 hours, 11 minutes
cisco WS-C2960X-48FPD-L (APM86XXX) processor (revision D0) with 524288K bytes of memory.
Processor board ID FOC2142S0AB
Model number                    : WS-C2960X-48FPD-L
System serial number            : FOC2142S0AB
sw-acc-01#
";

    #[test]
    fn test_parse_ios_sample() {
        let parsed = parse_show_version(IOS_SAMPLE);
        assert_eq!(parsed.hostname.as_deref(), Some("sw-acc-01"));
        assert_eq!(parsed.version.as_deref(), Some("15.2(7)E4"));
        assert_eq!(parsed.model.as_deref(), Some("WS-C2960X-48FPD-L"));
        assert_eq!(parsed.serial.as_deref(), Some("FOC2142S0AB"));
        assert!(parsed.parse_error.is_none());
        assert_eq!(parsed.raw, IOS_SAMPLE);
    }

    #[test]
    fn test_fallback_fields() {
        let text = "Model number : C9300-24T\nSystem Serial Number : FCW2233L0XY\nrtr-01>\n";
        let parsed = parse_show_version(text);
        assert_eq!(parsed.model.as_deref(), Some("C9300-24T"));
        assert_eq!(parsed.serial.as_deref(), Some("FCW2233L0XY"));
        assert_eq!(parsed.hostname.as_deref(), Some("rtr-01"));
        assert!(parsed.version.is_none());
    }

    #[test]
    fn test_unrecognized_input_is_marked() {
        let parsed = parse_show_version("% Invalid input detected at '^' marker.");
        assert!(parsed.parse_error.is_some());
        assert_eq!(parsed.raw, "% Invalid input detected at '^' marker.");
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = parse_show_version(IOS_SAMPLE);
        let (json_path, yaml_path) = write_outputs(&parsed, &dir.path().join("sw-acc-01")).unwrap();

        let back: ShowVersion = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back, parsed);

        let yaml = std::fs::read_to_string(&yaml_path).unwrap();
        assert!(yaml.contains("hostname: sw-acc-01"));
        assert!(yaml_path.ends_with("sw-acc-01.yml"));
    }
}
