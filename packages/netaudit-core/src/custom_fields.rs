//! Extraction of legacy `custom_fields.<name>` references from Jinja2
//! templates and YAML playbooks.

use anyhow::Result;
use ignore::WalkBuilder;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// File extensions scanned for references
const SCANNED_EXTENSIONS: [&str; 3] = ["j2", "yml", "yaml"];

const DEVICE_FIELDS: [&str; 2] = ["dev_lpbk", "domain_name"];
const ROUTING_FIELDS: [&str; 4] = ["bgp_asn", "ospf_area", "rr1", "rr2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FieldCategory {
    Interfaces,
    Device,
    Routing,
    NetworkServices,
    Other,
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 5] = [
        FieldCategory::Interfaces,
        FieldCategory::Device,
        FieldCategory::Routing,
        FieldCategory::NetworkServices,
        FieldCategory::Other,
    ];

    pub fn of(field: &str) -> Self {
        if field.starts_with("iface_") {
            FieldCategory::Interfaces
        } else if DEVICE_FIELDS.contains(&field) {
            FieldCategory::Device
        } else if ROUTING_FIELDS.contains(&field) {
            FieldCategory::Routing
        } else if field.starts_with("snmp_") || field.starts_with("dns_") {
            FieldCategory::NetworkServices
        } else {
            FieldCategory::Other
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldCategory::Interfaces => "Interfaces",
            FieldCategory::Device => "Device",
            FieldCategory::Routing => "Routing",
            FieldCategory::NetworkServices => "Network Services",
            FieldCategory::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Non-empty categories in display order, names kept in input order
pub fn categorize(fields: &[String]) -> Vec<(FieldCategory, Vec<String>)> {
    let mut grouped: BTreeMap<FieldCategory, Vec<String>> = BTreeMap::new();
    for field in fields {
        grouped.entry(FieldCategory::of(field)).or_default().push(field.clone());
    }
    FieldCategory::ALL
        .into_iter()
        .filter_map(|c| grouped.remove(&c).map(|names| (c, names)))
        .collect()
}

/// Custom-field references found under a directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    /// Sorted unique field names
    pub fields: Vec<String>,
    /// Number of references per scanned file that had any
    pub hits_per_file: BTreeMap<PathBuf, usize>,
    pub files_scanned: usize,
    /// Files that could not be read
    pub skipped: Vec<PathBuf>,
}

fn reference_pattern() -> Regex {
    Regex::new(r"custom_fields\.([a-zA-Z_][a-zA-Z0-9_]*)").expect("valid regex")
}

/// Field names referenced in one text
pub fn extract_from_text(content: &str) -> Vec<String> {
    reference_pattern()
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCANNED_EXTENSIONS.contains(&ext))
}

/// Walk `root` and collect every custom-field reference.
///
/// Unreadable files are logged and listed in `skipped`; only a missing root is
/// an error.
pub fn extract_custom_fields(root: &Path) -> Result<Extraction> {
    if !root.is_dir() {
        anyhow::bail!("Template directory not found: {}", root.display());
    }

    let pattern = reference_pattern();
    let mut unique = BTreeSet::new();
    let mut extraction = Extraction::default();

    for result in WalkBuilder::new(root).hidden(false).git_ignore(false).build() {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Failed to read directory entry: {}", err);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !is_scanned(path) {
            continue;
        }

        extraction.files_scanned += 1;
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                extraction.skipped.push(path.to_path_buf());
                continue;
            }
        };

        let mut hits = 0;
        for cap in pattern.captures_iter(&content) {
            if let Some(m) = cap.get(1) {
                unique.insert(m.as_str().to_string());
                hits += 1;
            }
        }
        if hits > 0 {
            let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            extraction.hits_per_file.insert(rel, hits);
        }
    }

    extraction.fields = unique.into_iter().collect();
    tracing::info!(
        "{} custom fields referenced across {} scanned files",
        extraction.fields.len(),
        extraction.files_scanned
    );
    Ok(extraction)
}
