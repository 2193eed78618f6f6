//! Field-requirement tables and the expected network-OS mapping.
//!
//! Each audited object kind carries three ordered tiers of field names. The
//! tiers drive severity: a missing critical field makes the object critical,
//! a missing important field a warning, a missing optional field only an
//! informational issue.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Object kinds the audits know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    #[serde(rename = "InfraDevice")]
    Device,
    #[serde(rename = "InfraInterface")]
    Interface,
    #[serde(rename = "InfraSite")]
    Site,
    #[serde(rename = "InfraPlatform")]
    Platform,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Device,
        ObjectKind::Interface,
        ObjectKind::Site,
        ObjectKind::Platform,
    ];

    /// Type name used in reports and in the config file
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Device => "InfraDevice",
            ObjectKind::Interface => "InfraInterface",
            ObjectKind::Site => "InfraSite",
            ObjectKind::Platform => "InfraPlatform",
        }
    }

    /// GraphQL kind for a schema namespace, e.g. `JeylanDevice`
    pub fn graphql_kind(&self, namespace: &str) -> String {
        let suffix = match self {
            ObjectKind::Device => "Device",
            ObjectKind::Interface => "Interface",
            ObjectKind::Site => "Site",
            ObjectKind::Platform => "Platform",
        };
        format!("{}{}", namespace, suffix)
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Fields expected on one object kind, split by severity tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementTable {
    #[serde(default)]
    pub critical: Vec<String>,
    #[serde(default)]
    pub important: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

impl RequirementTable {
    fn from_static(critical: &[&str], important: &[&str], optional: &[&str]) -> Self {
        let owned = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect();
        Self {
            critical: owned(critical),
            important: owned(important),
            optional: owned(optional),
        }
    }
}

/// Requirement tables for every object kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    tables: BTreeMap<ObjectKind, RequirementTable>,
}

impl Requirements {
    pub fn table(&self, kind: ObjectKind) -> &RequirementTable {
        // Every kind is populated by `default()`; overrides only replace entries.
        &self.tables[&kind]
    }

    /// Replace tables named in `overrides` (keyed by type name). Unknown names
    /// are ignored with a warning.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, RequirementTable>) {
        for (name, table) in overrides {
            match ObjectKind::from_type_name(name) {
                Some(kind) => {
                    tracing::debug!("Overriding requirement table for {}", kind);
                    self.tables.insert(kind, table.clone());
                }
                None => tracing::warn!("Ignoring requirements for unknown object type '{}'", name),
            }
        }
    }
}

impl Default for Requirements {
    fn default() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(
            ObjectKind::Device,
            RequirementTable::from_static(
                &["name", "primary_address"],
                &["site", "platform", "role"],
                &["type", "interfaces", "description"],
            ),
        );
        tables.insert(
            ObjectKind::Interface,
            RequirementTable::from_static(
                &["name", "device"],
                &["status", "enabled"],
                &["ip_addresses", "description", "mtu"],
            ),
        );
        tables.insert(
            ObjectKind::Site,
            RequirementTable::from_static(&["name"], &["location"], &["description", "devices"]),
        );
        tables.insert(
            ObjectKind::Platform,
            RequirementTable::from_static(
                &["name", "ansible_network_os"],
                &["manufacturer"],
                &["description"],
            ),
        );
        Self { tables }
    }
}

/// One `ansible_network_os` value and the platform-name keywords implying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOsRule {
    pub network_os: String,
    pub keywords: Vec<String>,
}

impl NetworkOsRule {
    /// Total length of this rule's keywords found in a lowercase platform name
    fn score(&self, platform_lower: &str) -> usize {
        self.keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| platform_lower.contains(k.as_str()))
            .map(|k| k.len())
            .sum()
    }
}

/// Ordered table of expected network OS values
pub fn default_network_os_rules() -> Vec<NetworkOsRule> {
    const RULES: &[(&str, &[&str])] = &[
        ("cisco_ios", &["cisco", "ios", "catalyst"]),
        ("cisco_iosxe", &["cisco", "iosxe", "isr4"]),
        ("cisco_iosxr", &["cisco", "iosxr", "asr9k"]),
        ("cisco_nxos", &["cisco", "nxos", "nexus"]),
        ("juniper_junos", &["juniper", "junos", "mx", "ex", "qfx"]),
        ("arista_eos", &["arista", "eos"]),
        ("paloalto_panos", &["paloalto", "panos"]),
        ("fortinet_fortios", &["fortinet", "fortigate"]),
    ];

    RULES
        .iter()
        .map(|(os, keywords)| NetworkOsRule {
            network_os: os.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

/// Pick the rule matching a platform name best.
///
/// The rule whose matched keywords have the largest combined length wins, so
/// "Cisco Nexus 9300" resolves to `cisco_nxos` rather than the generic
/// `cisco_ios`. Ties keep table order.
pub fn expected_network_os<'a>(rules: &'a [NetworkOsRule], platform_name: &str) -> Option<&'a NetworkOsRule> {
    let lower = platform_name.to_lowercase();
    let mut best: Option<(&NetworkOsRule, usize)> = None;

    for rule in rules {
        let score = rule.score(&lower);
        if score == 0 {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((rule, score)),
        }
    }

    best.map(|(rule, _)| rule)
}
