//! Schema introspection results and custom-field migration coverage.

use crate::custom_fields::{categorize, FieldCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// GraphQL type reference, possibly wrapped (`NON_NULL`, `LIST`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub kind: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "ofType", default, skip_serializing_if = "Option::is_none")]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Name of the innermost named type
    pub fn resolved_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.of_type.as_deref().and_then(TypeRef::resolved_name))
    }

    pub fn is_required(&self) -> bool {
        self.kind.as_deref() == Some("NON_NULL")
    }
}

/// A field (or input field) of an introspected type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: Option<TypeRef>,
}

impl SchemaField {
    /// One-line description: `name: Type KIND (required)`
    pub fn describe(&self) -> String {
        let ty = self.field_type.as_ref();
        let type_name = ty.and_then(TypeRef::resolved_name).unwrap_or("?");
        let kind = ty.and_then(|t| t.kind.as_deref()).unwrap_or("");
        let required = if ty.is_some_and(TypeRef::is_required) { " (required)" } else { "" };
        format!("{}: {} {}{}", self.name, type_name, kind, required)
    }
}

/// Attributes that look like leftovers of NetBox custom fields
pub fn find_custom_like_fields(fields: &[SchemaField]) -> Vec<&str> {
    fields
        .iter()
        .map(|f| f.name.as_str())
        .filter(|name| name.to_lowercase().contains("custom") || name.starts_with("cf_"))
        .collect()
}

/// Schema type holding the custom fields of a category
pub fn type_for_category(category: FieldCategory, namespace: &str) -> Option<String> {
    match category {
        FieldCategory::Device | FieldCategory::NetworkServices => Some(format!("{}Device", namespace)),
        FieldCategory::Interfaces => Some(format!("{}Interfaces", namespace)),
        FieldCategory::Routing => Some(format!("{}Routing", namespace)),
        FieldCategory::Other => None,
    }
}

/// Expected vs present custom fields for one schema type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCoverage {
    pub schema_type: String,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    /// False when the type itself was not found
    pub type_found: bool,
}

/// Migration coverage across all schema types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub types: Vec<TypeCoverage>,
    /// Custom fields with no target type
    pub unmapped: Vec<String>,
    pub total_expected: usize,
    pub total_present: usize,
}

/// Group expected custom fields by the schema type that should carry them
pub fn expected_by_type(fields: &[String], namespace: &str) -> (BTreeMap<String, Vec<String>>, Vec<String>) {
    let mut by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut unmapped = Vec::new();

    for (category, names) in categorize(fields) {
        match type_for_category(category, namespace) {
            Some(ty) => by_type.entry(ty).or_default().extend(names),
            None => unmapped.extend(names),
        }
    }

    for names in by_type.values_mut() {
        names.sort();
    }
    (by_type, unmapped)
}

/// Compare expected custom fields of one type with its introspected fields.
///
/// `schema_fields` is `None` when the type is missing from the schema.
pub fn type_coverage(schema_type: &str, expected: &[String], schema_fields: Option<&[SchemaField]>) -> TypeCoverage {
    let available: BTreeSet<&str> = schema_fields
        .unwrap_or_default()
        .iter()
        .map(|f| f.name.as_str())
        .collect();

    let (present, missing): (Vec<String>, Vec<String>) = expected
        .iter()
        .cloned()
        .partition(|name| available.contains(name.as_str()));

    TypeCoverage {
        schema_type: schema_type.to_string(),
        present,
        missing,
        type_found: schema_fields.is_some(),
    }
}

impl CoverageReport {
    pub fn new(types: Vec<TypeCoverage>, unmapped: Vec<String>) -> Self {
        let total_present = types.iter().map(|t| t.present.len()).sum();
        let total_expected = types
            .iter()
            .map(|t| t.present.len() + t.missing.len())
            .sum();
        Self {
            types,
            unmapped,
            total_expected,
            total_present,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_present == self.total_expected
    }
}
