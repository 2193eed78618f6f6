//! SNMP dropdown values and `SchemaDropdownAdd` payload construction.

use crate::schema::SchemaField;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Input type introspected before building payloads
pub const DROPDOWN_INPUT_TYPE: &str = "SchemaDropdownAddInput";

/// Default dropdowns, replaced by the `[dropdowns]` config table
pub fn default_dropdowns() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &str); 6] = [
        (
            "snmp_location",
            "int.jeyriku.net, 2 allee des campagnols, Seynod, 74600, Annecy, France [45.85995, 6.0793]",
        ),
        ("snmp_community", "jeyricorp"),
        ("snmp_server1", "192.168.0.239"),
        ("snmp_server2", "192.168.0.248"),
        ("snmp_server3", "192.168.0.249"),
        ("snmp_server4", "192.168.0.251"),
    ];

    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), vec![value.to_string()]))
        .collect()
}

/// Map a dropdown onto whichever input fields the server accepts.
///
/// The name fills `attribute`, `dropdown` and `label`; `kind` defaults to
/// `profile`. Values go into `object` entries when that field exists, else
/// into `values` if the input has any of `value`, `values` or `items`.
pub fn build_suggested_payload(name: &str, values: &[String], input_fields: &[SchemaField]) -> Map<String, Value> {
    let names: BTreeSet<&str> = input_fields.iter().map(|f| f.name.as_str()).collect();
    let mut data = Map::new();

    for key in ["attribute", "dropdown"] {
        if names.contains(key) {
            data.insert(key.to_string(), json!(name));
        }
    }
    if names.contains("kind") {
        data.insert("kind".to_string(), json!("profile"));
    }
    if names.contains("label") {
        data.insert("label".to_string(), json!(name));
    }

    if names.contains("object") {
        let objects: Vec<Value> = values
            .iter()
            .map(|v| json!({ "value": v, "label": v, "description": "" }))
            .collect();
        data.insert("object".to_string(), Value::Array(objects));
    } else if ["value", "values", "items"].iter().any(|k| names.contains(k)) {
        data.insert("values".to_string(), json!(values));
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<SchemaField> {
        names
            .iter()
            .map(|n| SchemaField {
                name: n.to_string(),
                description: None,
                field_type: None,
            })
            .collect()
    }

    #[test]
    fn test_default_dropdowns() {
        let dropdowns = default_dropdowns();
        assert_eq!(dropdowns.len(), 6);
        assert_eq!(dropdowns["snmp_community"], vec!["jeyricorp"]);
        assert_eq!(dropdowns["snmp_server4"], vec!["192.168.0.251"]);
    }

    #[test]
    fn test_payload_with_object_field() {
        let values = vec!["jeyricorp".to_string()];
        let payload = build_suggested_payload(
            "snmp_community",
            &values,
            &fields(&["kind", "attribute", "dropdown", "label", "object", "values"]),
        );

        assert_eq!(payload["attribute"], "snmp_community");
        assert_eq!(payload["dropdown"], "snmp_community");
        assert_eq!(payload["kind"], "profile");
        assert_eq!(
            payload["object"],
            json!([{ "value": "jeyricorp", "label": "jeyricorp", "description": "" }])
        );
        assert!(!payload.contains_key("values"));
    }

    #[test]
    fn test_payload_falls_back_to_values() {
        let values = vec!["192.168.0.239".to_string()];
        let payload = build_suggested_payload("snmp_server1", &values, &fields(&["dropdown", "items"]));
        assert_eq!(payload["values"], json!(["192.168.0.239"]));
        assert!(!payload.contains_key("label"));

        let bare = build_suggested_payload("snmp_server1", &values, &fields(&["description"]));
        assert!(bare.is_empty());
    }
}
