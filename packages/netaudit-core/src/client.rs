//! GraphQL client for the Infrahub source of truth.

use crate::config::AuditConfig;
use crate::error::ApiError;
use crate::requirements::ObjectKind;
use crate::schema::SchemaField;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Header carrying the Infrahub API token
const TOKEN_HEADER: &str = "X-INFRAHUB-KEY";

const DEVICE_SELECTION: &str = r#"
        id
        name { value }
        primary_address { node { address { value } } }
        site { node { name { value } } }
        role { value }
        type { value }
        status { value }
        platform { node { name { value } ansible_network_os { value } } }
        interfaces { count }
        description { value }"#;

const INTERFACE_SELECTION: &str = r#"
        id
        name { value }
        device { node { name { value } } }
        status { value }
        enabled { value }
        mtu { value }
        ip_addresses { count }
        description { value }"#;

const SITE_SELECTION: &str = r#"
        id
        name { value }
        location { value }
        devices { count }
        description { value }"#;

const PLATFORM_SELECTION: &str = r#"
        id
        name { value }
        ansible_network_os { value }
        manufacturer { value }
        description { value }"#;

const TYPE_QUERY: &str = "query IntrospectType($name: String!) { \
    __type(name: $name) { name fields { name description type { name kind } } } }";

const INPUT_QUERY: &str = "query IntrospectInput($name: String!) { \
    __type(name: $name) { name inputFields { name description \
    type { kind name ofType { kind name ofType { kind name } } } } } }";

const ACCOUNTS_QUERY: &str = "{ CoreAccountList { edges { node { id } } } }";

const DROPDOWN_MUTATION: &str = r#"
    mutation SchemaDropdownAdd($data: SchemaDropdownAddInput!) {
      SchemaDropdownAdd(data: $data) { ok object { value label description } }
    }"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

/// Build a list query returning every node of `kind` with `selection`
pub fn list_query(kind: &str, selection: &str) -> String {
    format!(
        "query GetAll{kind} {{\n  {kind} {{\n    edges {{\n      node {{{selection}\n      }}\n    }}\n  }}\n}}"
    )
}

/// Messages from a GraphQL `errors` array, if the body has one
pub fn graphql_errors(body: &Value) -> Option<Vec<String>> {
    let errors = body.get("errors")?.as_array()?;
    Some(
        errors
            .iter()
            .map(|e| match e.get("message").and_then(Value::as_str) {
                Some(msg) => msg.to_string(),
                None => e.to_string(),
            })
            .collect(),
    )
}

/// Nodes under `data.<kind>.edges[].node`; empty when the kind is absent
pub fn nodes_from_data(data: &Value, kind: &str) -> Vec<Value> {
    data.get(kind)
        .and_then(|k| k.get("edges"))
        .and_then(Value::as_array)
        .map(|edges| edges.iter().filter_map(|e| e.get("node").cloned()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct InfrahubClient {
    http: reqwest::Client,
    endpoint: String,
    namespace: String,
    has_token: bool,
}

impl InfrahubClient {
    pub fn new(config: &AuditConfig) -> Result<Self, ApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(token)
                .map_err(|e| ApiError::Config(format!("INFRAHUB_API_TOKEN is not a valid header value: {}", e)))?;
            headers.insert(TOKEN_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.graphql_endpoint.clone(),
            namespace: config.schema_namespace.clone(),
            has_token: config.api_token.is_some(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a GraphQL document and return its `data` member.
    pub async fn execute_query(&self, query: &str, variables: Option<&Value>) -> Result<Value, ApiError> {
        tracing::debug!("POST {}", self.endpoint);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .inspect_err(|e| tracing::error!("API request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("GraphQL endpoint returned {}: {}", status, body);
            return Err(ApiError::Status { status, body });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if let Some(errors) = graphql_errors(&body) {
            tracing::error!("GraphQL errors: {:?}", errors);
            return Err(ApiError::GraphQl(errors));
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn list_nodes(&self, kind: ObjectKind, selection: &str) -> Result<Vec<Value>, ApiError> {
        let graphql_kind = kind.graphql_kind(&self.namespace);
        let data = self
            .execute_query(&list_query(&graphql_kind, selection), None)
            .await?;
        let nodes = nodes_from_data(&data, &graphql_kind);
        tracing::info!("{} {} objects fetched", nodes.len(), graphql_kind);
        Ok(nodes)
    }

    pub async fn get_all_devices(&self) -> Result<Vec<Value>, ApiError> {
        self.list_nodes(ObjectKind::Device, DEVICE_SELECTION).await
    }

    pub async fn get_all_interfaces(&self) -> Result<Vec<Value>, ApiError> {
        self.list_nodes(ObjectKind::Interface, INTERFACE_SELECTION).await
    }

    pub async fn get_all_sites(&self) -> Result<Vec<Value>, ApiError> {
        self.list_nodes(ObjectKind::Site, SITE_SELECTION).await
    }

    pub async fn get_all_platforms(&self) -> Result<Vec<Value>, ApiError> {
        self.list_nodes(ObjectKind::Platform, PLATFORM_SELECTION).await
    }

    async fn introspect(&self, query: &str, name: &str, member: &str) -> Result<Option<Vec<SchemaField>>, ApiError> {
        let variables = serde_json::json!({ "name": name });
        let data = self.execute_query(query, Some(&variables)).await?;

        let Some(fields) = data.get("__type").and_then(|t| t.get(member)) else {
            tracing::warn!("Type '{}' not found in schema", name);
            return Ok(None);
        };

        serde_json::from_value(fields.clone())
            .map(Some)
            .map_err(|e| ApiError::Decode(format!("{} of {}: {}", member, name, e)))
    }

    /// Fields of an object type, `None` when the type does not exist
    pub async fn introspect_type(&self, name: &str) -> Result<Option<Vec<SchemaField>>, ApiError> {
        self.introspect(TYPE_QUERY, name, "fields").await
    }

    /// Input fields of an input type, `None` when the type does not exist
    pub async fn introspect_input(&self, name: &str) -> Result<Option<Vec<SchemaField>>, ApiError> {
        self.introspect(INPUT_QUERY, name, "inputFields").await
    }

    /// Probe authentication by listing accounts; returns how many were visible
    pub async fn check_auth(&self) -> Result<usize, ApiError> {
        if !self.has_token {
            return Err(ApiError::MissingToken("INFRAHUB_API_TOKEN"));
        }
        let data = self.execute_query(ACCOUNTS_QUERY, None).await?;
        Ok(nodes_from_data(&data, "CoreAccountList").len())
    }

    /// Create a schema dropdown; returns the mutation's `SchemaDropdownAdd` member
    pub async fn add_dropdown(&self, payload: &Value) -> Result<Value, ApiError> {
        let variables = serde_json::json!({ "data": payload });
        let data = self.execute_query(DROPDOWN_MUTATION, Some(&variables)).await?;
        Ok(data.get("SchemaDropdownAdd").cloned().unwrap_or(Value::Null))
    }
}
