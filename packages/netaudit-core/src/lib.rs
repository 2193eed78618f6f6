//! netaudit Core Library
//!
//! This crate provides the core functionality behind the `netaudit` CLI:
//! - Completeness audits of an Infrahub source of truth (devices, interfaces,
//!   sites, platforms, and a consolidated full audit)
//! - Infrahub GraphQL client, schema introspection and dropdown creation
//! - Custom-field extraction from Jinja/YAML templates
//! - NetBox REST export and Cisco `show version` parsing
//!
//! # Example
//!
//! ```no_run
//! use netaudit_core::audit::{full_audit, AuditOutcome};
//! use netaudit_core::{config, InfrahubClient, Snapshot};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = config::load_config();
//!     let client = InfrahubClient::new(&config)?;
//!
//!     // Fetch everything once, then audit offline
//!     let snapshot = Snapshot::fetch(&client).await?;
//!     let audit = full_audit(&snapshot, &config);
//!
//!     for line in audit.report.priority_issues() {
//!         println!("{}", line);
//!     }
//!     std::process::exit(audit.report.exit_code());
//! }
//! ```

pub mod audit;
pub mod check;
pub mod client;
pub mod config;
pub mod custom_fields;
pub mod dropdowns;
pub mod error;
pub mod netbox;
pub mod record;
pub mod report;
pub mod requirements;
pub mod schema;
pub mod show_version;
pub mod snapshot;

// Re-export commonly used types
pub use check::{AuditResult, Issue, IssueKind, Severity};
pub use client::InfrahubClient;
pub use config::{AuditConfig, ConfigSource};
pub use error::ApiError;
pub use requirements::{ObjectKind, Requirements};
pub use snapshot::Snapshot;
