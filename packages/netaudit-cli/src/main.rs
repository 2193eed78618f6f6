//! netaudit CLI - completeness audits for an Infrahub source of truth
//!
//! This binary provides:
//! - Device, interface, site and platform audits, alone or combined
//! - A device inventory walk (health, role and platform distribution)
//! - Custom-field extraction from templates and schema coverage checks
//! - SNMP dropdown creation, NetBox export and `show version` parsing

mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use netaudit_core::audit::{
    audit_devices, audit_interfaces, audit_inventory, audit_platforms, audit_sites, full_audit, Sections,
};
use netaudit_core::config::{self, AuditConfig};
use netaudit_core::custom_fields::{categorize, extract_custom_fields};
use netaudit_core::dropdowns::{build_suggested_payload, DROPDOWN_INPUT_TYPE};
use netaudit_core::netbox::{filter_by_name, merge_json_files, project_devices, DeviceRow, NetboxClient};
use netaudit_core::report::{default_report_path, save_report};
use netaudit_core::schema::{expected_by_type, find_custom_like_fields, type_coverage, CoverageReport};
use netaudit_core::show_version::{parse_show_version, write_outputs};
use netaudit_core::{InfrahubClient, ObjectKind, Snapshot};
use output::{finish_audit, list_section, print_json};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit status for a failed run (configuration, network, I/O)
const EXIT_FAILURE: u8 = 2;
const EXIT_AUTH_FAILED: u8 = 3;
const EXIT_INPUT_MISSING: u8 = 3;
const EXIT_INTROSPECTION_FAILED: u8 = 4;

#[derive(Parser)]
#[command(name = "netaudit")]
#[command(author = "Jeyriku.net")]
#[command(version)]
#[command(about = "Completeness audits and helper tools for an Infrahub source of truth")]
#[command(long_about = "
netaudit checks the objects of an Infrahub instance against field
requirement tables and cross-references them (orphan interfaces,
undefined sites and platforms, wrong ansible_network_os).

Quick start:
  1. Point at Infrahub:  export INFRAHUB_API_URL=http://infrahub:8000
                         export INFRAHUB_API_TOKEN=...
  2. Run every audit:    netaudit full
  3. Replay offline:     netaudit snapshot -o snap.json
                         netaudit full --from-file snap.json

Exit status: 0 clean, 1 findings, 2 failure.
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Args)]
pub struct AuditArgs {
    /// Report file (default: <reports dir>/audit_<type>_<timestamp>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Audit a snapshot file instead of querying Infrahub
    #[arg(long, value_name = "SNAPSHOT")]
    from_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit devices against the device requirement table
    Devices(AuditArgs),

    /// Audit interfaces and find orphans
    Interfaces(AuditArgs),

    /// Audit sites and their use by devices
    Sites(AuditArgs),

    /// Audit platforms and their ansible_network_os
    Platforms(AuditArgs),

    /// Run all audits and write a consolidated report
    #[command(alias = "all")]
    Full(AuditArgs),

    /// Walk the device inventory (health, roles, platforms, summary table)
    Inventory {
        /// Device health counters
        #[arg(long)]
        devices: bool,

        /// Devices grouped by role
        #[arg(long)]
        roles: bool,

        /// Devices grouped by platform
        #[arg(long)]
        platforms: bool,

        /// One line per device
        #[arg(long)]
        summary: bool,

        #[command(flatten)]
        args: AuditArgs,
    },

    /// Fetch every audited object and save it for offline audits
    Snapshot {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Legacy custom fields referenced by templates
    #[command(subcommand)]
    CustomFields(CustomFieldsCommand),

    /// Show the fields of a schema type
    Schema {
        /// GraphQL type name, e.g. JeylanDevice
        type_name: String,
    },

    /// Create the SNMP dropdowns in the schema
    Dropdowns {
        /// Run the mutations instead of only printing payloads
        #[arg(long)]
        yes: bool,
    },

    /// Parse a Cisco `show version` capture into JSON and YAML
    ShowVersion {
        /// Captured `show version` output
        input: PathBuf,

        /// Output path without extension
        prefix: PathBuf,
    },

    /// NetBox device export and lookup
    #[command(subcommand)]
    Netbox(NetboxCommand),

    /// JSON file helpers
    #[command(subcommand)]
    Json(JsonCommand),

    /// Show configuration paths and settings
    Config,
}

#[derive(Subcommand)]
pub enum CustomFieldsCommand {
    /// List custom fields referenced under a template directory
    Extract {
        #[arg(short, long, default_value = "templates")]
        templates: PathBuf,
    },

    /// Check which referenced custom fields exist in the schema
    Check {
        #[arg(short, long, default_value = "templates")]
        templates: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum NetboxCommand {
    /// Export devices with their SNMP custom fields
    Export {
        /// Write the projected rows to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also keep the raw API response
        #[arg(long)]
        raw: Option<PathBuf>,
    },

    /// Save the raw devices, interfaces and IP addresses collections
    Dump {
        /// Directory receiving devices.json, ifaces.json and ips.json
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Look a device up by name
    Lookup {
        name: String,

        /// Search a file written by `netbox export` instead of querying NetBox
        #[arg(long, value_name = "ROWS")]
        from_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum JsonCommand {
    /// Merge every *.json file of a directory into one array
    Merge {
        dir: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("netaudit={},netaudit_core={}", log_level, log_level).into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config();

    let result = match &cli.command {
        Commands::Devices(args) => cmd_devices(&cli, &config, args).await,
        Commands::Interfaces(args) => cmd_interfaces(&cli, &config, args).await,
        Commands::Sites(args) => cmd_sites(&cli, &config, args).await,
        Commands::Platforms(args) => cmd_platforms(&cli, &config, args).await,
        Commands::Full(args) => cmd_full(&cli, &config, args).await,
        Commands::Inventory {
            devices,
            roles,
            platforms,
            summary,
            args,
        } => {
            let sections = Sections {
                devices: *devices,
                roles: *roles,
                platforms: *platforms,
                summary: *summary,
            };
            cmd_inventory(&cli, &config, sections, args).await
        }
        Commands::Snapshot { output } => cmd_snapshot(&cli, &config, output).await,
        Commands::CustomFields(CustomFieldsCommand::Extract { templates }) => cmd_extract(&cli, templates),
        Commands::CustomFields(CustomFieldsCommand::Check { templates }) => {
            cmd_custom_fields_check(&cli, &config, templates).await
        }
        Commands::Schema { type_name } => cmd_schema(&cli, &config, type_name).await,
        Commands::Dropdowns { yes } => cmd_dropdowns(&cli, &config, *yes).await,
        Commands::ShowVersion { input, prefix } => cmd_show_version(&cli, input, prefix),
        Commands::Netbox(NetboxCommand::Export { output, raw }) => {
            cmd_netbox_export(&cli, &config, output.as_deref(), raw.as_deref()).await
        }
        Commands::Netbox(NetboxCommand::Dump { dir }) => cmd_netbox_dump(&cli, &config, dir).await,
        Commands::Netbox(NetboxCommand::Lookup { name, from_file }) => {
            cmd_netbox_lookup(&cli, &config, name, from_file.as_deref()).await
        }
        Commands::Json(JsonCommand::Merge { dir, output }) => cmd_json_merge(&cli, dir, output),
        Commands::Config => cmd_config(&cli, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Records for the given kinds, from a snapshot file or fetched live
async fn load_records(config: &AuditConfig, from_file: Option<&Path>, kinds: &[ObjectKind]) -> Result<Snapshot> {
    if let Some(path) = from_file {
        return Snapshot::load(path);
    }

    let client = InfrahubClient::new(config)?;
    tracing::info!("Querying {}", client.endpoint());

    let mut snapshot = Snapshot::default();
    for kind in kinds {
        match kind {
            ObjectKind::Device => snapshot.devices = client.get_all_devices().await?,
            ObjectKind::Interface => snapshot.interfaces = client.get_all_interfaces().await?,
            ObjectKind::Site => snapshot.sites = client.get_all_sites().await?,
            ObjectKind::Platform => snapshot.platforms = client.get_all_platforms().await?,
        }
    }
    snapshot.fetched_at = Some(chrono::Local::now().to_rfc3339());
    Ok(snapshot)
}

fn report_path(config: &AuditConfig, args: &AuditArgs, stem: &str) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| default_report_path(&config.reports_dir, stem, &chrono::Local::now()))
}

async fn cmd_devices(cli: &Cli, config: &AuditConfig, args: &AuditArgs) -> Result<u8> {
    let snapshot = load_records(config, args.from_file.as_deref(), &[ObjectKind::Device]).await?;
    let report = audit_devices(&snapshot.devices, &config.requirements);
    let details = output::device_details(&report);
    finish_audit(cli, &report, &report_path(config, args, "devices"), details)
}

async fn cmd_interfaces(cli: &Cli, config: &AuditConfig, args: &AuditArgs) -> Result<u8> {
    let kinds = [ObjectKind::Interface, ObjectKind::Device];
    let snapshot = load_records(config, args.from_file.as_deref(), &kinds).await?;
    let report = audit_interfaces(&snapshot.interfaces, &snapshot.devices, &config.requirements);
    let details = output::interface_details(&report);
    finish_audit(cli, &report, &report_path(config, args, "interfaces"), details)
}

async fn cmd_sites(cli: &Cli, config: &AuditConfig, args: &AuditArgs) -> Result<u8> {
    let kinds = [ObjectKind::Site, ObjectKind::Device];
    let snapshot = load_records(config, args.from_file.as_deref(), &kinds).await?;
    let report = audit_sites(&snapshot.sites, &snapshot.devices, &config.requirements);
    let details = output::site_details(&report);
    finish_audit(cli, &report, &report_path(config, args, "sites"), details)
}

async fn cmd_platforms(cli: &Cli, config: &AuditConfig, args: &AuditArgs) -> Result<u8> {
    let kinds = [ObjectKind::Platform, ObjectKind::Device];
    let snapshot = load_records(config, args.from_file.as_deref(), &kinds).await?;
    let report = audit_platforms(
        &snapshot.platforms,
        &snapshot.devices,
        &config.requirements,
        &config.expected_network_os,
    );
    let details = output::platform_details(&report);
    finish_audit(cli, &report, &report_path(config, args, "platforms"), details)
}

async fn cmd_full(cli: &Cli, config: &AuditConfig, args: &AuditArgs) -> Result<u8> {
    let snapshot = load_records(config, args.from_file.as_deref(), &ObjectKind::ALL).await?;
    let audit = full_audit(&snapshot, config);

    // Individual reports share one timestamp
    let now = chrono::Local::now();
    let dir = &config.reports_dir;
    save_report(&audit.devices, &default_report_path(dir, "devices", &now))?;
    save_report(&audit.interfaces, &default_report_path(dir, "interfaces", &now))?;
    save_report(&audit.sites, &default_report_path(dir, "sites", &now))?;
    save_report(&audit.platforms, &default_report_path(dir, "platforms", &now))?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(dir, "full", &now));
    let details = output::full_details(&audit.report);
    finish_audit(cli, &audit.report, &path, details)
}

async fn cmd_inventory(cli: &Cli, config: &AuditConfig, sections: Sections, args: &AuditArgs) -> Result<u8> {
    let snapshot = load_records(config, args.from_file.as_deref(), &[ObjectKind::Device]).await?;
    let report = audit_inventory(&snapshot.devices, sections);

    let path = report_path(config, args, "inventory");
    save_report(&report, &path)?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", report.render());
            println!();
            println!("Report saved: {}", path.display());
        }
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(0)
}

async fn cmd_snapshot(cli: &Cli, config: &AuditConfig, output: &Path) -> Result<u8> {
    let client = InfrahubClient::new(config)?;
    let snapshot = Snapshot::fetch(&client).await?;
    snapshot.save(output)?;

    match cli.format {
        OutputFormat::Text => {
            println!("Snapshot of {} saved to {}", client.endpoint(), output.display());
            println!("  Devices:    {}", snapshot.devices.len());
            println!("  Interfaces: {}", snapshot.interfaces.len());
            println!("  Sites:      {}", snapshot.sites.len());
            println!("  Platforms:  {}", snapshot.platforms.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "path": output,
                "devices": snapshot.devices.len(),
                "interfaces": snapshot.interfaces.len(),
                "sites": snapshot.sites.len(),
                "platforms": snapshot.platforms.len(),
                "fetched_at": snapshot.fetched_at,
            }));
        }
    }
    Ok(0)
}

fn cmd_extract(cli: &Cli, templates: &Path) -> Result<u8> {
    let extraction = extract_custom_fields(templates)?;
    let categories = categorize(&extraction.fields);

    match cli.format {
        OutputFormat::Text => {
            println!(
                "{} custom fields referenced in {} files",
                extraction.fields.len(),
                extraction.files_scanned
            );
            for (category, names) in &categories {
                println!();
                println!("{}:", category);
                for name in names {
                    println!("  - {}", name);
                }
            }
            for line in list_section("Unreadable files", &display_paths(&extraction.skipped)) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let by_category: serde_json::Map<String, serde_json::Value> = categories
                .iter()
                .map(|(category, names)| (category.to_string(), serde_json::json!(names)))
                .collect();
            println!("{}", serde_json::json!({
                "fields": extraction.fields,
                "categories": by_category,
                "files_scanned": extraction.files_scanned,
                "hits_per_file": extraction.hits_per_file,
                "skipped": extraction.skipped,
            }));
        }
    }
    Ok(0)
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

async fn cmd_custom_fields_check(cli: &Cli, config: &AuditConfig, templates: &Path) -> Result<u8> {
    let extraction = extract_custom_fields(templates)?;
    let (by_type, unmapped) = expected_by_type(&extraction.fields, &config.schema_namespace);

    let client = InfrahubClient::new(config)?;
    let mut types = Vec::with_capacity(by_type.len());
    for (schema_type, expected) in &by_type {
        let fields = client.introspect_type(schema_type).await?;
        types.push(type_coverage(schema_type, expected, fields.as_deref()));
    }
    let coverage = CoverageReport::new(types, unmapped);

    match cli.format {
        OutputFormat::Text => {
            for t in &coverage.types {
                println!();
                if !t.type_found {
                    println!("{}: type not found in schema", t.schema_type);
                } else {
                    println!(
                        "{}: {}/{} custom fields present",
                        t.schema_type,
                        t.present.len(),
                        t.present.len() + t.missing.len()
                    );
                }
                for name in &t.present {
                    println!("  ok      {}", name);
                }
                for name in &t.missing {
                    println!("  missing {}", name);
                }
            }
            for line in list_section("Fields with no target type", &coverage.unmapped) {
                println!("{}", line);
            }
            println!();
            println!(
                "Total: {}/{} custom fields present",
                coverage.total_present, coverage.total_expected
            );
        }
        OutputFormat::Json => print_json(&coverage)?,
    }

    Ok(if coverage.is_complete() { 0 } else { 1 })
}

async fn cmd_schema(cli: &Cli, config: &AuditConfig, type_name: &str) -> Result<u8> {
    let client = InfrahubClient::new(config)?;
    let Some(fields) = client.introspect_type(type_name).await? else {
        match cli.format {
            OutputFormat::Text => println!("Type '{}' not found", type_name),
            OutputFormat::Json => println!("{}", serde_json::json!({ "type": type_name, "found": false })),
        }
        return Ok(1);
    };
    let custom = find_custom_like_fields(&fields);

    match cli.format {
        OutputFormat::Text => {
            println!("{}: {} fields", type_name, fields.len());
            if custom.is_empty() {
                println!("No custom-field-like attributes");
            } else {
                for line in list_section("Custom-field-like attributes", &custom) {
                    println!("{}", line);
                }
            }
            println!();
            println!("Fields:");
            for field in &fields {
                println!("  - {}", field.describe());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "type": type_name,
                "found": true,
                "fields": fields,
                "custom_like": custom,
            }));
        }
    }
    Ok(0)
}

async fn cmd_dropdowns(cli: &Cli, config: &AuditConfig, yes: bool) -> Result<u8> {
    if config.api_token.is_none() {
        eprintln!("INFRAHUB_API_TOKEN is not set. Export it and try again.");
        return Ok(EXIT_FAILURE);
    }

    let client = InfrahubClient::new(config)?;
    tracing::info!("Checking authentication against {}", client.endpoint());
    if let Err(e) = client.check_auth().await {
        eprintln!("Authentication failed: {}", e);
        return Ok(EXIT_AUTH_FAILED);
    }

    let input_fields = match client.introspect_input(DROPDOWN_INPUT_TYPE).await {
        Ok(Some(fields)) => fields,
        Ok(None) => {
            eprintln!("{} not found in schema", DROPDOWN_INPUT_TYPE);
            return Ok(EXIT_INTROSPECTION_FAILED);
        }
        Err(e) => {
            eprintln!("Introspection of {} failed: {}", DROPDOWN_INPUT_TYPE, e);
            return Ok(EXIT_INTROSPECTION_FAILED);
        }
    };

    let payloads: Vec<(String, serde_json::Value)> = config
        .dropdowns
        .iter()
        .map(|(name, values)| {
            let payload = build_suggested_payload(name, values, &input_fields);
            (name.clone(), serde_json::Value::Object(payload))
        })
        .collect();

    if let OutputFormat::Text = cli.format {
        println!("{} fields:", DROPDOWN_INPUT_TYPE);
        for field in &input_fields {
            println!("  - {}", field.describe());
        }
        println!();
        println!("Suggested payloads:");
        for (name, payload) in &payloads {
            println!();
            println!("-- {} --", name);
            println!("{}", serde_json::to_string_pretty(payload)?);
        }
    }

    if !yes {
        match cli.format {
            OutputFormat::Text => {
                println!();
                println!("Re-run with --yes to create these dropdowns.");
            }
            OutputFormat::Json => {
                let suggested: serde_json::Map<String, serde_json::Value> = payloads.into_iter().collect();
                print_json(&serde_json::json!({ "input_fields": input_fields, "payloads": suggested }))?;
            }
        }
        return Ok(0);
    }

    let mut failures = 0;
    let mut created = serde_json::Map::new();
    for (name, payload) in &payloads {
        match client.add_dropdown(payload).await {
            Ok(resp) => {
                tracing::info!("Created dropdown {}", name);
                created.insert(name.clone(), resp);
            }
            Err(e) => {
                tracing::error!("Failed to create dropdown {}: {}", name, e);
                created.insert(name.clone(), serde_json::json!({ "error": e.to_string() }));
                failures += 1;
            }
        }
    }

    match cli.format {
        OutputFormat::Text => {
            println!();
            for (name, resp) in &created {
                println!("-- {} --", name);
                println!("{}", serde_json::to_string_pretty(resp)?);
            }
        }
        OutputFormat::Json => print_json(&created)?,
    }

    Ok(if failures == 0 { 0 } else { 1 })
}

fn cmd_show_version(cli: &Cli, input: &Path, prefix: &Path) -> Result<u8> {
    if !input.exists() {
        eprintln!("Input file not found: {}", input.display());
        return Ok(EXIT_INPUT_MISSING);
    }

    let bytes = std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let parsed = parse_show_version(&String::from_utf8_lossy(&bytes));
    let (json_path, yaml_path) = write_outputs(&parsed, prefix)?;

    match cli.format {
        OutputFormat::Text => {
            println!("Wrote: {}", json_path.display());
            println!("Wrote: {}", yaml_path.display());
        }
        OutputFormat::Json => print_json(&parsed)?,
    }
    Ok(0)
}

fn print_rows(cli: &Cli, rows: &[&DeviceRow]) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            for row in rows {
                println!(
                    "{:30} {:18} {:12} {:16} {}",
                    row.name.as_deref().unwrap_or("-"),
                    row.ip.as_deref().unwrap_or("-"),
                    row.snmp_com.as_deref().unwrap_or("-"),
                    row.snmp_srv.as_deref().unwrap_or("-"),
                    row.snmp_loc.as_deref().unwrap_or("-"),
                );
            }
            Ok(())
        }
        OutputFormat::Json => print_json(rows),
    }
}

async fn cmd_netbox_export(cli: &Cli, config: &AuditConfig, output: Option<&Path>, raw: Option<&Path>) -> Result<u8> {
    let client = NetboxClient::new(&config.netbox)?;
    let response = client.devices().await?;
    if let Some(path) = raw {
        save_report(&response, path)?;
    }

    let rows = project_devices(&response);
    if let Some(path) = output {
        save_report(&rows, path)?;
    }

    let refs: Vec<&DeviceRow> = rows.iter().collect();
    print_rows(cli, &refs)?;
    Ok(0)
}

async fn cmd_netbox_dump(cli: &Cli, config: &AuditConfig, dir: &Path) -> Result<u8> {
    let client = NetboxClient::new(&config.netbox)?;
    let dump = client.fetch_inventory().await?;
    let written = dump.save(dir)?;
    let (devices, interfaces, ip_addresses) = dump.counts();

    match cli.format {
        OutputFormat::Text => {
            println!("Devices:      {}", devices);
            println!("Interfaces:   {}", interfaces);
            println!("IP addresses: {}", ip_addresses);
            println!();
            for path in &written {
                println!("Saved: {}", path.display());
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "devices": devices,
            "interfaces": interfaces,
            "ip_addresses": ip_addresses,
            "files": written,
        }))?,
    }
    Ok(0)
}

async fn cmd_netbox_lookup(cli: &Cli, config: &AuditConfig, name: &str, from_file: Option<&Path>) -> Result<u8> {
    let rows: Vec<DeviceRow> = match from_file {
        Some(path) => {
            let content =
                std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => project_devices(&NetboxClient::new(&config.netbox)?.devices().await?),
    };

    let matches = filter_by_name(&rows, name);
    if matches.is_empty() {
        tracing::warn!("No device named '{}'", name);
        return Ok(1);
    }
    print_rows(cli, &matches)?;
    Ok(0)
}

fn cmd_json_merge(cli: &Cli, dir: &Path, output: &Path) -> Result<u8> {
    let merged = merge_json_files(dir, Some(output))?;
    save_report(&merged, output)?;

    match cli.format {
        OutputFormat::Text => println!("Merged {} files into {}", merged.len(), output.display()),
        OutputFormat::Json => println!("{}", serde_json::json!({ "merged": merged.len(), "output": output })),
    }
    Ok(0)
}

fn cmd_config(cli: &Cli, config: &AuditConfig) -> Result<u8> {
    let config_path = config::get_config_file_path_string();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration");
            println!("=============");
            println!();
            println!("Config file:      {}", config_path);
            println!("Infrahub API:     {} (from {})", config.api_url, config.source);
            println!("GraphQL endpoint: {}", config.graphql_endpoint);
            println!("API token:        {}", if config.api_token.is_some() { "set" } else { "not set" });
            println!("Verify TLS:       {}", config.verify_ssl);
            println!("Schema namespace: {}", config.schema_namespace);
            println!("Reports dir:      {}", config.reports_dir.display());
            println!("NetBox URL:       {}", config.netbox.url);
            println!();
            println!("Environment variables:");
            println!("  INFRAHUB_API_URL     - Override Infrahub base URL");
            println!("  INFRAHUB_API_TOKEN   - API token (INFRAHUB_TOKEN also accepted)");
            println!("  INFRAHUB_VERIFY_SSL  - Set to true to verify TLS certificates");
            println!("  NETAUDIT_REPORTS_DIR - Override report directory");
            println!("  NETBOX_URL, NETBOX_TOKEN - NetBox access");
            println!();
            println!("Example config.toml:");
            println!();
            println!("{}", config::generate_example_config());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({
                "config_file": config_path,
                "api_url": config.api_url,
                "api_source": format!("{}", config.source),
                "graphql_endpoint": config.graphql_endpoint,
                "api_token_set": config.api_token.is_some(),
                "verify_ssl": config.verify_ssl,
                "schema_namespace": config.schema_namespace,
                "reports_dir": config.reports_dir,
                "netbox_url": config.netbox.url,
            }));
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_audit_flags() {
        let cli = Cli::try_parse_from(["netaudit", "-f", "json", "sites", "--from-file", "snap.json"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Commands::Sites(args) => {
                assert_eq!(args.from_file, Some(PathBuf::from("snap.json")));
                assert!(args.output.is_none());
            }
            _ => panic!("expected sites command"),
        }
    }

    #[test]
    fn test_parse_netbox_dump_dir() {
        let cli = Cli::try_parse_from(["netaudit", "netbox", "dump", "--dir", "inventory"]).unwrap();
        match cli.command {
            Commands::Netbox(NetboxCommand::Dump { dir }) => assert_eq!(dir, PathBuf::from("inventory")),
            _ => panic!("expected netbox dump command"),
        }
    }

    #[test]
    fn test_show_version_requires_both_paths() {
        assert!(Cli::try_parse_from(["netaudit", "show-version", "capture.txt"]).is_err());
    }

    #[test]
    fn test_show_version_missing_input_exit_code() {
        let cli = Cli::try_parse_from(["netaudit", "show-version", "/nonexistent/cap.txt", "out"]).unwrap();
        let code = cmd_show_version(&cli, Path::new("/nonexistent/cap.txt"), Path::new("out")).unwrap();
        assert_eq!(code, EXIT_INPUT_MISSING);
    }

    #[tokio::test]
    async fn test_audit_from_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let snap = dir.path().join("snap.json");
        std::fs::write(
            &snap,
            r#"{ "devices": [ { "id": "1", "name": { "value": "rtr-01" } } ] }"#,
        )
        .unwrap();
        let out = dir.path().join("devices.json");

        let cli = Cli::try_parse_from(["netaudit", "-f", "json", "devices"]).unwrap();
        let config = AuditConfig::resolve(|_| None, None);
        let args = AuditArgs {
            output: Some(out.clone()),
            from_file: Some(snap),
        };

        let code = cmd_devices(&cli, &config, &args).await.unwrap();
        assert_eq!(code, 1);

        let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(saved["audit_type"], "devices");
        assert_eq!(saved["summary"]["missing_critical"], 1);
    }
}
