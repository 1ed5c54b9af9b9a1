mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use output::{print_output, OutputFormat};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xuav_api::{AppState, Server};
use xuav_catalog::{Catalog, SAMPLE_CATALOG};
use xuav_core::{ConfigManager, GraphConfig, Settings};
use xuav_graph::{init_schema, GraphStore, ImportService, NewVariant, QueryService};

#[derive(Parser)]
#[command(name = "xuav")]
#[command(about = "X-UAV CLI - UAV catalog and platform graph management", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty, table)
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Directory holding default.toml and the per-environment files
    #[arg(long, global = true, env = "XUAV_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Configuration environment (overrides APP_ENV)
    #[arg(long, global = true)]
    env: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the graph schema, import seed data and link it
    InitDb {
        /// Seed document; defaults to the bundled CCA data set
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Create the relational catalog tables
    CatalogInit {
        /// Catalog document with uavs, armaments and uav_armaments
        #[arg(long, conflicts_with = "sample")]
        import: Option<PathBuf>,

        /// Load the bundled sample catalog
        #[arg(long)]
        sample: bool,
    },

    /// List platform variants sorted by name
    List {
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },

    /// Add a platform variant to an existing family
    Add {
        /// Family key; prompted for when missing
        #[arg(long)]
        family: Option<String>,

        /// Variant key; prompted for when missing
        #[arg(long)]
        key: Option<String>,

        /// Variant name; prompted for when missing
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        designation: Option<String>,

        #[arg(long)]
        airframe_type: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// First flight date (YYYY-MM-DD)
        #[arg(long)]
        first_flight: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Import platform variants from a JSON file
    Import {
        /// A list of variants or an object with a platform_variants list
        file: PathBuf,
    },

    /// Write an example import document
    Template {
        #[arg(long, default_value = "uav_template.json")]
        out: PathBuf,
    },

    /// Run the HTTP API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Serve an in-memory graph seeded with the bundled data set
        #[arg(long)]
        ephemeral: bool,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,
    /// Print the JSON schema of the settings file
    Schema,
}

#[derive(Serialize)]
struct VariantRow {
    key: String,
    name: String,
    designation: String,
    manufacturer: String,
    country: String,
    status: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::with_options(cli.config_dir.clone(), cli.env.clone())
        .context("Failed to load configuration")?;
    init_tracing(config.settings(), cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    match execute_command(&cli, config.settings().clone()).await {
        Ok(Some(output)) => {
            print_output(cli.output, &output)?;
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Commands log to stderr at `warn` so their output stays parseable; `serve`
/// uses the configured level.
fn init_tracing(settings: &Settings, verbose: bool, serving: bool) {
    let level = if verbose {
        "debug"
    } else if serving {
        settings.logging.level.as_str()
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(cli: &Cli, settings: Settings) -> Result<Option<Value>> {
    match &cli.command {
        Commands::InitDb { seed } => init_db(&settings, seed.as_deref()).await.map(Some),
        Commands::CatalogInit { import, sample } => {
            catalog_init(settings, import.clone(), *sample).await.map(Some)
        }
        Commands::List { limit } => list_variants(&settings, *limit).await.map(Some),
        Commands::Add {
            family,
            key,
            name,
            designation,
            airframe_type,
            status,
            first_flight,
            description,
        } => {
            // Optional fields are prompted for only in interactive runs.
            let interactive = family.is_none() || key.is_none() || name.is_none();
            let optional = |value: &Option<String>, prompt: &str| match value {
                None if interactive => optional_prompt(prompt),
                _ => Ok(value.clone()),
            };
            let variant = NewVariant {
                family_key: value_or_prompt(family, "Family key")?,
                key: variant_key(&value_or_prompt(key, "Variant key")?),
                name: value_or_prompt(name, "Variant name")?,
                designation: optional(designation, "Designation (e.g. YFQ-42A)")?,
                airframe_type: optional(airframe_type, "Airframe type")?,
                development_status: optional(status, "Development status")?,
                first_flight: optional(first_flight, "First flight (YYYY-MM-DD)")?,
                description: optional(description, "Description")?,
            };
            add_variant(&settings, variant).await.map(Some)
        }
        Commands::Import { file } => import_variants(&settings, file).await.map(Some),
        Commands::Template { out } => write_template(out).map(Some),
        Commands::Serve {
            host,
            port,
            ephemeral,
        } => {
            let mut settings = settings;
            if let Some(host) = host {
                settings.server.host = host.clone();
            }
            if let Some(port) = port {
                settings.server.port = *port;
            }
            serve(settings, *ephemeral).await.map(|_| None)
        }
        Commands::Config(cmd) => execute_config_command(cmd, &settings),
    }
}

async fn connect_graph(config: &GraphConfig) -> Result<GraphStore> {
    let store = GraphStore::connect(config)
        .await
        .with_context(|| format!("Failed to connect to graph at {}", config.connection))?;
    init_schema(&store)
        .await
        .context("Failed to create graph schema")?;
    Ok(store)
}

async fn init_db(settings: &Settings, seed: Option<&std::path::Path>) -> Result<Value> {
    let store = connect_graph(&settings.database.graph).await?;
    let importer = ImportService::new(store);

    let vertices = match seed {
        Some(path) => importer
            .import_file(path)
            .await
            .with_context(|| format!("Failed to import {}", path.display()))?,
        None => {
            let document: Value = serde_json::from_str(xuav_graph::CCA_SEED)?;
            importer.import_document(&document).await?
        }
    };
    let edges = importer
        .create_relationships()
        .await
        .context("Failed to create relationships")?;

    Ok(json!({
        "graph": settings.database.graph.graph_name,
        "documents_imported": vertices.total_imported(),
        "document_errors": vertices.total_errors(),
        "relationships_created": edges.total_created(),
        "relationship_errors": edges.errors.len(),
        "collections": vertices.collections,
    }))
}

async fn catalog_init(settings: Settings, import: Option<PathBuf>, sample: bool) -> Result<Value> {
    let path = settings.database.catalog.path.clone();
    tokio::task::spawn_blocking(move || -> Result<Value> {
        let catalog = Catalog::new(&path);
        catalog.init_schema().context("Failed to create catalog schema")?;

        let summary = if let Some(file) = import {
            Some(
                catalog
                    .import_file(&file)
                    .with_context(|| format!("Failed to import {}", file.display()))?,
            )
        } else if sample {
            let document: Value = serde_json::from_str(SAMPLE_CATALOG)?;
            Some(catalog.import_document(&document)?)
        } else {
            None
        };

        Ok(json!({
            "catalog": path,
            "uavs": catalog.count_uavs()?,
            "imported": summary,
        }))
    })
    .await
    .context("Catalog task failed")?
}

async fn list_variants(settings: &Settings, limit: usize) -> Result<Value> {
    let store = connect_graph(&settings.database.graph).await?;
    let page = QueryService::new(store)
        .list_platforms(0, limit.max(1))
        .await
        .context("Failed to list variants")?;

    let rows: Vec<VariantRow> = page
        .platforms
        .into_iter()
        .map(|p| VariantRow {
            key: p.id,
            name: p.name.unwrap_or_default(),
            designation: p.designation.unwrap_or_default(),
            manufacturer: p.manufacturer.unwrap_or_default(),
            country: p.country,
            status: p.development_status.unwrap_or_default(),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}

async fn add_variant(settings: &Settings, variant: NewVariant) -> Result<Value> {
    let store = connect_graph(&settings.database.graph).await?;
    ImportService::new(store.clone())
        .add_variant(&variant)
        .await
        .context("Failed to add variant")?;

    let listing = QueryService::new(store)
        .platform_detail(variant.key.trim())
        .await?
        .context("Variant was not readable after insert")?;
    Ok(serde_json::to_value(listing)?)
}

async fn import_variants(settings: &Settings, file: &std::path::Path) -> Result<Value> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document: Value = serde_json::from_str(&raw).context("Import file is not valid JSON")?;

    let store = connect_graph(&settings.database.graph).await?;
    let stats = ImportService::new(store)
        .import_variants(&document)
        .await
        .context("Failed to import variants")?;

    Ok(json!({
        "file": file.display().to_string(),
        "imported": stats.total_imported(),
        "errors": stats.errors,
    }))
}

fn write_template(out: &std::path::Path) -> Result<Value> {
    let document = xuav_graph::import::template();
    std::fs::write(out, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(json!({ "template": out.display().to_string() }))
}

async fn serve(settings: Settings, ephemeral: bool) -> Result<()> {
    settings.validate()?;
    let state = if ephemeral {
        let store = GraphStore::in_memory().await?;
        let (vertices, edges) = ImportService::new(store.clone()).seed_cca().await?;
        tracing::info!(
            "Seeded in-memory graph with {} documents and {} relationships",
            vertices.total_imported(),
            edges.total_created()
        );
        AppState::with_graph(settings, store)
    } else {
        AppState::new(settings)
    };
    Server::with_state(state).await?.run().await
}

fn execute_config_command(cmd: &ConfigCommands, settings: &Settings) -> Result<Option<Value>> {
    match cmd {
        ConfigCommands::Show => {
            println!("{}", toml::to_string_pretty(settings)?);
            Ok(None)
        }
        ConfigCommands::Schema => Ok(Some(serde_json::to_value(schemars::schema_for!(
            Settings
        ))?)),
    }
}

fn value_or_prompt(value: &Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v.clone()),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

fn optional_prompt(prompt: &str) -> Result<Option<String>> {
    let answer: String = Input::new()
        .with_prompt(format!("{} (empty to skip)", prompt))
        .allow_empty(true)
        .interact_text()?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Keys are lowercase with spaces replaced by `-`.
fn variant_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_output_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["xuav", "list", "--limit", "5", "--output", "table"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(matches!(cli.command, Commands::List { limit: 5 }));
    }

    #[test]
    fn catalog_import_and_sample_conflict() {
        let err = Cli::try_parse_from([
            "xuav",
            "catalog-init",
            "--import",
            "uavs.json",
            "--sample",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn write_template_creates_document() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("uav_template.json");
        let result = write_template(&out).unwrap();
        assert_eq!(result["template"], out.display().to_string());

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(written["platform_variants"].is_array());
    }

    #[test]
    fn variant_keys_are_normalised() {
        assert_eq!(variant_key("  Fury Block 2 "), "fury-block-2");
        assert_eq!(variant_key("yfq-44a"), "yfq-44a");
    }

    #[test]
    fn add_accepts_every_field_as_a_flag() {
        let cli = Cli::try_parse_from([
            "xuav",
            "add",
            "--family",
            "fury",
            "--key",
            "Fury Block 2",
            "--name",
            "Fury Block 2",
            "--designation",
            "YFQ-44B",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                key,
                designation,
                airframe_type,
                ..
            } => {
                assert_eq!(variant_key(key.as_deref().unwrap()), "fury-block-2");
                assert_eq!(designation.as_deref(), Some("YFQ-44B"));
                assert!(airframe_type.is_none());
            }
            _ => panic!("expected the add command"),
        }
    }
}
