//! pgsnap CLI
//!
//! - `pgsnap snapshot <graph.json>`: serialize a declared schema graph
//! - `pgsnap import <dump.sql>`: materialize a SQL dump in a scratch
//!   PostgreSQL database and snapshot what it created

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pgsnap::config::parse_list;
use pgsnap::ingest::SqlDumpImporter;
use pgsnap::{generate_snapshot_with_report, Casing, SchemaObjectGraph, Settings, Snapshot};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "pgsnap")]
#[command(about = "PostgreSQL schema snapshot serializer")]
#[command(version)]
struct Cli {
    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize a schema object graph (JSON) into a snapshot
    Snapshot {
        /// Path to the graph JSON file
        graph: PathBuf,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Casing for key-derived column names (snake_case or camelCase)
        #[arg(long)]
        casing: Option<Casing>,

        /// Comma-separated schemas to keep
        #[arg(long)]
        schema_filter: Option<String>,

        /// Print the snapshot checksum to stderr
        #[arg(long)]
        checksum: bool,
    },

    /// Snapshot the objects a SQL dump creates
    Import {
        /// Path to the SQL dump
        dump: PathBuf,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let mut settings = Settings::load()?;

    match command {
        Commands::Snapshot {
            graph,
            output,
            casing,
            schema_filter,
            checksum,
        } => {
            if casing.is_some() {
                settings.snapshot.casing = casing;
            }
            if let Some(filter) = schema_filter {
                settings.snapshot.schema_filter = Some(parse_list(&filter));
            }

            let raw = std::fs::read_to_string(&graph)
                .with_context(|| format!("failed to read {}", graph.display()))?;
            let graph = SchemaObjectGraph::from_json(&raw).context("invalid schema graph")?;

            let (snapshot, report) = generate_snapshot_with_report(&graph, &settings.snapshot)?;
            if !report.skipped_policies.is_empty() {
                warn!(count = report.skipped_policies.len(), "Unlinked policies left out of the snapshot");
            }
            info!(
                tables = snapshot.tables.len(),
                views = snapshot.views.len(),
                skipped_tables = report.skipped_tables.len(),
                "Schema graph serialized"
            );

            write_snapshot(&snapshot, output.as_deref())?;
            if checksum {
                eprintln!("{}", snapshot.checksum()?);
            }
            Ok(())
        }
        Commands::Import { dump, output } => {
            let sql = std::fs::read_to_string(&dump)
                .with_context(|| format!("failed to read {}", dump.display()))?;
            let snapshot = import_dump(&settings, &sql).await?;
            write_snapshot(&snapshot, output.as_deref())
        }
    }
}

#[cfg(feature = "postgres-engine")]
async fn import_dump(settings: &Settings, sql: &str) -> anyhow::Result<Snapshot> {
    use pgsnap::{PgCatalogIntrospector, PostgresEngineProvider};

    let importer = SqlDumpImporter::new(
        PostgresEngineProvider::new(settings.engine.clone()),
        PgCatalogIntrospector::new(settings.snapshot.clone()),
    );
    Ok(importer.import(sql).await?)
}

#[cfg(not(feature = "postgres-engine"))]
async fn import_dump(_settings: &Settings, sql: &str) -> anyhow::Result<Snapshot> {
    use pgsnap::ingest::{CatalogIntrospector, NoEngine};
    use pgsnap::{IngestError, UnavailableEngineProvider};

    struct NoIntrospector;

    #[async_trait::async_trait]
    impl CatalogIntrospector<NoEngine> for NoIntrospector {
        async fn introspect(&self, engine: &mut NoEngine, _schemas: &[String]) -> Result<Snapshot, IngestError> {
            match *engine {}
        }
    }

    let importer = SqlDumpImporter::new(
        UnavailableEngineProvider::new("pgsnap was built without the postgres-engine feature"),
        NoIntrospector,
    );
    Ok(importer.import(sql).await?)
}

fn write_snapshot(snapshot: &Snapshot, output: Option<&Path>) -> anyhow::Result<()> {
    let json = snapshot.to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(tables = snapshot.tables.len(), path = %path.display(), "Snapshot written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pgsnap=debug"));

    // Logs go to stderr so stdout stays a clean snapshot
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .init(),
    }
}
