//! Homegraph CLI - ask questions about a household

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use homegraph_core::answer::AnswerEngine;
use homegraph_core::config::Config;
use homegraph_core::connections::mine_connections;
use homegraph_core::context::serialize_graph;
use homegraph_core::llm::{LlmClient, TextCompleter};
use homegraph_core::records::{HouseholdRecords, RecordKind};
use homegraph_core::storage::{Database, SqliteRecordStore};
use homegraph_core::{AskResult, HouseholdEngine};
use tracing::{debug, info};


#[derive(Parser)]
#[command(name = "homegraph")]
#[command(author, version, about = "Household knowledge graph and question answering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (defaults to storage.database_path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and print a household's graph
    Graph {
        household: String,
        /// Print the graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the text context a model would be given
    Context { household: String },

    /// List proactive observations for a household
    Connections { household: String },

    /// Ask a question about a household
    Ask {
        household: String,
        /// The question, in plain words
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Answer from rules only, even if an API key is set
        #[arg(long)]
        offline: bool,
    },

    /// Import household records from a JSON file
    Import {
        household: String,
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("homegraph=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.as_deref();

    match cli.command {
        Commands::Graph { household, json } => cmd_graph(db_path, &household, json).await,

        Commands::Context { household } => cmd_context(db_path, &household).await,

        Commands::Connections { household } => {
            cmd_connections(db_path, &household, cli.quiet).await
        }

        Commands::Ask {
            household,
            question,
            json,
            offline,
        } => cmd_ask(db_path, &household, &question.join(" "), json, offline).await,

        Commands::Import { household, file } => {
            cmd_import(db_path, &household, &file, cli.quiet).await
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(db_path, cli.quiet).await,
    }
}

// ============================================================================
// Wiring
// ============================================================================

async fn open_database(config: &Config, db_path: Option<&Path>) -> anyhow::Result<Database> {
    let path = match db_path {
        Some(path) => path.to_path_buf(),
        None => config.storage.resolved_database_path(),
    };
    debug!(path = %path.display(), "Opening record database");
    Database::open(path).await
}

/// Model client, only when an API key resolves
fn build_completer(config: &Config) -> anyhow::Result<Option<Arc<dyn TextCompleter>>> {
    let Some(api_key) = config.llm.resolved_api_key()? else {
        return Ok(None);
    };
    let completer: Arc<dyn TextCompleter> = Arc::new(LlmClient::new(config.llm.clone(), api_key)?);
    Ok(Some(completer))
}

async fn build_engine(
    config: &Config,
    db_path: Option<&Path>,
    offline: bool,
) -> anyhow::Result<(Database, HouseholdEngine<SqliteRecordStore>)> {
    let db = open_database(config, db_path).await?;
    let store = Arc::new(SqliteRecordStore::from_database(&db));
    let mut engine =
        HouseholdEngine::new(store).with_loader_config(config.graph.loader_config());

    if !offline && let Some(completer) = build_completer(config)? {
        info!(model = %config.llm.default_model, "Answering with language model");
        engine = engine.with_answer_engine(
            AnswerEngine::with_completer(completer)
                .with_bounds(config.llm.max_tokens, config.llm.temperature),
        );
    }

    Ok((db, engine))
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_graph(db_path: Option<&Path>, household: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (db, engine) = build_engine(&config, db_path, true).await?;
    let graph = engine.build_graph(household).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        println!("{}", graph.summary);
        if !graph.nodes.is_empty() {
            println!();
            println!("Nodes:");
            for node in &graph.nodes {
                println!("  {:<10} {:<28} {}", node.node_type, node.id, node.label);
            }
        }
        if !graph.edges.is_empty() {
            println!();
            println!("Edges:");
            for edge in &graph.edges {
                println!("  {} -{}-> {}", edge.from, edge.relation, edge.to);
            }
        }
    }

    db.close().await;
    Ok(())
}

async fn cmd_context(db_path: Option<&Path>, household: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (db, engine) = build_engine(&config, db_path, true).await?;
    let graph = engine.build_graph(household).await?;

    println!("{}", serialize_graph(&graph));

    db.close().await;
    Ok(())
}

async fn cmd_connections(db_path: Option<&Path>, household: &str, quiet: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (db, engine) = build_engine(&config, db_path, true).await?;
    let graph = engine.build_graph(household).await?;
    let connections = mine_connections(&graph, Utc::now().date_naive());

    if connections.is_empty() {
        if !quiet {
            println!("No connections found.");
        }
    } else {
        for connection in connections {
            println!("- {}", connection);
        }
    }

    db.close().await;
    Ok(())
}

async fn cmd_ask(
    db_path: Option<&Path>,
    household: &str,
    question: &str,
    json: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (db, engine) = build_engine(&config, db_path, offline).await?;
    let result = engine.ask(household, question).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_answer(&result);
    }

    db.close().await;
    Ok(())
}

fn print_answer(result: &AskResult) {
    println!("{}", result.answer);

    if !result.connections.is_empty() {
        println!();
        println!("Connections:");
        for connection in &result.connections {
            println!("  - {}", connection);
        }
    }

    if !result.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &result.sources {
            println!("  [{}] {}", source.node_type, source.label);
        }
    }
}

async fn cmd_import(
    db_path: Option<&Path>,
    household: &str,
    file: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read records file: {}", file.display()))?;
    let records: HouseholdRecords = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid household records in {}", file.display()))?;

    let config = Config::load()?;
    let db = open_database(&config, db_path).await?;
    let store = SqliteRecordStore::from_database(&db);
    let summary = store.import(household, &records).await?;

    if !quiet {
        println!(
            "Imported {} records into household '{}'",
            summary.total(),
            household
        );
        for (kind, count) in summary.counts.iter().filter(|(_, n)| *n > 0) {
            println!("  {:<20} {}", kind_label(*kind), count);
        }
    }

    db.close().await;
    Ok(())
}

fn kind_label(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Person => "people",
        RecordKind::Vendor => "vendors",
        RecordKind::Task => "tasks",
        RecordKind::Preference => "preferences",
        RecordKind::LearnedPreference => "learned preferences",
        RecordKind::Event => "events",
        RecordKind::Date => "important dates",
        RecordKind::Spending => "spending items",
        RecordKind::Location => "locations",
        RecordKind::Visit => "service visits",
    }
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(db_path: Option<&Path>, quiet: bool) -> anyhow::Result<()> {
    if quiet {
        return Ok(());
    }

    println!("Homegraph Health Check");
    println!("======================");
    println!();

    let mut all_ok = true;

    let config = match Config::load() {
        Ok(config) => {
            println!("[OK] Configuration: Valid");
            match config.llm.redacted_api_key() {
                Ok(Some(redacted)) => println!("[OK] API Key: Configured ({})", redacted),
                Ok(None) => {
                    println!("[--] API Key: Not configured (answers come from rules)");
                    println!("     Set HOMEGRAPH_API_KEY or OPENROUTER_API_KEY to use a model");
                }
                Err(e) => {
                    all_ok = false;
                    println!("[!!] API Key: Error - {}", e);
                }
            }
            config
        }
        Err(e) => {
            all_ok = false;
            println!("[!!] Configuration: Error - {}", e);
            Config::default()
        }
    };

    match Config::config_path() {
        Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
        Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
        Err(e) => println!("[!!] Config file: Error - {}", e),
    }

    match open_database(&config, db_path).await {
        Ok(db) => {
            println!("[OK] Database: {}", db.path().display());
            match db.migration_status().await {
                Ok(status) if status.needs_migration => {
                    all_ok = false;
                    println!(
                        "[!!] Database: Migrations pending (v{} -> v{})",
                        status.current_version, status.target_version
                    );
                }
                Ok(status) => println!("[OK] Database: Schema v{}", status.current_version),
                Err(e) => {
                    all_ok = false;
                    println!("[!!] Database: Migration check failed - {}", e);
                }
            }
            db.close().await;
        }
        Err(e) => {
            all_ok = false;
            println!("[!!] Database: Failed to open - {:#}", e);
        }
    }

    println!();
    if all_ok {
        println!("All checks passed!");
    } else {
        println!("Some checks failed. See above for details.");
    }

    Ok(())
}
