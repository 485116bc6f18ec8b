//! vastgraph CLI: reconcile the source graphs and query the result.
//!
//! Usage:
//!   vastgraph load --data-dir <dir> [--if-empty] [--db path] [--config file]
//!   vastgraph check --data-dir <dir> [--config file]
//!   vastgraph skeleton [--source <name>]... [--db path]
//!   vastgraph unique <source> [--db path]
//!   vastgraph stats [--db path]

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vastgraph::{
    dataset_unique, skeleton, OpenStore, Reconciler, SourceTag, SqliteStore,
};

#[derive(Parser)]
#[command(
    name = "vastgraph",
    version,
    about = "Multi-source graph reconciliation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the source documents and replace the stored graph
    Load {
        /// Directory holding the source documents
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Do nothing if the store already holds a graph
        #[arg(long)]
        if_empty: bool,
    },
    /// Run every check and repair without writing anything
    Check {
        /// Directory holding the source documents
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Print the subgraph attested by the given sources (all by default)
    Skeleton {
        /// Required source (journalist/jo, FILAH/fi, TROUT/tr); repeatable
        #[arg(long = "source", value_parser = parse_source)]
        sources: Vec<SourceTag>,
    },
    /// Print what a source shares with the journalist graph beyond the skeleton
    Unique {
        #[arg(value_parser = parse_source)]
        source: SourceTag,
    },
    /// Show element counts of the stored graph
    Stats,
}

fn parse_source(s: &str) -> Result<SourceTag, String> {
    s.parse()
}

/// Get the default database path (~/.local/share/vastgraph/vastgraph.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("vastgraph").join("vastgraph.db")
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "vastgraph=info",
        1 => "vastgraph=debug",
        _ => "vastgraph=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

/// Open the store and hand it to a command; exit code 1 if it cannot be opened.
fn with_store(db: Option<PathBuf>, command: impl FnOnce(&SqliteStore) -> i32) -> i32 {
    match open_store(db) {
        Ok(store) => command(&store),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn print_json(value: &impl Serialize) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_load(reconciler: &Reconciler, store: &SqliteStore, data_dir: &Path, if_empty: bool) -> i32 {
    let outcome = if if_empty {
        reconciler.run_if_empty(data_dir, store)
    } else {
        reconciler
            .load_inputs(data_dir)
            .and_then(|inputs| reconciler.run(inputs, store))
            .map(Some)
    };
    match outcome {
        Ok(Some(summary)) => {
            let p = &summary.persisted;
            println!(
                "Loaded {} nodes, {} edges, {} roadmap nodes, {} routes ({} linked places)",
                p.nodes, p.edges, p.roadmap_nodes, p.routes, p.correspondences
            );
            if !summary.temporal.passed_through.is_empty() {
                println!(
                    "{} temporal values kept as text",
                    summary.temporal.passed_through.len()
                );
            }
            0
        }
        Ok(None) => {
            println!("Store already populated; nothing loaded.");
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_check(reconciler: &Reconciler, data_dir: &Path) -> i32 {
    let prepared = reconciler
        .load_inputs(data_dir)
        .and_then(|inputs| reconciler.prepare(inputs.datasets));
    match prepared {
        Ok(prepared) => {
            #[derive(Serialize)]
            struct CheckOutput<'a> {
                consistency: &'a vastgraph::ConsistencyReport,
                repair: &'a vastgraph::RepairReport,
                merge: &'a vastgraph::MergeStats,
                temporal: &'a vastgraph::TemporalReport,
            }
            print_json(&CheckOutput {
                consistency: &prepared.consistency,
                repair: &prepared.repair,
                merge: &prepared.merge,
                temporal: &prepared.temporal,
            })
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_skeleton(store: &SqliteStore, sources: &[SourceTag]) -> i32 {
    let required = if sources.is_empty() { &SourceTag::ALL[..] } else { sources };
    match skeleton(store, required) {
        Ok(subgraph) => print_json(&subgraph),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_unique(store: &SqliteStore, source: SourceTag) -> i32 {
    match dataset_unique(store, source) {
        Ok(subgraph) => print_json(&subgraph),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_stats(store: &SqliteStore) -> i32 {
    use vastgraph::GraphStore;

    let stats = match store.stats() {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if stats.canonical_nodes == 0 && stats.roadmap_nodes == 0 {
        println!("Store is empty.");
        return 0;
    }
    println!("{:<24}  {:>8}", "LAYER", "COUNT");
    println!("{}", "-".repeat(34));
    println!("{:<24}  {:>8}", "canonical nodes", stats.canonical_nodes);
    println!("{:<24}  {:>8}", "canonical edges", stats.canonical_edges);
    println!("{:<24}  {:>8}", "roadmap nodes", stats.roadmap_nodes);
    println!("{:<24}  {:>8}", "routes", stats.routes);
    println!("{:<24}  {:>8}", "linked places", stats.correspondences);
    println!();
    println!("{:<24}  {:>8}", "LABEL", "NODES");
    println!("{}", "-".repeat(34));
    for (label, count) in &stats.labels {
        println!("{:<24}  {:>8}", label, count);
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let reconciler = match Reconciler::from_config_file(cli.config.as_deref()) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let db = cli.db;
    let code = match cli.command {
        Commands::Load { data_dir, if_empty } => {
            with_store(db, |store| cmd_load(&reconciler, store, &data_dir, if_empty))
        }
        Commands::Check { data_dir } => cmd_check(&reconciler, &data_dir),
        Commands::Skeleton { sources } => with_store(db, |store| cmd_skeleton(store, &sources)),
        Commands::Unique { source } => with_store(db, |store| cmd_unique(store, source)),
        Commands::Stats => with_store(db, cmd_stats),
    };
    std::process::exit(code);
}
