//! peermatch binary entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use peermatch::cli::{
    cache_cmd, compare_cmd, import_cmd, neighbors_cmd, recommend_cmd, vector_cmd,
};

#[derive(Parser)]
#[command(name = "peermatch", version, about = "People-to-people sports partner recommendations")]
struct Cli {
    /// Database path (default: ~/.peermatch/peermatch.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load users, venues, and friendships from a JSON snapshot
    Import {
        /// Snapshot file
        file: PathBuf,
        /// Skip rebuilding vectors for imported users
        #[arg(long)]
        no_rebuild: bool,
    },
    /// Build and inspect attribute vectors
    Vector {
        #[command(subcommand)]
        command: VectorCommand,
    },
    /// Pairwise similarity between two users, broken down by segment
    Compare { user_a: String, user_b: String },
    /// Raw nearest-neighbor lookup for a user
    Neighbors {
        user_id: String,
        /// Neighbors to return
        #[arg(short, long, default_value_t = 20)]
        k: usize,
    },
    /// Assemble a recommendation page for a user
    Recommend {
        user_id: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Neighbors to retrieve before filtering
        #[arg(short, long)]
        k: Option<usize>,
        /// Override the minimum similarity threshold
        #[arg(long)]
        min_similarity: Option<f64>,
        /// Disable the similarity threshold entirely
        #[arg(long)]
        no_threshold: bool,
    },
    /// Inspect and purge the pairwise similarity cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand)]
enum VectorCommand {
    /// Rebuild a user's vector from their profile
    Build { user_id: String },
    /// Show the stored vector by schema segment
    Show { user_id: String },
    /// Completeness and quality stats for a user
    Stats { user_id: String },
    /// List all users with their vector completeness
    List,
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Drop cached pairs involving a user
    Purge { user_id: String },
    /// Show cache size
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Output-mode flags are read via env so subcommand code stays flag-free.
    if cli.json {
        std::env::set_var("PEERMATCH_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("PEERMATCH_QUIET", "1");
    }
    if cli.no_color {
        std::env::set_var("PEERMATCH_NO_COLOR", "1");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("peermatch=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let db = cli.db.as_deref();
    match cli.command {
        Command::Import { file, no_rebuild } => import_cmd::run(db, &file, !no_rebuild).await,
        Command::Vector { command } => match command {
            VectorCommand::Build { user_id } => vector_cmd::run_build(db, &user_id).await,
            VectorCommand::Show { user_id } => vector_cmd::run_show(db, &user_id).await,
            VectorCommand::Stats { user_id } => vector_cmd::run_stats(db, &user_id).await,
            VectorCommand::List => vector_cmd::run_list(db).await,
        },
        Command::Compare { user_a, user_b } => compare_cmd::run(db, &user_a, &user_b).await,
        Command::Neighbors { user_id, k } => neighbors_cmd::run(db, &user_id, k).await,
        Command::Recommend {
            user_id,
            limit,
            offset,
            k,
            min_similarity,
            no_threshold,
        } => {
            recommend_cmd::run(db, &user_id, limit, offset, k, min_similarity, no_threshold).await
        }
        Command::Cache { command } => match command {
            CacheCommand::Purge { user_id } => cache_cmd::run_purge(db, &user_id).await,
            CacheCommand::Status => cache_cmd::run_status(db).await,
        },
    }
}
