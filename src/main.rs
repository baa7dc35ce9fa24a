//! # Semantic Explorer CLI (`semx`)
//!
//! The `semx` binary is the host-facing surface of Semantic Explorer. It lists
//! versions, renders the review panel as text, performs the chunk actions a
//! host can invoke directly, and serves the message protocol over stdio or HTTP.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `semx versions` | List versions with chunk and approval counts |
//! | `semx show` | Render the panel for a version (chunks or reasoning) |
//! | `semx approve <version> <chunk>` | Approve (or `--revoke`) a chunk |
//! | `semx delete-chunk <version> <chunk>` | Delete a chunk |
//! | `semx update-chunk <version> <chunk> --file F` | Replace a chunk with a YAML/JSON record |
//! | `semx set-reasoning <version> --step S...` | Replace the reasoning steps |
//! | `semx serve stdio` | JSON-lines message channel on stdin/stdout |
//! | `semx serve http` | JSON HTTP server |
//!
//! `<chunk>` is either a position (`0`, `1`, ...) or a chunk id as shown by
//! `semx show`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use semantic_explorer::models::ChunkTarget;
use semantic_explorer::protocol::SyncService;
use semantic_explorer::store::yaml::YamlStore;
use semantic_explorer::{commands, config, logging, server, stdio};

/// Semantic Explorer — review semantic chunks stored as per-version YAML files.
#[derive(Parser)]
#[command(
    name = "semx",
    about = "Semantic Explorer — browse, edit, approve and delete semantic chunks",
    version,
    long_about = "Semantic Explorer reads the per-version chunk files in a project's \
    .semantic directory, renders them for review, and writes edits back. The same \
    operations are available to editor hosts as a JSON message protocol over stdio or HTTP."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/semx.toml`. When the file does not exist the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/semx.toml")]
    config: PathBuf,

    /// Project root containing the semantic directory. Overrides `[project].root`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log at debug level (unless `RUST_LOG` is set).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List versions with their chunk and approval counts.
    Versions,

    /// Render the review panel.
    ///
    /// Shows the first version unless `--version` is given, in chunk view
    /// unless `--reasoning` is given.
    Show {
        /// Version to show.
        #[arg(long)]
        version: Option<String>,

        /// Show the reasoning and planning steps instead of chunks.
        #[arg(long)]
        reasoning: bool,
    },

    /// Mark a chunk as approved.
    Approve {
        version: String,
        /// Chunk position or id.
        chunk: ChunkTarget,
        /// Clear the approval instead.
        #[arg(long)]
        revoke: bool,
    },

    /// Delete a chunk and fix the version's chunk count.
    DeleteChunk {
        version: String,
        /// Chunk position or id.
        chunk: ChunkTarget,
    },

    /// Replace a chunk with the record in a YAML or JSON file.
    UpdateChunk {
        version: String,
        /// Chunk position or id.
        chunk: ChunkTarget,
        /// File holding the replacement chunk.
        #[arg(long)]
        file: PathBuf,
    },

    /// Replace the reasoning and planning steps.
    ///
    /// Steps are trimmed and empty ones dropped.
    SetReasoning {
        version: String,
        /// One reasoning step; repeat for several.
        #[arg(long = "step")]
        steps: Vec<String>,
    },

    /// Serve the message protocol.
    Serve {
        #[command(subcommand)]
        transport: Transport,
    },
}

/// Message transports.
#[derive(Subcommand)]
enum Transport {
    /// One JSON message per line on stdin/stdout.
    Stdio,
    /// JSON over HTTP on `[server].bind`.
    Http,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_or_default(&cli.config)?;
    if let Some(root) = cli.root {
        cfg.project.root = root;
    }
    logging::init(&cfg, cli.verbose);
    tracing::debug!(dir = %cfg.semantic_dir().display(), "using semantic directory");

    let service = Arc::new(SyncService::new(Arc::new(YamlStore::from_config(&cfg))));

    match cli.command {
        Commands::Versions => {
            commands::run_versions(&service).await?;
        }
        Commands::Show { version, reasoning } => {
            commands::run_show(&service, version.as_deref(), reasoning).await?;
        }
        Commands::Approve {
            version,
            chunk,
            revoke,
        } => {
            commands::run_approve(&service, &version, &chunk, !revoke).await?;
        }
        Commands::DeleteChunk { version, chunk } => {
            commands::run_delete_chunk(&service, &version, &chunk).await?;
        }
        Commands::UpdateChunk {
            version,
            chunk,
            file,
        } => {
            commands::run_update_chunk(&service, &version, &chunk, &file).await?;
        }
        Commands::SetReasoning { version, steps } => {
            commands::run_set_reasoning(&service, &version, steps).await?;
        }
        Commands::Serve { transport } => match transport {
            Transport::Stdio => {
                stdio::run_stdio(&service).await?;
            }
            Transport::Http => {
                server::run_server(&cfg, service.clone()).await?;
            }
        },
    }

    Ok(())
}
