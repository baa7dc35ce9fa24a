//! CLI command implementations.
//!
//! Each `run_*` function backs one `semx` subcommand and prints to stdout.
//! Mutating commands go through the [`Repository`](crate::repository::Repository)
//! directly so that failures surface as errors with a non-zero exit code.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::catalog::format_ts_iso;
use crate::models::{ChunkTarget, SemanticChunk};
use crate::protocol::SyncService;
use crate::view::{self, Session, ViewEvent, ViewMode};

/// `semx versions`
pub async fn run_versions(service: &SyncService) -> Result<()> {
    let summaries = service.repository().summaries().await;
    if summaries.is_empty() {
        println!("No semantic versions found.");
        return Ok(());
    }

    println!(
        "{:<20} {:>7} {:>9} {:<8} MODIFIED",
        "VERSION", "CHUNKS", "APPROVED", "REVIEWED"
    );
    for s in &summaries {
        println!(
            "{:<20} {:>7} {:>9} {:<8} {}",
            s.version,
            s.chunk_count,
            s.approved_count,
            if s.all_approved() { "yes" } else { "no" },
            s.modified
                .as_ref()
                .map(format_ts_iso)
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

/// `semx show`
pub async fn run_show(service: &SyncService, version: Option<&str>, reasoning: bool) -> Result<()> {
    let mut session = Session::start(service).await;

    if let Some(v) = version {
        if session.state().tab(v).is_none() {
            bail!("version not found: {}", v);
        }
        session
            .dispatch(ViewEvent::SelectVersion(v.to_string()))
            .await;
    }
    if reasoning {
        session
            .dispatch(ViewEvent::SelectMode(ViewMode::Reasoning))
            .await;
    }

    print!("{}", view::render(session.state()));
    Ok(())
}

/// `semx approve`
pub async fn run_approve(
    service: &SyncService,
    version: &str,
    target: &ChunkTarget,
    approved: bool,
) -> Result<()> {
    let (pos, entries) = service
        .repository()
        .set_approved(version, target, approved)
        .await?;
    let title = &entries[pos].chunk.title;

    let approved_count = entries.iter().filter(|e| e.chunk.approved).count();
    println!(
        "{} '{}' ({}/{} approved)",
        if approved { "approved" } else { "unapproved" },
        title,
        approved_count,
        entries.len()
    );
    Ok(())
}

/// `semx delete-chunk`
pub async fn run_delete_chunk(
    service: &SyncService,
    version: &str,
    target: &ChunkTarget,
) -> Result<()> {
    let entries = service.repository().delete_chunk(version, target).await?;
    println!("deleted chunk; {} remaining", entries.len());
    Ok(())
}

/// `semx update-chunk`
pub async fn run_update_chunk(
    service: &SyncService,
    version: &str,
    target: &ChunkTarget,
    file: &Path,
) -> Result<()> {
    let chunk = read_chunk_file(file)?;
    let entries = service
        .repository()
        .update_chunk(version, target, chunk)
        .await?;
    println!("updated chunk; {} total", entries.len());
    Ok(())
}

/// `semx set-reasoning`
pub async fn run_set_reasoning(
    service: &SyncService,
    version: &str,
    steps: Vec<String>,
) -> Result<()> {
    let stored = service
        .repository()
        .update_reasoning(version, steps)
        .await?;
    println!("stored {} reasoning steps", stored.len());
    Ok(())
}

/// Read a chunk record from a YAML (or JSON) file.
pub fn read_chunk_file(path: &Path) -> Result<SemanticChunk> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunk file: {}", path.display()))?;
    let chunk: SemanticChunk = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse chunk file: {}", path.display()))?;
    Ok(chunk)
}
