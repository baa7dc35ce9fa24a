//! Storage abstraction for Semantic Explorer.
//!
//! The [`SemanticStore`] trait covers the raw persistence a version needs:
//! discovery, whole-file load and whole-file save. Everything that mutates a
//! file goes through [`Repository`](crate::repository::Repository), which adds
//! normalization, bounds validation and per-version locking on top.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! | Backend | Purpose |
//! |---------|---------|
//! | [`yaml::YamlStore`] | One YAML file per version in the project's semantic directory |
//! | [`memory::MemoryStore`] | In-memory documents for tests and embedding |

pub mod memory;
pub mod yaml;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{ChunkTarget, SemanticFile, VersionId};

/// Abstract storage backend for per-version semantic files.
#[async_trait]
pub trait SemanticStore: Send + Sync {
    /// Versions currently present, in backend listing order.
    async fn list_versions(&self) -> Result<Vec<VersionId>>;

    /// Read and parse one version.
    ///
    /// `Ok(None)` when the version does not exist; `Err` when it exists but
    /// cannot be read or parsed.
    async fn load(&self, version: &str) -> Result<Option<SemanticFile>>;

    /// Overwrite one version with `file`.
    async fn save(&self, version: &str, file: &SemanticFile) -> Result<()>;

    /// Last modification time, when the backend tracks one.
    async fn modified(&self, version: &str) -> Result<Option<DateTime<Utc>>>;
}

/// Why a repository operation did not apply.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("version not found: {0}")]
    NotFound(VersionId),

    #[error("chunk index {index} out of range for version {version} ({len} chunks)")]
    InvalidIndex {
        version: VersionId,
        index: usize,
        len: usize,
    },

    #[error("no chunk with id {id} in version {version}")]
    UnknownChunk { version: VersionId, id: String },

    #[error("failed to write version {version}: {message}")]
    Write { version: VersionId, message: String },
}

impl StoreError {
    /// Error for a target that did not resolve to a position.
    pub fn invalid_target(version: &str, target: &ChunkTarget, len: usize) -> Self {
        match target {
            ChunkTarget::Index(index) => StoreError::InvalidIndex {
                version: version.to_string(),
                index: *index,
                len,
            },
            ChunkTarget::Id(id) => StoreError::UnknownChunk {
                version: version.to_string(),
                id: id.clone(),
            },
        }
    }

    /// True for a target that no longer (or never) matched a chunk.
    pub fn is_invalid_target(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidIndex { .. } | StoreError::UnknownChunk { .. }
        )
    }
}
