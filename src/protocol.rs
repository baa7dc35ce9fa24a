//! Message protocol between a view and the store.
//!
//! Messages are JSON objects tagged by `command`:
//!
//! | Request | Payload | Response |
//! |---------|---------|----------|
//! | `getVersions` | — | `versions { data }` |
//! | `getChunks` | `version` | `chunks { version, data }` |
//! | `getReasoning` | `version` | `reasoning { version, data }` |
//! | `updateChunk` | `version`, `target`, `chunk` | `refreshChunks { version, chunks }` |
//! | `deleteChunk` | `version`, `target` | `refreshChunks { version, chunks }` |
//! | `updateReasoning` | `version`, `reasoning` | `reasoning { version, data }` |
//!
//! Mutations always answer with the complete resulting collection; the view
//! re-renders from it instead of patching local state. Errors never cross the
//! channel: a request that cannot be served gets no response at all.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{ChunkEntry, ChunkTarget, SemanticChunk, VersionId};
use crate::repository::Repository;
use crate::store::SemanticStore;

/// View → store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request {
    GetVersions,
    GetChunks {
        version: VersionId,
    },
    GetReasoning {
        version: VersionId,
    },
    UpdateChunk {
        version: VersionId,
        target: ChunkTarget,
        chunk: SemanticChunk,
    },
    DeleteChunk {
        version: VersionId,
        target: ChunkTarget,
    },
    UpdateReasoning {
        version: VersionId,
        reasoning: Vec<String>,
    },
}

/// Store → view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Response {
    Versions {
        data: Vec<VersionId>,
    },
    Chunks {
        version: VersionId,
        data: Vec<ChunkEntry>,
    },
    Reasoning {
        version: VersionId,
        data: Vec<String>,
    },
    RefreshChunks {
        version: VersionId,
        chunks: Vec<ChunkEntry>,
    },
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetVersions => "getVersions",
            Request::GetChunks { .. } => "getChunks",
            Request::GetReasoning { .. } => "getReasoning",
            Request::UpdateChunk { .. } => "updateChunk",
            Request::DeleteChunk { .. } => "deleteChunk",
            Request::UpdateReasoning { .. } => "updateReasoning",
        }
    }
}

/// Dispatches requests to the [`Repository`].
pub struct SyncService {
    repo: Repository,
}

impl SyncService {
    pub fn new(store: Arc<dyn SemanticStore>) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Serve one request. `None` means the request produced no response
    /// (missing version, invalid target, write failure); the reason is logged.
    pub async fn handle(&self, request: Request) -> Option<Response> {
        tracing::debug!(command = request.name(), "handling request");
        match request {
            Request::GetVersions => Some(Response::Versions {
                data: self.repo.versions().await,
            }),
            Request::GetChunks { version } => {
                let data = self.repo.chunks(&version).await?;
                Some(Response::Chunks { version, data })
            }
            Request::GetReasoning { version } => {
                let data = self.repo.reasoning(&version).await?;
                Some(Response::Reasoning { version, data })
            }
            Request::UpdateChunk {
                version,
                target,
                chunk,
            } => {
                let chunks = self.repo.update_chunk(&version, &target, chunk).await.ok()?;
                Some(Response::RefreshChunks { version, chunks })
            }
            Request::DeleteChunk { version, target } => {
                let chunks = self.repo.delete_chunk(&version, &target).await.ok()?;
                Some(Response::RefreshChunks { version, chunks })
            }
            Request::UpdateReasoning { version, reasoning } => {
                let data = self.repo.update_reasoning(&version, reasoning).await.ok()?;
                Some(Response::Reasoning { version, data })
            }
        }
    }

    /// Host action: delete the chunk at `index` in `version`.
    pub async fn delete_chunk(&self, version: &str, index: usize) -> Option<Response> {
        self.handle(Request::DeleteChunk {
            version: version.to_string(),
            target: ChunkTarget::Index(index),
        })
        .await
    }

    /// Host action: replace the chunk at `index` in `version` with `chunk`.
    pub async fn update_chunk(
        &self,
        version: &str,
        index: usize,
        chunk: SemanticChunk,
    ) -> Option<Response> {
        self.handle(Request::UpdateChunk {
            version: version.to_string(),
            target: ChunkTarget::Index(index),
            chunk,
        })
        .await
    }
}
