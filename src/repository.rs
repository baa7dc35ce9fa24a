//! Store boundary: normalization, validation and per-version locking.
//!
//! Every mutation reloads the version from the backend, changes it in memory
//! and writes the whole document back, while holding that version's lock.
//! There is no cache shared between operations, so each one starts from what
//! is on disk.
//!
//! Failures are reported as [`StoreError`] and logged here; callers on the
//! message channel turn them into "no response".

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::catalog::{is_valid_version, VersionSummary};
use crate::models::{ChunkEntry, ChunkTarget, SemanticChunk, SemanticFile, VersionId};
use crate::store::{SemanticStore, StoreError};

/// One async mutex per version, created on first use and dropped again when
/// the last holder or waiter lets go.
#[derive(Default)]
pub struct VersionLocks {
    locks: Mutex<HashMap<VersionId, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one operation on a version.
pub struct VersionGuard<'a> {
    locks: &'a VersionLocks,
    version: VersionId,
    _guard: OwnedMutexGuard<()>,
}

impl VersionLocks {
    pub async fn acquire(&self, version: &str) -> VersionGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(version.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        VersionGuard {
            locks: self,
            version: version.to_string(),
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of versions with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for VersionGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock().unwrap_or_else(|e| e.into_inner());
        // The map and this guard own the only references: nobody is waiting.
        if locks
            .get(&self.version)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            locks.remove(&self.version);
        }
    }
}

pub struct Repository {
    store: Arc<dyn SemanticStore>,
    locks: VersionLocks,
}

impl Repository {
    pub fn new(store: Arc<dyn SemanticStore>) -> Self {
        Self {
            store,
            locks: VersionLocks::default(),
        }
    }

    /// Versions present in the backend. Listing failures degrade to empty.
    pub async fn versions(&self) -> Vec<VersionId> {
        match self.store.list_versions().await {
            Ok(versions) => versions,
            Err(e) => {
                tracing::error!("failed to list versions: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Load one version; absent when missing, unparsable or not a valid name.
    pub async fn load(&self, version: &str) -> Option<SemanticFile> {
        if !checked_name(version) {
            return None;
        }
        let _guard = self.locks.acquire(version).await;
        self.load_unlocked(version).await
    }

    pub async fn chunks(&self, version: &str) -> Option<Vec<ChunkEntry>> {
        self.load(version).await.map(|f| f.entries())
    }

    pub async fn reasoning(&self, version: &str) -> Option<Vec<String>> {
        self.load(version).await.map(|f| f.reasoning_and_planning)
    }

    pub async fn save(&self, version: &str, file: &SemanticFile) -> Result<(), StoreError> {
        if !checked_name(version) {
            return Err(StoreError::NotFound(version.to_string()));
        }
        let _guard = self.locks.acquire(version).await;
        self.save_unlocked(version, file).await
    }

    /// Remove the targeted chunk and fix `metadata.chunk_count`.
    pub async fn delete_chunk(
        &self,
        version: &str,
        target: &ChunkTarget,
    ) -> Result<Vec<ChunkEntry>, StoreError> {
        let (_guard, mut file) = self.lock_existing(version).await?;
        let pos = self.resolve(version, &file, target)?;

        let removed = file.chunks.remove(pos);
        file.metadata.chunk_count = file.chunks.len();
        self.save_unlocked(version, &file).await?;

        tracing::info!(
            version,
            position = pos,
            title = %removed.title,
            remaining = file.chunks.len(),
            "deleted chunk"
        );
        Ok(file.entries())
    }

    /// Replace the targeted chunk verbatim.
    pub async fn update_chunk(
        &self,
        version: &str,
        target: &ChunkTarget,
        chunk: SemanticChunk,
    ) -> Result<Vec<ChunkEntry>, StoreError> {
        let (_guard, mut file) = self.lock_existing(version).await?;
        let pos = self.resolve(version, &file, target)?;

        file.chunks[pos] = chunk;
        self.save_unlocked(version, &file).await?;

        tracing::info!(
            version,
            position = pos,
            approved = file.chunks[pos].approved,
            "updated chunk"
        );
        Ok(file.entries())
    }

    /// Set the review flag of the targeted chunk, leaving every other field as stored.
    /// Returns the resolved position and the updated list.
    pub async fn set_approved(
        &self,
        version: &str,
        target: &ChunkTarget,
        approved: bool,
    ) -> Result<(usize, Vec<ChunkEntry>), StoreError> {
        let (_guard, mut file) = self.lock_existing(version).await?;
        let pos = self.resolve(version, &file, target)?;

        file.chunks[pos].approved = approved;
        self.save_unlocked(version, &file).await?;

        tracing::info!(version, position = pos, approved, "set chunk approval");
        Ok((pos, file.entries()))
    }

    /// Replace the narrative with the trimmed, non-empty `steps`.
    pub async fn update_reasoning(
        &self,
        version: &str,
        steps: Vec<String>,
    ) -> Result<Vec<String>, StoreError> {
        let (_guard, mut file) = self.lock_existing(version).await?;

        file.reasoning_and_planning = clean_steps(steps);
        self.save_unlocked(version, &file).await?;

        tracing::info!(
            version,
            steps = file.reasoning_and_planning.len(),
            "updated reasoning"
        );
        Ok(file.reasoning_and_planning)
    }

    /// Status for every version, in catalog order. Unloadable versions are skipped.
    pub async fn summaries(&self) -> Vec<VersionSummary> {
        let mut out = Vec::new();
        for version in self.versions().await {
            let Some(file) = self.load(&version).await else {
                continue;
            };
            let modified = self.store.modified(&version).await.unwrap_or_else(|e| {
                tracing::warn!(version = %version, "failed to read modification time: {:#}", e);
                None
            });
            out.push(VersionSummary {
                chunk_count: file.chunks.len(),
                approved_count: file.chunks.iter().filter(|c| c.approved).count(),
                version,
                modified,
            });
        }
        out
    }

    async fn load_unlocked(&self, version: &str) -> Option<SemanticFile> {
        match self.store.load(version).await {
            Ok(Some(file)) => Some(file),
            Ok(None) => {
                tracing::debug!(version, "version file not found");
                None
            }
            Err(e) => {
                tracing::error!(version, "failed to load semantic file: {:#}", e);
                None
            }
        }
    }

    /// Validate the name, take the version lock and load the file under it.
    async fn lock_existing(
        &self,
        version: &str,
    ) -> Result<(VersionGuard<'_>, SemanticFile), StoreError> {
        if !checked_name(version) {
            return Err(StoreError::NotFound(version.to_string()));
        }
        let guard = self.locks.acquire(version).await;
        let file = self
            .load_unlocked(version)
            .await
            .ok_or_else(|| StoreError::NotFound(version.to_string()))?;
        Ok((guard, file))
    }

    fn resolve(
        &self,
        version: &str,
        file: &SemanticFile,
        target: &ChunkTarget,
    ) -> Result<usize, StoreError> {
        file.position_of(target).ok_or_else(|| {
            let err = StoreError::invalid_target(version, target, file.chunks.len());
            tracing::warn!("rejected chunk mutation: {}", err);
            err
        })
    }

    async fn save_unlocked(&self, version: &str, file: &SemanticFile) -> Result<(), StoreError> {
        self.store.save(version, file).await.map_err(|e| {
            tracing::error!(version, "failed to save semantic file: {:#}", e);
            StoreError::Write {
                version: version.to_string(),
                message: format!("{:#}", e),
            }
        })
    }
}

fn checked_name(version: &str) -> bool {
    let ok = is_valid_version(version);
    if !ok {
        tracing::warn!(version, "rejected invalid version name");
    }
    ok
}

/// Trim each step and drop the empty ones, keeping relative order.
pub fn clean_steps(steps: Vec<String>) -> Vec<String> {
    steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
