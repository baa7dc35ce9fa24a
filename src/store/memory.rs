//! In-memory [`SemanticStore`] implementation for tests and embedding.
//!
//! Documents are kept as YAML text behind `std::sync::RwLock`, so loads go
//! through the same parse and normalization path as the YAML backend.
//! Version order is insertion order.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::yaml::{parse_document, render_document};
use super::SemanticStore;
use crate::models::{SemanticFile, VersionId};

struct StoredVersion {
    version: VersionId,
    text: String,
    modified: DateTime<Utc>,
}

pub struct MemoryStore {
    versions: RwLock<Vec<StoredVersion>>,
    fail_writes: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            versions: RwLock::new(Vec::new()),
            fail_writes: RwLock::new(false),
        }
    }

    /// Insert or replace a version with raw YAML text.
    pub fn insert_raw(&self, version: &str, text: impl Into<String>) {
        let mut versions = self.versions.write().unwrap_or_else(|e| e.into_inner());
        let text = text.into();
        match versions.iter_mut().find(|v| v.version == version) {
            Some(existing) => {
                existing.text = text;
                existing.modified = Utc::now();
            }
            None => versions.push(StoredVersion {
                version: version.to_string(),
                text,
                modified: Utc::now(),
            }),
        }
    }

    /// Raw YAML text currently stored for `version`.
    pub fn raw(&self, version: &str) -> Option<String> {
        let versions = self.versions.read().unwrap_or_else(|e| e.into_inner());
        versions
            .iter()
            .find(|v| v.version == version)
            .map(|v| v.text.clone())
    }

    /// Make every subsequent save fail, to exercise write-failure paths.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write().unwrap_or_else(|e| e.into_inner()) = fail;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SemanticStore for MemoryStore {
    async fn list_versions(&self) -> Result<Vec<VersionId>> {
        let versions = self.versions.read().unwrap_or_else(|e| e.into_inner());
        Ok(versions.iter().map(|v| v.version.clone()).collect())
    }

    async fn load(&self, version: &str) -> Result<Option<SemanticFile>> {
        match self.raw(version) {
            Some(text) => Ok(Some(parse_document(&text)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, version: &str, file: &SemanticFile) -> Result<()> {
        if *self.fail_writes.read().unwrap_or_else(|e| e.into_inner()) {
            return Err(anyhow!("write refused for {}", version));
        }
        let text = render_document(file)?;
        self.insert_raw(version, text);
        Ok(())
    }

    async fn modified(&self, version: &str) -> Result<Option<DateTime<Utc>>> {
        let versions = self.versions.read().unwrap_or_else(|e| e.into_inner());
        Ok(versions
            .iter()
            .find(|v| v.version == version)
            .map(|v| v.modified))
    }
}
