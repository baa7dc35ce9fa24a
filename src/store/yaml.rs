//! YAML directory backend.
//!
//! Each version lives in `<semantic_dir>/<version><suffix>`. Loads read the
//! whole file, saves serialize the whole document and overwrite it in place.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::SemanticStore;
use crate::catalog::{file_name_for, is_valid_version, scan_versions};
use crate::config::Config;
use crate::models::{SemanticFile, VersionId};

pub struct YamlStore {
    dir: PathBuf,
    suffix: String,
}

impl YamlStore {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.semantic_dir(), config.project.suffix.clone())
    }

    pub fn path_for(&self, version: &str) -> PathBuf {
        self.dir.join(file_name_for(version, &self.suffix))
    }

    /// Path for `version`, refusing names that would leave the directory.
    fn checked_path(&self, version: &str) -> Result<PathBuf> {
        if !is_valid_version(version) {
            bail!("invalid version name: {:?}", version);
        }
        Ok(self.path_for(version))
    }
}

/// Parse a version document from YAML text.
pub fn parse_document(text: &str) -> Result<SemanticFile> {
    let file: SemanticFile = serde_yaml::from_str(text)?;
    Ok(file)
}

/// Serialize a version document to YAML text.
pub fn render_document(file: &SemanticFile) -> Result<String> {
    Ok(serde_yaml::to_string(file)?)
}

#[async_trait]
impl SemanticStore for YamlStore {
    async fn list_versions(&self) -> Result<Vec<VersionId>> {
        let dir = self.dir.clone();
        let suffix = self.suffix.clone();
        tokio::task::spawn_blocking(move || scan_versions(&dir, &suffix)).await?
    }

    async fn load(&self, version: &str) -> Result<Option<SemanticFile>> {
        let path = self.checked_path(version)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let file = parse_document(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(file))
    }

    async fn save(&self, version: &str, file: &SemanticFile) -> Result<()> {
        let path = self.checked_path(version)?;
        let text = render_document(file)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "writing version file");
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    async fn modified(&self, version: &str) -> Result<Option<DateTime<Utc>>> {
        match tokio::fs::metadata(self.checked_path(version)?).await {
            Ok(meta) => Ok(meta.modified().ok().map(DateTime::<Utc>::from)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
