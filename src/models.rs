//! Core data models used throughout Semantic Explorer.
//!
//! A [`SemanticFile`] is the on-disk document for one version: metadata, the
//! reasoning-and-planning narrative, and an ordered list of [`SemanticChunk`]s.
//! Over the message protocol chunks travel as [`ChunkEntry`] values, which add
//! a stable opaque id that is never written back to disk.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Name of a snapshot, derived from a `<version><suffix>` file name.
pub type VersionId = String;

/// Length (in hex characters) of the fingerprint part of a chunk id.
const CHUNK_ID_LEN: usize = 16;

/// One version's structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticFile {
    pub metadata: Metadata,
    #[serde(default)]
    pub reasoning_and_planning: Vec<String>,
    pub chunks: Vec<SemanticChunk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: String,
    pub chunk_count: usize,
    pub version: String,
}

/// A titled, tagged unit of semantic content with a review flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticChunk {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
    pub generated_timestamp: String,
    /// Missing or null on older files; normalized to `false` when loaded.
    #[serde(default, deserialize_with = "null_as_false")]
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub code: String,
    pub explanation: String,
}

/// A chunk as it crosses the message channel: the record plus its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkEntry {
    pub id: String,
    #[serde(flatten)]
    pub chunk: SemanticChunk,
}

/// How a request addresses a chunk: by stable id or by position.
///
/// Serialized as `{"id": "..."}` or `{"index": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChunkTarget {
    Id(String),
    Index(usize),
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl SemanticFile {
    /// True when every chunk is approved. An empty file counts as reviewed.
    pub fn all_approved(&self) -> bool {
        self.chunks.iter().all(|c| c.approved)
    }

    /// Chunks paired with their ids, in storage order.
    pub fn entries(&self) -> Vec<ChunkEntry> {
        assign_ids(&self.chunks)
    }

    /// Translate a target into a position in `chunks`.
    ///
    /// Returns `None` when the index is out of range or no chunk carries the id.
    pub fn position_of(&self, target: &ChunkTarget) -> Option<usize> {
        match target {
            ChunkTarget::Index(i) => (*i < self.chunks.len()).then_some(*i),
            ChunkTarget::Id(id) => self.entries().iter().position(|e| &e.id == id),
        }
    }
}

impl SemanticChunk {
    fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.generated_timestamp.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.title.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.description.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        hex[..CHUNK_ID_LEN].to_string()
    }
}

/// Assign ids to a list of chunks.
///
/// The id is a fingerprint of the fields that identify a chunk, so it survives
/// reloads and position shifts. Identical chunks get an occurrence suffix
/// (`-1`, `-2`, ...) in storage order.
pub fn assign_ids(chunks: &[SemanticChunk]) -> Vec<ChunkEntry> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    chunks
        .iter()
        .map(|chunk| {
            let fp = chunk.fingerprint();
            let n = seen.entry(fp.clone()).or_insert(0);
            let id = if *n == 0 { fp } else { format!("{}-{}", fp, n) };
            *n += 1;
            ChunkEntry {
                id,
                chunk: chunk.clone(),
            }
        })
        .collect()
}

impl fmt::Display for ChunkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkTarget::Id(id) => write!(f, "id {}", id),
            ChunkTarget::Index(i) => write!(f, "index {}", i),
        }
    }
}

/// Numeric strings are positions; anything else is an id.
impl FromStr for ChunkTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("chunk target must not be empty".to_string());
        }
        Ok(match s.parse::<usize>() {
            Ok(i) => ChunkTarget::Index(i),
            Err(_) => ChunkTarget::Id(s.to_string()),
        })
    }
}
