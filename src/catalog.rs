//! Version discovery.
//!
//! A version exists when the semantic directory holds a file named
//! `<version><suffix>`. Only direct children are considered and the result
//! keeps directory-listing order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

use crate::models::VersionId;

/// Per-version status line for `semx versions`.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionSummary {
    pub version: VersionId,
    pub chunk_count: usize,
    pub approved_count: usize,
    pub modified: Option<DateTime<Utc>>,
}

impl VersionSummary {
    pub fn all_approved(&self) -> bool {
        self.approved_count == self.chunk_count
    }
}

/// List the versions present in `dir`.
///
/// A missing directory is a normal state and yields an empty list.
pub fn scan_versions(dir: &Path, suffix: &str) -> Result<Vec<VersionId>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "semantic directory not found");
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(version) = version_from_file_name(&name, suffix) {
            versions.push(version.to_string());
        }
    }

    Ok(versions)
}

/// `"1.0-chunks.yaml"` → `Some("1.0")`; names without a prefix are rejected.
pub fn version_from_file_name<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    name.strip_suffix(suffix).filter(|v| !v.is_empty())
}

/// True when `version` names a file directly inside the semantic directory:
/// non-empty, no path separators, not `.` or `..`.
pub fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version != "."
        && version != ".."
        && !version.contains(['/', '\\', '\0'])
}

pub fn file_name_for(version: &str, suffix: &str) -> String {
    format!("{}{}", version, suffix)
}

pub fn format_ts_iso(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let versions = scan_versions(&tmp.path().join(".semantic"), "-chunks.yaml").unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_only_matching_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("1.0-chunks.yaml"), "").unwrap();
        fs::write(dir.join("2.0-chunks.yaml"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("3.0-chunks.yml"), "").unwrap();
        fs::write(dir.join("-chunks.yaml"), "").unwrap();
        fs::create_dir(dir.join("4.0-chunks.yaml")).unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("5.0-chunks.yaml"), "").unwrap();

        let versions = scan_versions(dir, "-chunks.yaml").unwrap();
        assert_eq!(versions.len(), 2);
        let set: HashSet<_> = versions.into_iter().collect();
        assert!(set.contains("1.0"));
        assert!(set.contains("2.0"));
    }

    #[test]
    fn test_version_from_file_name() {
        assert_eq!(
            version_from_file_name("v2-chunks.yaml", "-chunks.yaml"),
            Some("v2")
        );
        assert_eq!(version_from_file_name("-chunks.yaml", "-chunks.yaml"), None);
        assert_eq!(version_from_file_name("v2.yaml", "-chunks.yaml"), None);
        assert_eq!(file_name_for("v2", "-chunks.yaml"), "v2-chunks.yaml");
    }

    #[test]
    fn test_is_valid_version() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("v2..rc"));
        assert!(!is_valid_version(""));
        assert!(!is_valid_version(".."));
        assert!(!is_valid_version("../outside"));
        assert!(!is_valid_version("a/b"));
        assert!(!is_valid_version("a\\b"));
    }
}
