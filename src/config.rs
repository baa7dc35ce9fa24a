use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Directory under `root` holding the per-version files.
    #[serde(default = "default_semantic_dir")]
    pub semantic_dir: String,
    /// File name suffix that marks a version file (`<version><suffix>`).
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            semantic_dir: default_semantic_dir(),
            suffix: default_suffix(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_semantic_dir() -> String {
    ".semantic".to_string()
}
fn default_suffix() -> String {
    "-chunks.yaml".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7332".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `semantic_explorer=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Configuration with every default, rooted at the working directory.
    pub fn minimal() -> Self {
        Self {
            project: ProjectConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Absolute-or-relative path of the directory holding version files.
    pub fn semantic_dir(&self) -> PathBuf {
        self.project.root.join(&self.project.semantic_dir)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` when it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.project.semantic_dir.trim().is_empty() {
        anyhow::bail!("project.semantic_dir must not be empty");
    }

    if config.project.suffix.is_empty() {
        anyhow::bail!("project.suffix must not be empty");
    }

    if config.project.suffix.contains('/') || config.project.suffix.contains('\\') {
        anyhow::bail!(
            "project.suffix must be a file name suffix, got '{}'",
            config.project.suffix
        );
    }

    if config.server.bind.parse::<SocketAddr>().is_err() {
        anyhow::bail!(
            "server.bind must be a socket address like 127.0.0.1:7332, got '{}'",
            config.server.bind
        );
    }

    Ok(())
}
