use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::connector_git::parse_repo_name;
use crate::error::AggregateError;
use crate::models::DirectoryDescriptor;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// GitHub login to report on. Detected through `gh` when absent.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub directories: Vec<DirectoryConfig>,
}

fn default_days() -> u32 {
    1
}

/// What to do with a directory whose collection exceeded the timeout.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Leave the directory out of the result.
    #[default]
    Omit,
    /// Report it with an empty placeholder, like any other failure.
    Placeholder,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    #[serde(default)]
    pub on_timeout: TimeoutPolicy,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            task_timeout_secs: 30,
            on_timeout: TimeoutPolicy::Omit,
        }
    }
}

fn default_max_workers() -> usize {
    4
}
fn default_task_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GitHubBackend {
    #[default]
    Cli,
    Api,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    #[serde(default)]
    pub backend: GitHubBackend,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_gh_binary")]
    pub gh_binary: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            backend: GitHubBackend::Cli,
            limit: 100,
            gh_binary: "gh".to_string(),
            api_url: "https://api.github.com".to_string(),
            timeout_secs: 60,
        }
    }
}

fn default_limit() -> u32 {
    100
}
fn default_gh_binary() -> String {
    "gh".to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_github_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Log every git/gh invocation with its exit status.
    #[serde(default)]
    pub verbose_commands: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose_commands: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryConfig {
    pub id: String,
    pub path: PathBuf,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub repo_name: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl DirectoryConfig {
    /// Normalize into a descriptor: `~/` expanded, blank strings dropped,
    /// `repo_name` derived from `remote_url` when not given.
    pub fn descriptor(&self) -> DirectoryDescriptor {
        let remote_url = non_blank(self.remote_url.as_deref());
        let repo_name = non_blank(self.repo_name.as_deref())
            .or_else(|| remote_url.as_deref().and_then(parse_repo_name));
        DirectoryDescriptor {
            id: self.id.clone(),
            path: expand_tilde(&self.path),
            branch: non_blank(self.branch.as_deref()),
            enabled: self.enabled,
            remote_url,
            repo_name,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Config {
    /// A config with no directories and all defaults.
    pub fn minimal() -> Self {
        Self {
            user: None,
            days: default_days(),
            collection: CollectionConfig::default(),
            github: GitHubConfig::default(),
            log: LogConfig::default(),
            directories: Vec::new(),
        }
    }

    /// All configured directories, in file order.
    pub fn descriptors(&self) -> Vec<DirectoryDescriptor> {
        self.directories.iter().map(|d| d.descriptor()).collect()
    }

    /// Enabled directories whose path exists, in file order.
    ///
    /// Missing paths are skipped with a warning. An empty selection is a
    /// fatal error: aggregation must not start without directories.
    pub fn select_directories(&self) -> Result<Vec<DirectoryDescriptor>> {
        let selected: Vec<DirectoryDescriptor> = self
            .descriptors()
            .into_iter()
            .filter(|d| d.enabled)
            .filter(|d| {
                if d.path.exists() {
                    true
                } else {
                    tracing::warn!(id = %d.id, "directory not found: {} (skipping)", d.path.display());
                    false
                }
            })
            .collect();

        if selected.is_empty() {
            return Err(AggregateError::NoDirectories.into());
        }
        Ok(selected)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

/// Default config location: `~/.config/gh-standup/config.toml`.
pub fn default_config_path() -> PathBuf {
    expand_tilde(Path::new("~/.config/gh-standup/config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let path = expand_tilde(path);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.days == 0 {
        bail!("days must be >= 1");
    }

    if config.collection.max_workers == 0 {
        bail!("collection.max_workers must be >= 1");
    }
    if config.collection.task_timeout_secs == 0 {
        bail!("collection.task_timeout_secs must be >= 1");
    }

    if !(1..=1000).contains(&config.github.limit) {
        bail!("github.limit must be in [1, 1000]");
    }
    if config.github.timeout_secs == 0 {
        bail!("github.timeout_secs must be >= 1");
    }

    let mut seen = HashSet::new();
    for dir in &config.directories {
        if dir.id.trim().is_empty() {
            bail!("directory with path '{}' has an empty id", dir.path.display());
        }
        if !seen.insert(dir.id.as_str()) {
            bail!("duplicate directory id: '{}'", dir.id);
        }
    }

    Ok(())
}
