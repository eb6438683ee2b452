use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Repository label stamped into assembled samples, e.g. "openharmony/account_os_account".
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Directory whose `.prweave/` holds resumable run state.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Max PRs processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay between PR task launches, to keep fetch bursts off the remote.
    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub eligibility: EligibilityConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,

    /// Local clone used by `mode: git`.
    #[serde(default)]
    pub git_dir: Option<PathBuf>,

    /// Recorded compare JSONL used by `mode: replay`.
    #[serde(default)]
    pub replay_file: Option<PathBuf>,

    #[serde(default = "default_fetch_timeout_sec")]
    pub timeout_sec: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            git_dir: None,
            replay_file: None,
            timeout_sec: default_fetch_timeout_sec(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Git,
    Replay,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Git => write!(f, "git"),
            FetchMode::Replay => write!(f, "replay"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

/// Glob overrides layered over the extension tables: `exclude` vetoes,
/// `include` force-admits.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct EligibilityConfig {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct DatasetConfig {
    /// Expand hunks to line level in assembled samples.
    #[serde(default = "default_true")]
    pub include_lines: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            include_lines: default_true(),
        }
    }
}
