mod git;
mod replay;
mod retry;

pub use git::GitFetcher;
pub use replay::{CompareRecord, ReplayFetcher};
pub use retry::RetryingFetcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, FetchMode};
use crate::error::{FetchError, PrweaveError};

/// One file entry of a commit comparison. Fields beyond filename/patch are
/// carried through untouched so emitted records keep whatever the platform
/// recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Structural diff between two commits: per-file entries with raw patch text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareDiff {
    #[serde(default)]
    pub files: Vec<CompareFile>,
}

impl CompareDiff {
    /// First file entry whose filename equals either side of a comment's
    /// path pair.
    pub fn file_for(&self, old_path: &str, new_path: &str) -> Option<&CompareFile> {
        self.files.iter().find(|file| {
            file.filename.as_deref() == Some(old_path) || file.filename.as_deref() == Some(new_path)
        })
    }
}

/// Commit-diff fetch collaborator. The pipeline calls this exactly once per
/// comparison; retries belong to implementations, never the caller.
#[async_trait]
pub trait CompareFetcher: Send + Sync {
    #[allow(dead_code)]
    fn name(&self) -> &'static str;

    async fn compare(&self, base: &str, head: &str) -> Result<CompareDiff, FetchError>;
}

/// Build the configured fetcher, wrapped in retry.
pub fn create_fetcher(config: &Config) -> Result<Arc<dyn CompareFetcher>, PrweaveError> {
    let timeout = Duration::from_secs(config.fetch.timeout_sec);
    let inner: Arc<dyn CompareFetcher> = match config.fetch.mode {
        FetchMode::Git => {
            let git_dir = config
                .fetch
                .git_dir
                .clone()
                .ok_or(crate::error::ConfigError::MissingGitDir)?;
            Arc::new(GitFetcher::new(git_dir, timeout))
        }
        FetchMode::Replay => {
            let replay_file = config
                .fetch
                .replay_file
                .clone()
                .ok_or(crate::error::ConfigError::MissingReplayFile)?;
            Arc::new(ReplayFetcher::load(&replay_file)?)
        }
    };
    Ok(Arc::new(RetryingFetcher::new(inner, config.retry.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_for_matches_either_path() {
        let diff = CompareDiff {
            files: vec![
                CompareFile {
                    filename: Some("docs/notes.md".to_string()),
                    ..Default::default()
                },
                CompareFile {
                    filename: Some("src/new_name.rs".to_string()),
                    ..Default::default()
                },
            ],
        };
        assert!(diff.file_for("src/old_name.rs", "src/new_name.rs").is_some());
        assert!(diff.file_for("src/gone.rs", "src/also_gone.rs").is_none());
    }

    #[test]
    fn test_compare_file_round_trips_extra_fields() {
        let raw = r#"{"filename": "a.c", "patch": "@@ -1 +1 @@", "additions": 3, "status": "modified"}"#;
        let file: CompareFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.extra.get("additions"), Some(&Value::from(3)));
        let back = serde_json::to_value(&file).unwrap();
        assert_eq!(back.get("status"), Some(&Value::from("modified")));
    }
}
