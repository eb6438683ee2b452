use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use crate::error::FetchError;

use super::{CompareDiff, CompareFetcher, CompareFile};

/// Commit comparison against a local clone, via the `git` CLI.
pub struct GitFetcher {
    repo_dir: PathBuf,
    timeout: Duration,
    path_re: Regex,
}

impl GitFetcher {
    pub fn new(repo_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            repo_dir,
            timeout,
            // `diff --git a/<old> b/<new>`, with optional quoting of either side
            path_re: Regex::new(r#"^diff --git "?a/(.+?)"? "?b/(.+?)"?$"#)
                .expect("hardcoded diff path regex"),
        }
    }

    /// Split raw `git diff` output into per-file entries. Each entry's patch
    /// is the hunk text from its first `@@` header onward, matching the
    /// compare-API patch fields the rest of the pipeline consumes.
    fn parse_compare_output(&self, output: &str) -> Vec<CompareFile> {
        let mut files: Vec<CompareFile> = Vec::new();
        let mut in_patch = false;

        for line in output.lines() {
            if let Some(caps) = self.path_re.captures(line) {
                let filename = caps.get(2).map(|m| m.as_str().to_string());
                files.push(CompareFile {
                    filename,
                    patch: None,
                    extra: serde_json::Map::new(),
                });
                in_patch = false;
                continue;
            }

            let Some(current) = files.last_mut() else {
                continue;
            };
            if line.starts_with("@@") {
                in_patch = true;
            }
            if in_patch {
                let patch = current.patch.get_or_insert_with(String::new);
                if !patch.is_empty() {
                    patch.push('\n');
                }
                patch.push_str(line);
            }
        }

        files
    }
}

#[async_trait]
impl CompareFetcher for GitFetcher {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareDiff, FetchError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo_dir)
            .args(["diff", "--no-color", &format!("{base}...{head}")]);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::GitDiff(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(CompareDiff {
            files: self.parse_compare_output(&stdout),
        })
    }
}
