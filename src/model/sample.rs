use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::DiffFile;

/// Fixed projection of raw PR metadata. Every field is optional: a metadata
/// lookup miss during assembly yields the default, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrMetadata {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<String>,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub user: Option<Value>,
    #[serde(default)]
    pub labels_name_list: Vec<String>,
    #[serde(default)]
    pub assignees_name_list: Vec<String>,
}

/// One commit's touch of one file, as recorded in the PR commit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStat {
    pub sha: Option<String>,
    pub date: Option<String>,
    pub changes: Option<Value>,
}

/// Canonical per-PR unit of work consumed by downstream review tooling.
/// Built once by dataset assembly; not structurally mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrReviewSample {
    pub repo: String,
    pub pr_number: u64,
    pub metadata: PrMetadata,
    pub diff_files: Vec<DiffFile>,
    #[serde(default)]
    pub comments: Vec<Value>,
    #[serde(default)]
    pub commit_history: BTreeMap<String, Vec<CommitStat>>,
}

impl PrReviewSample {
    #[allow(dead_code)]
    pub fn get_file(&self, file_path: &str) -> Option<&DiffFile> {
        self.diff_files
            .iter()
            .find(|diff_file| diff_file.file_path == file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_defaults_on_sparse_input() {
        let metadata: PrMetadata = serde_json::from_str(r#"{"number": 12, "title": "Fix race"}"#).unwrap();
        assert_eq!(metadata.number, Some(12));
        assert_eq!(metadata.title.as_deref(), Some("Fix race"));
        assert!(metadata.state.is_none());
        assert!(metadata.labels_name_list.is_empty());
    }

    #[test]
    fn test_get_file_by_path() {
        let sample = PrReviewSample {
            repo: "openharmony/account_os_account".to_string(),
            pr_number: 42,
            metadata: PrMetadata::default(),
            diff_files: vec![DiffFile {
                file_path: "services/src/account.cpp".to_string(),
                hunks: Vec::new(),
                historical_comments: Vec::new(),
            }],
            comments: Vec::new(),
            commit_history: BTreeMap::new(),
        };
        assert!(sample.get_file("services/src/account.cpp").is_some());
        assert!(sample.get_file("missing.cpp").is_none());
    }
}
