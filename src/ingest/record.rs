//! Typed views of the crawler's line-delimited JSON records.
//!
//! Raw records are loosely shaped; every field here is optional with a
//! documented default so downstream code never re-checks key presence. A
//! record missing its PR number degrades that one record, never the batch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fetch::CompareFile;

/// One crawled PR with its file patches, commits, and review comments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrRecord {
    pub number: Option<u64>,
    #[serde(default)]
    pub pr_files: Vec<PrFileRecord>,
    #[serde(default)]
    pub pr_commits: Vec<PrCommitRecord>,
    /// Ordered commit SHAs, base first, final state last.
    #[serde(default)]
    pub commit_shas: Vec<String>,
    #[serde(default)]
    pub diff_comments: Vec<DiffCommentRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrFileRecord {
    pub patch: Option<PatchRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchRecord {
    pub diff: Option<String>,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrCommitRecord {
    pub sha: Option<String>,
    pub commit: Option<CommitDetail>,
    #[serde(default)]
    pub files: Vec<CommitFileRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitFileRecord {
    pub filename: Option<String>,
    pub changes: Option<Value>,
}

/// A review comment anchored to a diff position. Unknown fields round-trip
/// through `extra` so emitted records keep the platform's full payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffCommentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<CommentPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_position: Option<DiffPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Line anchors in old/new numbering. Either pair (or both, or neither) may
/// be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_new_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_new_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_old_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_old_line: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiffCommentRecord {
    /// The (old_path, new_path) pair, present only when both sides are.
    pub fn path_pair(&self) -> Option<(&str, &str)> {
        let position = self.position.as_ref()?;
        Some((position.old_path.as_deref()?, position.new_path.as_deref()?))
    }

    /// New-numbering range, present only when both endpoints are.
    pub fn new_range(&self) -> Option<(u32, u32)> {
        let dp = self.diff_position.as_ref()?;
        Some((dp.start_new_line?, dp.end_new_line?))
    }

    /// Old-numbering range, present only when both endpoints are.
    pub fn old_range(&self) -> Option<(u32, u32)> {
        let dp = self.diff_position.as_ref()?;
        Some((dp.start_old_line?, dp.end_old_line?))
    }
}

/// One refinement example: a matched comment joined with the file state
/// before the comment's preceding commit and after the final commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementRecord {
    pub pr_number: u64,
    pub diff_comment: DiffCommentRecord,
    pub before_file: CompareFile,
    pub after_file: CompareFile,
}
