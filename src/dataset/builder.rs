use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::diff::expand_diff;
use crate::error::IngestError;
use crate::ingest::read_jsonl;
use crate::ingest::record::{DiffCommentRecord, PrRecord, RefinementRecord};
use crate::model::{CommitStat, DiffFile, PrMetadata, PrReviewSample};
use crate::resolve::mark_file_hunks;

/// Joins the three crawler outputs into canonical samples. The join is
/// anchored on the refinement stream: every parsed refinement record yields
/// one sample; metadata and commit-history misses fall back to defaults.
pub struct DatasetBuilder {
    repo: String,
    include_lines: bool,
}

impl DatasetBuilder {
    pub fn new(repo: impl Into<String>, include_lines: bool) -> Self {
        Self {
            repo: repo.into(),
            include_lines,
        }
    }

    pub fn load_samples(
        &self,
        pr_issue_file: &Path,
        pr_commit_file: &Path,
        refinement_file: &Path,
    ) -> Result<Vec<PrReviewSample>, IngestError> {
        let (issue_records, issue_skipped): (Vec<PrMetadata>, usize) = read_jsonl(pr_issue_file)?;
        let metadata_map: HashMap<u64, PrMetadata> = issue_records
            .into_iter()
            .filter_map(|metadata| metadata.number.map(|number| (number, metadata)))
            .collect();

        let (commit_records, commit_skipped): (Vec<PrRecord>, usize) = read_jsonl(pr_commit_file)?;
        let commit_map: HashMap<u64, PrRecord> = commit_records
            .into_iter()
            .filter_map(|record| record.number.map(|number| (number, record)))
            .collect();

        let (refinements, refinement_skipped): (Vec<RefinementRecord>, usize) =
            read_jsonl(refinement_file)?;
        if issue_skipped + commit_skipped + refinement_skipped > 0 {
            debug!(
                "Skipped unparseable records: {} issue, {} commit, {} refinement",
                issue_skipped, commit_skipped, refinement_skipped
            );
        }

        let mut samples = Vec::with_capacity(refinements.len());
        for entry in refinements {
            let commit_entry = commit_map.get(&entry.pr_number);
            samples.push(PrReviewSample {
                repo: self.repo.clone(),
                pr_number: entry.pr_number,
                metadata: metadata_map
                    .get(&entry.pr_number)
                    .cloned()
                    .unwrap_or_default(),
                diff_files: self.build_diff_files(&entry),
                comments: collect_comments(&entry, commit_entry),
                commit_history: commit_entry
                    .map(extract_commit_history)
                    .unwrap_or_default(),
            });
        }

        info!(
            "Assembled {} samples for {}",
            samples.len(),
            self.repo
        );
        Ok(samples)
    }

    /// Expand the record's before/after compare-files into DiffFiles. When
    /// both sides name the same filename only the first occurrence is
    /// expanded, so a file pulled from two comparisons is not double-counted.
    fn build_diff_files(&self, entry: &RefinementRecord) -> Vec<DiffFile> {
        let mut seen_paths = HashSet::new();
        let mut diff_files = Vec::new();

        for blob in [&entry.before_file, &entry.after_file] {
            let Some(filename) = blob.filename.as_deref() else {
                continue;
            };
            let Some(patch) = blob.patch.as_deref() else {
                continue;
            };
            if !seen_paths.insert(filename.to_string()) {
                continue;
            }

            let mut hunks = expand_diff(patch);
            mark_file_hunks(filename, &mut hunks, &entry.diff_comment);
            if !self.include_lines {
                for hunk in &mut hunks {
                    hunk.lines.clear();
                }
            }

            diff_files.push(DiffFile {
                file_path: filename.to_string(),
                hunks,
                historical_comments: vec![comment_value(&entry.diff_comment)],
            });
        }

        diff_files
    }
}

/// Sample-level comments: the refinement record's own comment plus the full
/// diff-comment list from the commit-detail source.
fn collect_comments(
    entry: &RefinementRecord,
    commit_entry: Option<&PrRecord>,
) -> Vec<serde_json::Value> {
    let mut comments = vec![comment_value(&entry.diff_comment)];
    if let Some(record) = commit_entry {
        comments.extend(record.diff_comments.iter().map(comment_value));
    }
    comments
}

fn comment_value(comment: &DiffCommentRecord) -> serde_json::Value {
    serde_json::to_value(comment).unwrap_or_default()
}

fn extract_commit_history(record: &PrRecord) -> BTreeMap<String, Vec<CommitStat>> {
    let mut history: BTreeMap<String, Vec<CommitStat>> = BTreeMap::new();
    for commit in &record.pr_commits {
        let date = commit
            .commit
            .as_ref()
            .and_then(|c| c.author.as_ref())
            .and_then(|a| a.date.clone());
        for file in &commit.files {
            let Some(filename) = file.filename.as_deref() else {
                continue;
            };
            history.entry(filename.to_string()).or_default().push(CommitStat {
                sha: commit.sha.clone(),
                date: date.clone(),
                changes: file.changes.clone(),
            });
        }
    }
    history
}
