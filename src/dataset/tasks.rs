//! Input projections for the downstream review-assistant tasks.
//!
//! Each projection is a pure, typed view of one sample (plus any externally
//! produced records for that PR), passed explicitly instead of through a
//! shared key-value store.

use serde::Serialize;
use serde_json::Value;

use crate::model::{DiffFile, PrMetadata, PrReviewSample};

#[derive(Debug, Serialize)]
pub struct ReviewNecessityInput<'a> {
    pub repo: &'a str,
    pub pr_number: u64,
    pub metadata: &'a PrMetadata,
    pub diff_files: Vec<DiffFile>,
}

#[derive(Debug, Serialize)]
pub struct CommentGenerationInput<'a> {
    pub repo: &'a str,
    pub pr_number: u64,
    pub need_review_hunks: Vec<&'a Value>,
    pub comments: &'a [Value],
    pub diff_files: &'a [DiffFile],
}

#[derive(Debug, Serialize)]
pub struct DefectLocationInput<'a> {
    pub repo: &'a str,
    pub pr_number: u64,
    pub target_hunks: &'a [Value],
    pub line_expanded_diff: &'a [DiffFile],
}

#[derive(Debug, Serialize)]
pub struct FixGenerationInput<'a> {
    pub repo: &'a str,
    pub pr_number: u64,
    pub issues: &'a [Value],
    pub diff_files: &'a [DiffFile],
}

/// Review-necessity judgment wants ranges, not line bodies.
pub fn review_necessity_inputs(sample: &PrReviewSample) -> ReviewNecessityInput<'_> {
    ReviewNecessityInput {
        repo: &sample.repo,
        pr_number: sample.pr_number,
        metadata: &sample.metadata,
        diff_files: sample.diff_files.iter().map(without_lines).collect(),
    }
}

/// Comment generation sees only hunks an upstream decision flagged as
/// needing review.
pub fn comment_generation_inputs<'a>(
    sample: &'a PrReviewSample,
    decisions: &'a [Value],
) -> CommentGenerationInput<'a> {
    let need_review_hunks = decisions
        .iter()
        .filter(|decision| {
            decision
                .get("need_review")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
        .collect();
    CommentGenerationInput {
        repo: &sample.repo,
        pr_number: sample.pr_number,
        need_review_hunks,
        comments: &sample.comments,
        diff_files: &sample.diff_files,
    }
}

pub fn defect_location_inputs<'a>(
    sample: &'a PrReviewSample,
    target_hunks: &'a [Value],
) -> DefectLocationInput<'a> {
    DefectLocationInput {
        repo: &sample.repo,
        pr_number: sample.pr_number,
        target_hunks,
        line_expanded_diff: &sample.diff_files,
    }
}

pub fn fix_generation_inputs<'a>(
    sample: &'a PrReviewSample,
    issues: &'a [Value],
) -> FixGenerationInput<'a> {
    FixGenerationInput {
        repo: &sample.repo,
        pr_number: sample.pr_number,
        issues,
        diff_files: &sample.diff_files,
    }
}

fn without_lines(diff_file: &DiffFile) -> DiffFile {
    let mut stripped = diff_file.clone();
    for hunk in &mut stripped.hunks {
        hunk.lines.clear();
    }
    stripped
}
