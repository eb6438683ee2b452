use chrono::{DateTime, FixedOffset};

use crate::diff::segment_diff;
use crate::fetch::CompareFile;
use crate::ingest::record::PrCommitRecord;

use super::Numbering;

/// A validated before/after comparison window around a review comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitWindow {
    pub base_sha: String,
    pub preceding_sha: String,
    pub final_sha: String,
}

/// Why a window candidate was discarded. All variants are tallied
/// degradations, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRejection {
    /// The PR carries no ordered commit list.
    NoCommits,
    /// No commit predates the comment (or the comment time is unparseable).
    NoPreceding,
    /// Two commits tie for latest-before-comment; the window is ambiguous.
    TiedPreceding,
    /// The preceding commit is the base or final SHA: no signal either side.
    Degenerate,
}

/// Locate the commit window for a resolved comment: base and final come from
/// the ordered SHA list, preceding is the latest commit authored at or
/// before the comment's creation time.
pub fn resolve_window(
    commit_shas: &[String],
    pr_commits: &[PrCommitRecord],
    comment_created_at: &str,
) -> Result<CommitWindow, WindowRejection> {
    let (Some(base_sha), Some(final_sha)) = (commit_shas.first(), commit_shas.last()) else {
        return Err(WindowRejection::NoCommits);
    };
    let Ok(created_at) = DateTime::parse_from_rfc3339(comment_created_at) else {
        return Err(WindowRejection::NoPreceding);
    };

    let mut best: Option<(DateTime<FixedOffset>, &str)> = None;
    let mut tied = false;
    for commit in pr_commits {
        let Some(sha) = commit.sha.as_deref() else {
            continue;
        };
        let Some(date) = commit
            .commit
            .as_ref()
            .and_then(|c| c.author.as_ref())
            .and_then(|a| a.date.as_deref())
        else {
            continue;
        };
        let Ok(date) = DateTime::parse_from_rfc3339(date) else {
            continue;
        };
        if date > created_at {
            continue;
        }
        match &best {
            Some((best_date, _)) if date > *best_date => {
                best = Some((date, sha));
                tied = false;
            }
            Some((best_date, _)) if date == *best_date => {
                tied = true;
            }
            Some(_) => {}
            None => best = Some((date, sha)),
        }
    }

    let Some((_, preceding_sha)) = best else {
        return Err(WindowRejection::NoPreceding);
    };
    if tied {
        return Err(WindowRejection::TiedPreceding);
    }
    if preceding_sha == base_sha || preceding_sha == final_sha {
        return Err(WindowRejection::Degenerate);
    }

    Ok(CommitWindow {
        base_sha: base_sha.clone(),
        preceding_sha: preceding_sha.to_string(),
        final_sha: final_sha.clone(),
    })
}

/// Whether a fetched compare-file's patch still covers `[start, end]` in the
/// given numbering. The first containing hunk decides.
pub fn patch_contains(file: &CompareFile, numbering: Numbering, start: u32, end: u32) -> bool {
    let Some(patch) = file.patch.as_deref() else {
        return false;
    };
    segment_diff(patch).iter().any(|segment| match numbering {
        Numbering::New => segment.contains_new(start, end),
        Numbering::Old => segment.contains_old(start, end),
    })
}
