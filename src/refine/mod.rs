mod scrub;

pub use scrub::scrub_url_fields;

use futures::stream::{FuturesUnordered, StreamExt};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::FileClassifier;
use crate::config::Config;
use crate::diff::segment_diff;
use crate::error::{ConfigError, IngestError, PipelineError};
use crate::fetch::CompareFetcher;
use crate::ingest::record::{PrRecord, RefinementRecord};
use crate::ingest::{open_lines, read_jsonl};
use crate::output::JsonlWriter;
use crate::resolve::{
    patch_contains, resolve_comment, resolve_window, CommentResolution, SegmentedFile,
};
use crate::state::State;

#[derive(Debug, Clone, Default)]
pub struct RefineOptions {
    /// Skip input records up to the marker a prior run stored in state.
    pub resume: bool,
    /// Stop after this many PRs (for sampling a large crawl).
    pub limit: Option<usize>,
}

/// Degradation counters for one run. These are the error surface of the
/// pipeline: nothing here is fatal, everything is reported.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Tallies {
    pub prs_seen: usize,
    pub prs_skipped_resume: usize,
    pub malformed_records: usize,
    pub comments_seen: usize,
    pub comments_non_code: usize,
    pub comments_no_range: usize,
    pub comments_unmatched: usize,
    pub hunks_matched: usize,
    pub windows_rejected: usize,
    pub fetch_failures: usize,
    pub range_missing: usize,
    pub duplicates_skipped: usize,
    pub records_emitted: usize,
}

impl Tallies {
    fn absorb(&mut self, other: &Tallies) {
        self.prs_seen += other.prs_seen;
        self.prs_skipped_resume += other.prs_skipped_resume;
        self.malformed_records += other.malformed_records;
        self.comments_seen += other.comments_seen;
        self.comments_non_code += other.comments_non_code;
        self.comments_no_range += other.comments_no_range;
        self.comments_unmatched += other.comments_unmatched;
        self.hunks_matched += other.hunks_matched;
        self.windows_rejected += other.windows_rejected;
        self.fetch_failures += other.fetch_failures;
        self.range_missing += other.range_missing;
        self.duplicates_skipped += other.duplicates_skipped;
        self.records_emitted += other.records_emitted;
    }
}

#[derive(Debug)]
pub struct RefineReport {
    pub run_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub tallies: Tallies,
    pub duration: Duration,
}

/// Drives refinement extraction: per PR, segment the file patches, align
/// each review comment, resolve its commit window, verify both sides
/// through the fetcher, and emit the surviving records.
pub struct Refiner {
    fetcher: Arc<dyn CompareFetcher>,
    classifier: FileClassifier,
    semaphore: Arc<Semaphore>,
    launch_delay: Duration,
}

impl Refiner {
    pub fn new(config: &Config, fetcher: Arc<dyn CompareFetcher>) -> Result<Self, ConfigError> {
        let classifier = FileClassifier::from_config(&config.eligibility)?;
        Ok(Self {
            fetcher,
            classifier,
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            launch_delay: Duration::from_millis(config.launch_delay_ms),
        })
    }

    pub async fn run(
        &self,
        input: &Path,
        output: &Path,
        state: &mut State,
        options: &RefineOptions,
    ) -> Result<RefineReport, PipelineError> {
        let start = std::time::Instant::now();
        let run_id = Uuid::new_v4().to_string();
        let source_key = source_key(input);

        let resume_marker = if options.resume {
            state.last_pr(&source_key)
        } else {
            None
        };
        if let Some(marker) = resume_marker {
            info!("Resuming {} after PR #{}", source_key, marker);
        }

        // Records already in the output survive across resumed runs; their
        // fingerprints keep re-processed comments from being emitted twice.
        let mut seen = load_fingerprints(output)?;
        let mut writer = JsonlWriter::append(output)?;

        let mut tallies = Tallies::default();
        let mut futures = FuturesUnordered::new();
        let mut reached_marker = resume_marker.is_none();
        let mut last_pr_number = None;

        for line in open_lines(input).map_err(PipelineError::Ingest)? {
            let line = line.map_err(IngestError::Io)?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: PrRecord = match serde_json::from_str(trimmed) {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping malformed PR record: {}", e);
                    tallies.malformed_records += 1;
                    continue;
                }
            };
            let Some(pr_number) = record.number else {
                tallies.malformed_records += 1;
                continue;
            };

            if !reached_marker {
                tallies.prs_skipped_resume += 1;
                if Some(pr_number) == resume_marker {
                    reached_marker = true;
                }
                continue;
            }

            if let Some(limit) = options.limit {
                if tallies.prs_seen >= limit {
                    break;
                }
            }
            tallies.prs_seen += 1;
            last_pr_number = Some(pr_number);

            // Small delay between launches to avoid burst-fetching the remote
            if !futures.is_empty() && self.launch_delay > Duration::ZERO {
                sleep(self.launch_delay).await;
            }

            let permit = self.semaphore.clone().acquire_owned().await?;
            let fetcher = self.fetcher.clone();
            let classifier = self.classifier.clone();

            futures.push(tokio::spawn(async move {
                let _permit = permit; // hold until done
                process_pr(record, pr_number, fetcher, classifier).await
            }));
        }

        if !reached_marker {
            warn!(
                "Resume marker PR #{} never appeared in {:?}; nothing processed",
                resume_marker.unwrap_or_default(),
                input
            );
        }

        while let Some(joined) = futures.next().await {
            match joined {
                Ok((records, pr_tallies)) => {
                    tallies.absorb(&pr_tallies);
                    for record in records {
                        if !seen.insert(fingerprint(&record)) {
                            tallies.duplicates_skipped += 1;
                            continue;
                        }
                        let mut value = serde_json::to_value(&record)
                            .map_err(crate::error::OutputError::Serialize)?;
                        scrub_url_fields(&mut value);
                        writer.write(&value)?;
                        tallies.records_emitted += 1;
                        info!(
                            "PR #{}: emitted refinement record",
                            record.pr_number
                        );
                    }
                }
                Err(e) => warn!("PR task panicked: {}", e),
            }
        }

        if let Some(pr_number) = last_pr_number {
            state.record_progress(&source_key, pr_number, tallies.records_emitted);
        }

        Ok(RefineReport {
            run_id,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            tallies,
            duration: start.elapsed(),
        })
    }
}

/// Process one PR: all mutation (segment commented flags) is local to this
/// call, so PRs are safe to run concurrently.
async fn process_pr(
    record: PrRecord,
    pr_number: u64,
    fetcher: Arc<dyn CompareFetcher>,
    classifier: FileClassifier,
) -> (Vec<RefinementRecord>, Tallies) {
    let mut tallies = Tallies::default();

    let mut files: Vec<SegmentedFile> = record
        .pr_files
        .iter()
        .filter_map(|file| file.patch.as_ref())
        .map(|patch| SegmentedFile {
            old_path: patch.old_path.clone(),
            new_path: patch.new_path.clone(),
            segments: patch.diff.as_deref().map(segment_diff).unwrap_or_default(),
        })
        .collect();

    let mut out = Vec::new();

    for comment in &record.diff_comments {
        tallies.comments_seen += 1;

        let resolution = match resolve_comment(&mut files, comment, &classifier) {
            CommentResolution::NonCode => {
                tallies.comments_non_code += 1;
                continue;
            }
            CommentResolution::NoRange => {
                tallies.comments_no_range += 1;
                continue;
            }
            CommentResolution::Unmatched => {
                tallies.comments_unmatched += 1;
                continue;
            }
            CommentResolution::Matched(resolution) => resolution,
        };
        tallies.hunks_matched += 1;

        let Some(created_at) = comment.created_at.as_deref() else {
            tallies.windows_rejected += 1;
            continue;
        };
        let window = match resolve_window(&record.commit_shas, &record.pr_commits, created_at) {
            Ok(window) => window,
            Err(rejection) => {
                debug!("PR #{}: window rejected: {:?}", pr_number, rejection);
                tallies.windows_rejected += 1;
                continue;
            }
        };

        // Both fetches must succeed and both sides must still carry the
        // commented range, otherwise the candidate is silently dropped.
        let before = match fetcher.compare(&window.base_sha, &window.preceding_sha).await {
            Ok(diff) => diff,
            Err(e) => {
                warn!("PR #{}: before-compare failed: {}", pr_number, e);
                tallies.fetch_failures += 1;
                continue;
            }
        };
        let Some(before_file) = before
            .file_for(&resolution.old_path, &resolution.new_path)
            .cloned()
        else {
            tallies.range_missing += 1;
            continue;
        };
        if !patch_contains(&before_file, resolution.numbering, resolution.start, resolution.end) {
            tallies.range_missing += 1;
            continue;
        }

        let after = match fetcher.compare(&window.preceding_sha, &window.final_sha).await {
            Ok(diff) => diff,
            Err(e) => {
                warn!("PR #{}: after-compare failed: {}", pr_number, e);
                tallies.fetch_failures += 1;
                continue;
            }
        };
        let Some(after_file) = after
            .file_for(&resolution.old_path, &resolution.new_path)
            .cloned()
        else {
            tallies.range_missing += 1;
            continue;
        };
        if !patch_contains(&after_file, resolution.numbering, resolution.start, resolution.end) {
            tallies.range_missing += 1;
            continue;
        }

        out.push(RefinementRecord {
            pr_number,
            diff_comment: comment.clone(),
            before_file,
            after_file,
        });
    }

    (out, tallies)
}

fn source_key(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

/// Deterministic fingerprint of a record's comment anchor, for output dedup
/// across resumed runs.
fn fingerprint(record: &RefinementRecord) -> String {
    let comment = &record.diff_comment;
    let (old_path, new_path) = comment.path_pair().unwrap_or(("", ""));
    let input = format!(
        "{}|{}|{}|{:?}|{:?}|{}",
        record.pr_number,
        old_path,
        new_path,
        comment.new_range(),
        comment.old_range(),
        comment.created_at.as_deref().unwrap_or(""),
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{:x}", hash)[..12].to_string()
}

fn load_fingerprints(output: &Path) -> Result<HashSet<String>, PipelineError> {
    if !output.exists() {
        return Ok(HashSet::new());
    }
    let (records, skipped): (Vec<RefinementRecord>, usize) =
        read_jsonl(output).map_err(PipelineError::Ingest)?;
    if skipped > 0 {
        warn!("Ignored {} unparseable records in existing output", skipped);
    }
    Ok(records.iter().map(fingerprint).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EligibilityConfig;
    use crate::fetch::{CompareRecord, ReplayFetcher};
    use serde_json::json;

    fn pr_record() -> PrRecord {
        serde_json::from_value(json!({
            "number": 42,
            "commit_shas": ["base", "c1", "c2"],
            "pr_commits": [
                {"sha": "base", "commit": {"author": {"date": "2024-03-01T08:00:00+08:00"}}},
                {"sha": "c1", "commit": {"author": {"date": "2024-03-02T08:00:00+08:00"}}},
                {"sha": "c2", "commit": {"author": {"date": "2024-03-05T08:00:00+08:00"}}}
            ],
            "pr_files": [
                {"patch": {
                    "old_path": "src/account.cpp",
                    "new_path": "src/account.cpp",
                    "diff": "@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context"
                }}
            ],
            "diff_comments": [
                {
                    "position": {"old_path": "src/account.cpp", "new_path": "src/account.cpp"},
                    "diff_position": {"start_new_line": 11, "end_new_line": 12},
                    "created_at": "2024-03-03T00:00:00+08:00",
                    "body": "please null-check this",
                    "html_url": "https://example.com/c/1"
                }
            ]
        }))
        .unwrap()
    }

    fn compare(base: &str, head: &str) -> CompareRecord {
        serde_json::from_value(json!({
            "base": base,
            "head": head,
            "files": [{
                "filename": "src/account.cpp",
                "patch": "@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context"
            }]
        }))
        .unwrap()
    }

    fn classifier() -> FileClassifier {
        FileClassifier::from_config(&EligibilityConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_process_pr_emits_refinement_record() {
        let fetcher = Arc::new(ReplayFetcher::from_records(vec![
            compare("base", "c1"),
            compare("c1", "c2"),
        ]));
        let (records, tallies) = process_pr(pr_record(), 42, fetcher, classifier()).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pr_number, 42);
        assert_eq!(tallies.hunks_matched, 1);
        assert_eq!(tallies.fetch_failures, 0);
    }

    #[tokio::test]
    async fn test_process_pr_drops_candidate_on_fetch_failure() {
        // Only the before-compare is recorded; the after-compare fails.
        let fetcher = Arc::new(ReplayFetcher::from_records(vec![compare("base", "c1")]));
        let (records, tallies) = process_pr(pr_record(), 42, fetcher, classifier()).await;
        assert!(records.is_empty());
        assert_eq!(tallies.hunks_matched, 1);
        assert_eq!(tallies.fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_process_pr_requires_range_on_both_sides() {
        let mut after = compare("c1", "c2");
        after.files[0].patch = Some("@@ -100,2 +100,2 @@\n-a\n+b\n x".to_string());
        let fetcher = Arc::new(ReplayFetcher::from_records(vec![compare("base", "c1"), after]));
        let (records, tallies) = process_pr(pr_record(), 42, fetcher, classifier()).await;
        assert!(records.is_empty());
        assert_eq!(tallies.range_missing, 1);
    }

    #[tokio::test]
    async fn test_process_pr_second_comment_same_range_not_counted() {
        let mut record = pr_record();
        record.diff_comments.push(record.diff_comments[0].clone());
        let fetcher = Arc::new(ReplayFetcher::from_records(vec![
            compare("base", "c1"),
            compare("c1", "c2"),
        ]));
        let (records, tallies) = process_pr(record, 42, fetcher, classifier()).await;
        assert_eq!(records.len(), 1);
        assert_eq!(tallies.comments_seen, 2);
        assert_eq!(tallies.comments_unmatched, 1);
    }

    #[test]
    fn test_fingerprint_stability() {
        let record = RefinementRecord {
            pr_number: 42,
            diff_comment: serde_json::from_value(json!({
                "position": {"old_path": "a.c", "new_path": "a.c"},
                "diff_position": {"start_new_line": 11, "end_new_line": 12},
                "created_at": "2024-03-03T00:00:00+08:00"
            }))
            .unwrap(),
            before_file: Default::default(),
            after_file: Default::default(),
        };
        let fp1 = fingerprint(&record);
        let fp2 = fingerprint(&record);
        assert_eq!(fp1, fp2);
        assert_eq!(fp1.len(), 12);

        let mut other = record.clone();
        other.pr_number = 43;
        assert_ne!(fingerprint(&other), fp1);
    }
}
