use crate::classify::FileClassifier;
use crate::diff::Segment;
use crate::ingest::record::DiffCommentRecord;
use crate::model::DiffHunk;

/// Which line numbering a comment's range was matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    New,
    Old,
}

/// One file's hunk ranges paired with the patch's path pair. Renames carry
/// both the pre- and post-rename path.
#[derive(Debug, Clone)]
pub struct SegmentedFile {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub segments: Vec<Segment>,
}

/// A successful comment-to-hunk match, carrying what the window resolver
/// needs downstream.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub old_path: String,
    pub new_path: String,
    pub numbering: Numbering,
    pub start: u32,
    pub end: u32,
}

/// Outcome of one resolution attempt. Everything but `Matched` is a tallied
/// degradation, never an error.
#[derive(Debug, Clone)]
pub enum CommentResolution {
    Matched(Resolution),
    /// Path pair absent, or either side is not a code file.
    NonCode,
    /// No usable start/end pair in either numbering.
    NoRange,
    /// Eligible and ranged, but no containing hunk was free to mark.
    Unmatched,
}

/// Align one review comment onto the hunk that contains its range.
///
/// New-numbering is tried first, old-numbering as fallback. The matched
/// segment's commented flag flips false -> true exactly once; already-marked
/// segments are passed over so a later overlapping hunk can still take the
/// comment. At most one segment is marked per call.
pub fn resolve_comment(
    files: &mut [SegmentedFile],
    comment: &DiffCommentRecord,
    classifier: &FileClassifier,
) -> CommentResolution {
    let Some((old_path, new_path)) = comment.path_pair() else {
        return CommentResolution::NonCode;
    };
    if !classifier.is_code_file(old_path) || !classifier.is_code_file(new_path) {
        return CommentResolution::NonCode;
    }

    let new_range = comment.new_range();
    let old_range = comment.old_range();
    if new_range.is_none() && old_range.is_none() {
        return CommentResolution::NoRange;
    }

    let old_path = old_path.to_string();
    let new_path = new_path.to_string();

    for (numbering, range) in [(Numbering::New, new_range), (Numbering::Old, old_range)] {
        let Some((start, end)) = range else { continue };
        for file in files.iter_mut() {
            if file.old_path.as_deref() != Some(old_path.as_str())
                || file.new_path.as_deref() != Some(new_path.as_str())
            {
                continue;
            }
            for segment in &mut file.segments {
                let contained = match numbering {
                    Numbering::New => segment.contains_new(start, end),
                    Numbering::Old => segment.contains_old(start, end),
                };
                if !contained {
                    continue;
                }
                if segment.mark_commented() {
                    return CommentResolution::Matched(Resolution {
                        old_path,
                        new_path,
                        numbering,
                        start,
                        end,
                    });
                }
                // Already claimed by an earlier comment: keep scanning.
            }
        }
    }

    CommentResolution::Unmatched
}

/// Same alignment against expanded hunks, used when assembling datasets so
/// `has_comment` is faithful in the output. The file is identified by a
/// single path here, so either side of the comment's pair may match it.
pub fn mark_file_hunks(file_path: &str, hunks: &mut [DiffHunk], comment: &DiffCommentRecord) -> bool {
    let Some((old_path, new_path)) = comment.path_pair() else {
        return false;
    };
    if !crate::classify::is_code_file(old_path) || !crate::classify::is_code_file(new_path) {
        return false;
    }
    if file_path != old_path && file_path != new_path {
        return false;
    }

    for (numbering, range) in [
        (Numbering::New, comment.new_range()),
        (Numbering::Old, comment.old_range()),
    ] {
        let Some((start, end)) = range else { continue };
        for hunk in hunks.iter_mut() {
            let contained = match numbering {
                Numbering::New => hunk.contains_new(start, end),
                Numbering::Old => hunk.contains_old(start, end),
            };
            if contained && hunk.mark_commented() {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EligibilityConfig;
    use crate::diff::segment_diff;

    fn classifier() -> FileClassifier {
        FileClassifier::from_config(&EligibilityConfig::default()).unwrap()
    }

    fn comment(old_path: &str, new_path: &str, position: &str) -> DiffCommentRecord {
        serde_json::from_str(&format!(
            r#"{{
                "position": {{"old_path": "{old_path}", "new_path": "{new_path}"}},
                "diff_position": {position}
            }}"#
        ))
        .unwrap()
    }

    fn files() -> Vec<SegmentedFile> {
        vec![SegmentedFile {
            old_path: Some("src/account.cpp".to_string()),
            new_path: Some("src/account.cpp".to_string()),
            segments: segment_diff("@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context"),
        }]
    }

    #[test]
    fn test_new_range_resolves_and_marks() {
        let mut files = files();
        let comment = comment(
            "src/account.cpp",
            "src/account.cpp",
            r#"{"start_new_line": 11, "end_new_line": 12}"#,
        );
        let result = resolve_comment(&mut files, &comment, &classifier());
        let CommentResolution::Matched(resolution) = result else {
            panic!("expected match");
        };
        assert_eq!(resolution.numbering, Numbering::New);
        assert_eq!((resolution.start, resolution.end), (11, 12));
        assert!(files[0].segments[0].is_commented);
    }

    #[test]
    fn test_second_comment_in_same_range_does_not_rematch() {
        let mut files = files();
        let first = comment(
            "src/account.cpp",
            "src/account.cpp",
            r#"{"start_new_line": 11, "end_new_line": 12}"#,
        );
        let second = comment(
            "src/account.cpp",
            "src/account.cpp",
            r#"{"start_new_line": 10, "end_new_line": 13}"#,
        );
        assert!(matches!(
            resolve_comment(&mut files, &first, &classifier()),
            CommentResolution::Matched(_)
        ));
        assert!(matches!(
            resolve_comment(&mut files, &second, &classifier()),
            CommentResolution::Unmatched
        ));
    }

    #[test]
    fn test_boundary_range_is_contained() {
        let mut files = files();
        let comment = comment(
            "src/account.cpp",
            "src/account.cpp",
            r#"{"start_new_line": 10, "end_new_line": 13}"#,
        );
        assert!(matches!(
            resolve_comment(&mut files, &comment, &classifier()),
            CommentResolution::Matched(_)
        ));
    }

    #[test]
    fn test_old_range_fallback() {
        let mut files = files();
        let comment = comment(
            "src/account.cpp",
            "src/account.cpp",
            r#"{"start_old_line": 11, "end_old_line": 12}"#,
        );
        let result = resolve_comment(&mut files, &comment, &classifier());
        let CommentResolution::Matched(resolution) = result else {
            panic!("expected match");
        };
        assert_eq!(resolution.numbering, Numbering::Old);
    }

    #[test]
    fn test_non_code_file_never_resolves() {
        let mut files = vec![SegmentedFile {
            old_path: Some("README.md".to_string()),
            new_path: Some("README.md".to_string()),
            segments: segment_diff("@@ -1,5 +1,5 @@\n a\n-b\n+c\n d\n e"),
        }];
        let comment = comment(
            "README.md",
            "README.md",
            r#"{"start_new_line": 2, "end_new_line": 2}"#,
        );
        assert!(matches!(
            resolve_comment(&mut files, &comment, &classifier()),
            CommentResolution::NonCode
        ));
        assert!(!files[0].segments[0].is_commented);
    }

    #[test]
    fn test_path_pair_must_match_exactly() {
        let mut files = files();
        let comment = comment(
            "src/other.cpp",
            "src/account.cpp",
            r#"{"start_new_line": 11, "end_new_line": 12}"#,
        );
        assert!(matches!(
            resolve_comment(&mut files, &comment, &classifier()),
            CommentResolution::Unmatched
        ));
    }

    #[test]
    fn test_missing_ranges_reported() {
        let mut files = files();
        let comment = comment("src/account.cpp", "src/account.cpp", "{}");
        assert!(matches!(
            resolve_comment(&mut files, &comment, &classifier()),
            CommentResolution::NoRange
        ));
    }

    #[test]
    fn test_range_outside_every_hunk_is_unmatched() {
        let mut files = files();
        let comment = comment(
            "src/account.cpp",
            "src/account.cpp",
            r#"{"start_new_line": 40, "end_new_line": 41}"#,
        );
        assert!(matches!(
            resolve_comment(&mut files, &comment, &classifier()),
            CommentResolution::Unmatched
        ));
    }

    #[test]
    fn test_mark_file_hunks_matches_either_side_path() {
        let mut hunks = crate::diff::expand_diff("@@ -10,3 +10,4 @@\n context\n-old\n+a\n+b\n context");
        let comment = comment(
            "src/renamed_from.cpp",
            "src/renamed_to.cpp",
            r#"{"start_new_line": 11, "end_new_line": 12}"#,
        );
        assert!(mark_file_hunks("src/renamed_to.cpp", &mut hunks, &comment));
        assert!(hunks[0].has_comment);
        // Idempotent: the same comment cannot mark twice.
        assert!(!mark_file_hunks("src/renamed_to.cpp", &mut hunks, &comment));
    }
}
