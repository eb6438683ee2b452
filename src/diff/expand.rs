use crate::model::{DiffHunk, DiffLine, LineKind};

use super::parse_header;

/// Expand raw unified-diff text into line-level hunks.
///
/// Line numbers are assigned by two counters seeded from each header's start
/// values: removed/context lines consume the old counter, added/context lines
/// the new counter. A new header always starts a new hunk and reseeds both
/// counters, even if the previous hunk's declared span was not exhausted.
/// Body lines before the first valid header, and malformed `@@` lines, are
/// skipped. Never fails; empty input yields no hunks.
pub fn expand_diff(diff_text: &str) -> Vec<DiffHunk> {
    if diff_text.is_empty() {
        return Vec::new();
    }

    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut old_line = 0u32;
    let mut new_line = 0u32;
    let mut in_hunk = false;

    for line in diff_text.lines() {
        if line.starts_with("@@") {
            if let Some((old, new)) = parse_header(line) {
                old_line = old.start;
                new_line = new.start;
                in_hunk = true;
                hunks.push(DiffHunk {
                    header: line.to_string(),
                    old_start: old.start,
                    old_end: old.end(),
                    new_start: new.start,
                    new_end: new.end(),
                    has_comment: false,
                    lines: Vec::new(),
                });
            }
            continue;
        }

        if !in_hunk {
            continue;
        }
        let Some(hunk) = hunks.last_mut() else {
            continue;
        };

        match line.as_bytes().first() {
            Some(b'+') => {
                hunk.lines.push(DiffLine {
                    kind: LineKind::Added,
                    content: line[1..].to_string(),
                    old_line_no: None,
                    new_line_no: Some(new_line),
                });
                new_line += 1;
            }
            Some(b'-') => {
                hunk.lines.push(DiffLine {
                    kind: LineKind::Removed,
                    content: line[1..].to_string(),
                    old_line_no: Some(old_line),
                    new_line_no: None,
                });
                old_line += 1;
            }
            _ => {
                let content = line.strip_prefix(' ').unwrap_or(line);
                hunk.lines.push(DiffLine {
                    kind: LineKind::Context,
                    content: content.to_string(),
                    old_line_no: Some(old_line),
                    new_line_no: Some(new_line),
                });
                old_line += 1;
                new_line += 1;
            }
        }
    }

    hunks
}
