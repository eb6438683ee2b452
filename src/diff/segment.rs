use serde::{Deserialize, Serialize};

use super::parse_header;

/// A hunk reduced to its line ranges: the lightweight form used when only
/// range containment matters (comment alignment, window verification, bulk
/// statistics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub old_start: u32,
    pub old_end: u32,
    pub new_start: u32,
    pub new_end: u32,
    pub is_commented: bool,
}

impl Segment {
    /// Inclusive containment of `[start, end]` in new-file numbering.
    pub fn contains_new(&self, start: u32, end: u32) -> bool {
        self.new_start <= start && start <= self.new_end && self.new_start <= end && end <= self.new_end
    }

    /// Inclusive containment of `[start, end]` in old-file numbering.
    pub fn contains_old(&self, start: u32, end: u32) -> bool {
        self.old_start <= start && start <= self.old_end && self.old_start <= end && end <= self.old_end
    }

    /// Flip the commented flag, returning whether this call made the
    /// transition. At most one caller ever gets `true`.
    pub fn mark_commented(&mut self) -> bool {
        if self.is_commented {
            return false;
        }
        self.is_commented = true;
        true
    }
}

/// Split raw unified-diff text into hunk ranges.
///
/// Only header lines contribute; body lines and malformed headers are
/// skipped. Empty input yields an empty list, never an error.
pub fn segment_diff(diff_text: &str) -> Vec<Segment> {
    if diff_text.is_empty() {
        return Vec::new();
    }

    diff_text
        .lines()
        .filter(|line| line.starts_with("@@"))
        .filter_map(parse_header)
        .map(|(old, new)| Segment {
            old_start: old.start,
            old_end: old.end(),
            new_start: new.start,
            new_end: new.end(),
            is_commented: false,
        })
        .collect()
}
