use serde::{Deserialize, Serialize};

/// Classification of one physical diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Added,
    Removed,
    Context,
}

/// One physical line of a hunk, with dual numbering.
///
/// `old_line_no` is present iff the line exists in the old file (removed or
/// context); `new_line_no` iff it exists in the new file (added or context).
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    #[serde(rename = "status")]
    pub kind: LineKind,
    pub content: String,
    pub old_line_no: Option<u32>,
    pub new_line_no: Option<u32>,
}

/// One contiguous change region, expanded to line level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub header: String,
    pub old_start: u32,
    pub old_end: u32,
    pub new_start: u32,
    pub new_end: u32,
    #[serde(default)]
    pub has_comment: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Inclusive containment of `[start, end]` in new-file numbering.
    pub fn contains_new(&self, start: u32, end: u32) -> bool {
        self.new_start <= start && start <= self.new_end && self.new_start <= end && end <= self.new_end
    }

    /// Inclusive containment of `[start, end]` in old-file numbering.
    pub fn contains_old(&self, start: u32, end: u32) -> bool {
        self.old_start <= start && start <= self.old_end && self.old_start <= end && end <= self.old_end
    }

    /// Flip `has_comment`, returning whether this call made the transition.
    /// The flag moves false -> true at most once per hunk.
    pub fn mark_commented(&mut self) -> bool {
        if self.has_comment {
            return false;
        }
        self.has_comment = true;
        true
    }

    /// Reconstruct the new-file view of this hunk (added + context content).
    #[allow(dead_code)]
    pub fn new_view(&self) -> String {
        self.view(|line| line.kind != LineKind::Removed)
    }

    /// Reconstruct the old-file view of this hunk (removed + context content).
    #[allow(dead_code)]
    pub fn old_view(&self) -> String {
        self.view(|line| line.kind != LineKind::Added)
    }

    fn view(&self, keep: impl Fn(&DiffLine) -> bool) -> String {
        self.lines
            .iter()
            .filter(|line| keep(line))
            .map(|line| line.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the changed lines plus up to `context` trailing context lines
    /// after each change group. Leading context beyond the budget is elided.
    #[allow(dead_code)]
    pub fn render_snippet(&self, context: usize) -> String {
        let mut snippet = Vec::new();
        let mut budget = context;
        for line in &self.lines {
            match line.kind {
                LineKind::Added | LineKind::Removed => {
                    snippet.push(line.content.as_str());
                    budget = context;
                }
                LineKind::Context if budget > 0 => {
                    snippet.push(line.content.as_str());
                    budget -= 1;
                }
                LineKind::Context => {}
            }
        }
        snippet.join("\n")
    }
}

/// One file's expanded diff within a PR, plus the opaque review comments
/// historically attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffFile {
    pub file_path: String,
    pub hunks: Vec<DiffHunk>,
    #[serde(default)]
    pub historical_comments: Vec<serde_json::Value>,
}

impl DiffFile {
    /// Hunk whose new-file range is exactly `range`.
    #[allow(dead_code)]
    pub fn hunk_by_new_range(&self, range: (u32, u32)) -> Option<&DiffHunk> {
        self.hunks
            .iter()
            .find(|hunk| hunk.new_start == range.0 && hunk.new_end == range.1)
    }

    /// Line carrying the given new-file line number, if any hunk covers it.
    #[allow(dead_code)]
    pub fn line_by_new_no(&self, new_no: u32) -> Option<&DiffLine> {
        self.hunks
            .iter()
            .flat_map(|hunk| hunk.lines.iter())
            .find(|line| line.new_line_no == Some(new_no))
    }
}
