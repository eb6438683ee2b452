mod comment;
mod window;

pub use comment::{
    mark_file_hunks, resolve_comment, CommentResolution, Numbering, Resolution, SegmentedFile,
};
pub use window::{patch_contains, resolve_window, CommitWindow, WindowRejection};
