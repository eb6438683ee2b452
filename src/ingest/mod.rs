mod jsonl;
pub mod record;

pub use jsonl::{open_lines, read_jsonl};
