pub mod build;
pub mod inspect;
pub mod refine;
pub mod schema;
pub mod tasks;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prweave")]
#[command(
    author,
    version,
    about = "PR diff reconstruction and review-comment alignment for code review datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract refinement examples from a crawled PR JSONL
    Refine(RefineArgs),

    /// Assemble per-PR review samples from the three crawler outputs
    Build(BuildArgs),

    /// Emit downstream task input projections from an assembled dataset
    Tasks(TasksArgs),

    /// Parse a raw patch file and print its hunks
    Inspect(InspectArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RefineArgs {
    /// Crawled PR records (pr_files + pr_commits + diff_comments per line)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to config file
    #[arg(short, long, default_value = "prweave.yaml")]
    pub config: PathBuf,

    /// Output JSONL (default: <output_dir>/refinements.jsonl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override output directory for summaries
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Override max concurrent PRs
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Compare against this local clone (sets fetch mode to git)
    #[arg(long)]
    pub git_dir: Option<PathBuf>,

    /// Serve comparisons from this recorded JSONL (sets fetch mode to replay)
    #[arg(long)]
    pub replay_file: Option<PathBuf>,

    /// Stop after this many PRs
    #[arg(long)]
    pub limit: Option<usize>,

    /// Ignore the resume marker and reprocess from the top
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Clone)]
pub struct BuildArgs {
    /// PR metadata/issue JSONL
    #[arg(long)]
    pub pr_issue: PathBuf,

    /// PR commit/file detail JSONL
    #[arg(long)]
    pub pr_commit: PathBuf,

    /// Refinement records produced by `prweave refine`
    #[arg(long)]
    pub refinement: PathBuf,

    /// Path to config file
    #[arg(short, long, default_value = "prweave.yaml")]
    pub config: PathBuf,

    /// Repository label (overrides config)
    #[arg(long)]
    pub repo: Option<String>,

    /// Output JSONL (default: <output_dir>/dataset.jsonl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep hunks at range level, without expanded lines
    #[arg(long)]
    pub no_lines: bool,
}

#[derive(Parser, Clone)]
pub struct TasksArgs {
    /// Assembled dataset JSONL from `prweave build`
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Which task's inputs to emit
    #[arg(long, value_enum)]
    pub task: TaskKind,

    /// Auxiliary records keyed by pr_number (decisions, hunks, or issues)
    #[arg(long)]
    pub aux: Option<PathBuf>,

    /// Output JSONL (default: <task>_inputs.jsonl next to the dataset)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskKind {
    ReviewNecessity,
    CommentGeneration,
    DefectLocation,
    FixGeneration,
}

impl TaskKind {
    pub fn file_stem(&self) -> &'static str {
        match self {
            TaskKind::ReviewNecessity => "review_necessity",
            TaskKind::CommentGeneration => "comment_generation",
            TaskKind::DefectLocation => "defect_location",
            TaskKind::FixGeneration => "fix_generation",
        }
    }
}

#[derive(Parser, Clone)]
pub struct InspectArgs {
    /// File holding raw unified-diff text for one file
    #[arg(value_name = "PATCH")]
    pub patch: PathBuf,

    /// Print range segments instead of expanded hunks
    #[arg(long)]
    pub segments: bool,
}
