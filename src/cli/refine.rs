use tracing::{info, warn};

use crate::cli::RefineArgs;
use crate::config::{Config, FetchMode};
use crate::fetch::create_fetcher;
use crate::output::write_refine_summary;
use crate::refine::{RefineOptions, Refiner};
use crate::state::State;

pub async fn execute(args: RefineArgs) -> anyhow::Result<()> {
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(git_dir) = args.git_dir {
        config.fetch.mode = FetchMode::Git;
        config.fetch.git_dir = Some(git_dir);
    }
    if let Some(replay_file) = args.replay_file {
        config.fetch.mode = FetchMode::Replay;
        config.fetch.replay_file = Some(replay_file);
    }
    config.validate_fetch()?;

    let output = args
        .output
        .unwrap_or_else(|| config.output_dir.join("refinements.jsonl"));

    let fetcher = create_fetcher(&config)?;
    let refiner = Refiner::new(&config, fetcher)?;
    let mut state = State::load(&config.workdir);

    let options = RefineOptions {
        resume: !args.force,
        limit: args.limit,
    };

    info!(
        "Refining {:?} -> {:?} (fetch: {}, concurrency {})",
        args.input, output, config.fetch.mode, config.concurrency
    );
    let report = refiner.run(&args.input, &output, &mut state, &options).await?;

    if let Err(e) = state.save(&config.workdir) {
        warn!("Failed to save state: {}", e);
    }
    write_refine_summary(&config.output_dir, &report)?;

    let t = &report.tallies;
    info!(
        "Completed in {:.1}s: {} PRs, {} comments matched, {} records emitted ({} window rejections, {} fetch failures)",
        report.duration.as_secs_f64(),
        t.prs_seen,
        t.hunks_matched,
        t.records_emitted,
        t.windows_rejected,
        t.fetch_failures
    );
    println!(
        "{} refinement records -> {} (summary in {})",
        t.records_emitted,
        report.output.display(),
        config.output_dir.display()
    );

    Ok(())
}
