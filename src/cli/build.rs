use tracing::info;

use crate::cli::BuildArgs;
use crate::config::Config;
use crate::dataset::DatasetBuilder;
use crate::output::write_jsonl;

pub fn execute(args: BuildArgs) -> anyhow::Result<()> {
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(repo) = args.repo {
        config.repo = repo;
    }
    let include_lines = !args.no_lines && config.dataset.include_lines;

    let builder = DatasetBuilder::new(config.repo.clone(), include_lines);
    let samples = builder.load_samples(&args.pr_issue, &args.pr_commit, &args.refinement)?;

    let total_hunks: usize = samples
        .iter()
        .flat_map(|sample| &sample.diff_files)
        .map(|diff_file| diff_file.hunks.len())
        .sum();

    let output = args
        .output
        .unwrap_or_else(|| config.output_dir.join("dataset.jsonl"));
    write_jsonl(&output, &samples)?;

    println!(
        "Wrote {} samples ({} hunks) to {}",
        samples.len(),
        total_hunks,
        output.display()
    );
    Ok(())
}
