use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::cli::{TaskKind, TasksArgs};
use crate::dataset::{
    comment_generation_inputs, defect_location_inputs, fix_generation_inputs,
    review_necessity_inputs,
};
use crate::ingest::read_jsonl;
use crate::model::PrReviewSample;
use crate::output::write_jsonl;

pub fn execute(args: TasksArgs) -> anyhow::Result<()> {
    let (samples, skipped): (Vec<PrReviewSample>, usize) = read_jsonl(&args.dataset)?;
    if skipped > 0 {
        debug!("Skipped {} unparseable samples in {:?}", skipped, args.dataset);
    }

    let aux_by_pr = match &args.aux {
        Some(path) => {
            let (records, _): (Vec<Value>, usize) = read_jsonl(path)?;
            group_by_pr(records)
        }
        None => HashMap::new(),
    };
    let empty: Vec<Value> = Vec::new();

    let mut outputs = Vec::with_capacity(samples.len());
    for sample in &samples {
        let aux = aux_by_pr.get(&sample.pr_number).unwrap_or(&empty);
        let record = match args.task {
            TaskKind::ReviewNecessity => serde_json::to_value(review_necessity_inputs(sample))?,
            TaskKind::CommentGeneration => {
                serde_json::to_value(comment_generation_inputs(sample, aux))?
            }
            TaskKind::DefectLocation => serde_json::to_value(defect_location_inputs(sample, aux))?,
            TaskKind::FixGeneration => serde_json::to_value(fix_generation_inputs(sample, aux))?,
        };
        outputs.push(record);
    }

    let output = args.output.unwrap_or_else(|| {
        args.dataset
            .with_file_name(format!("{}_inputs.jsonl", args.task.file_stem()))
    });
    write_jsonl(&output, &outputs)?;

    println!(
        "Wrote {} {} input records to {}",
        outputs.len(),
        args.task.file_stem(),
        output.display()
    );
    Ok(())
}

fn group_by_pr(records: Vec<Value>) -> HashMap<u64, Vec<Value>> {
    let mut grouped: HashMap<u64, Vec<Value>> = HashMap::new();
    for record in records {
        let Some(pr_number) = record.get("pr_number").and_then(Value::as_u64) else {
            continue;
        };
        grouped.entry(pr_number).or_default().push(record);
    }
    grouped
}
