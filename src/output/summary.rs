use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OutputError;
use crate::refine::{RefineReport, Tallies};

#[derive(Debug, Serialize)]
pub struct RefineSummary {
    pub run_id: String,
    pub timestamp: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub duration_sec: f64,
    pub tallies: Tallies,
}

/// Write `summary.json` and `summary.md` for a refine run into the report
/// directory.
pub fn write_refine_summary(report_dir: &Path, report: &RefineReport) -> Result<(), OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let summary = RefineSummary {
        run_id: report.run_id.clone(),
        timestamp: Utc::now().to_rfc3339(),
        input: report.input.clone(),
        output: report.output.clone(),
        duration_sec: report.duration.as_secs_f64(),
        tallies: report.tallies.clone(),
    };

    let json_path = report_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&json_path, json).map_err(OutputError::WriteSummary)?;

    let md_path = report_dir.join("summary.md");
    fs::write(&md_path, build_summary_markdown(&summary)).map_err(OutputError::WriteSummary)?;

    Ok(())
}

fn build_summary_markdown(summary: &RefineSummary) -> String {
    let mut md = String::new();

    md.push_str("# prweave refine summary\n\n");
    md.push_str(&format!("**Run:** {}\n", summary.run_id));
    md.push_str(&format!("**Generated:** {}\n", summary.timestamp));
    md.push_str(&format!("**Input:** {}\n", summary.input.display()));
    md.push_str(&format!("**Output:** {}\n", summary.output.display()));
    md.push_str(&format!("**Duration:** {:.1}s\n\n", summary.duration_sec));

    let t = &summary.tallies;
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| PRs processed | {} |\n", t.prs_seen));
    md.push_str(&format!("| PRs skipped (resume) | {} |\n", t.prs_skipped_resume));
    md.push_str(&format!("| Malformed records | {} |\n", t.malformed_records));
    md.push_str(&format!("| Comments seen | {} |\n", t.comments_seen));
    md.push_str(&format!("| Comments on non-code files | {} |\n", t.comments_non_code));
    md.push_str(&format!("| Comments without line range | {} |\n", t.comments_no_range));
    md.push_str(&format!("| Comments unmatched | {} |\n", t.comments_unmatched));
    md.push_str(&format!("| Hunks matched | {} |\n", t.hunks_matched));
    md.push_str(&format!("| Windows rejected | {} |\n", t.windows_rejected));
    md.push_str(&format!("| Fetch failures | {} |\n", t.fetch_failures));
    md.push_str(&format!("| Range missing in window | {} |\n", t.range_missing));
    md.push_str(&format!("| Duplicates skipped | {} |\n", t.duplicates_skipped));
    md.push_str(&format!("| Records emitted | {} |\n", t.records_emitted));

    md
}
