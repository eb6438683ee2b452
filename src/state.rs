use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const STATE_DIR: &str = ".prweave";
const STATE_FILE: &str = "state.json";

/// Resumable per-input progress, persisted under `.prweave/state.json` in
/// the workdir.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct State {
    pub sources: HashMap<String, SourceState>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourceState {
    /// PR number of the last fully processed input record.
    pub last_pr_number: u64,
    pub records_emitted: usize,
    pub updated_at: DateTime<Utc>,
}

impl State {
    /// Load state from the workdir, defaulting on any failure.
    pub fn load(workdir: &Path) -> Self {
        let state_path = Self::state_path(workdir);
        if state_path.exists() {
            match fs::read_to_string(&state_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        }
    }

    /// Save state to the workdir
    pub fn save(&self, workdir: &Path) -> std::io::Result<()> {
        let state_dir = workdir.join(STATE_DIR);
        fs::create_dir_all(&state_dir)?;

        let state_path = state_dir.join(STATE_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(state_path, json)
    }

    /// Resume marker for an input source, if a prior run recorded one.
    pub fn last_pr(&self, source: &str) -> Option<u64> {
        self.sources.get(source).map(|s| s.last_pr_number)
    }

    /// Record progress through an input source.
    pub fn record_progress(&mut self, source: &str, last_pr_number: u64, records_emitted: usize) {
        let entry = self
            .sources
            .entry(source.to_string())
            .or_insert_with(|| SourceState {
                last_pr_number,
                records_emitted: 0,
                updated_at: Utc::now(),
            });
        entry.last_pr_number = last_pr_number;
        entry.records_emitted += records_emitted;
        entry.updated_at = Utc::now();
    }

    fn state_path(workdir: &Path) -> PathBuf {
        workdir.join(STATE_DIR).join(STATE_FILE)
    }
}
