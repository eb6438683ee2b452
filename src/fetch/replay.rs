use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::error::{FetchError, IngestError};
use crate::ingest::read_jsonl;

use super::{CompareDiff, CompareFetcher, CompareFile};

/// One recorded comparison, as stored in a replay JSONL file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRecord {
    pub base: String,
    pub head: String,
    #[serde(default)]
    pub files: Vec<CompareFile>,
}

/// Serves comparisons from previously recorded compare results. Used for
/// offline reprocessing of a crawl and for deterministic tests; a lookup
/// miss is a fetch failure like any other.
pub struct ReplayFetcher {
    recorded: HashMap<(String, String), CompareDiff>,
}

impl ReplayFetcher {
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let (records, skipped): (Vec<CompareRecord>, usize) = read_jsonl(path)?;
        if skipped > 0 {
            warn!("Skipped {} unparseable compare records in {:?}", skipped, path);
        }
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<CompareRecord>) -> Self {
        let recorded = records
            .into_iter()
            .map(|record| {
                (
                    (record.base, record.head),
                    CompareDiff {
                        files: record.files,
                    },
                )
            })
            .collect();
        Self { recorded }
    }
}

#[async_trait]
impl CompareFetcher for ReplayFetcher {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn compare(&self, base: &str, head: &str) -> Result<CompareDiff, FetchError> {
        self.recorded
            .get(&(base.to_string(), head.to_string()))
            .cloned()
            .ok_or_else(|| FetchError::NotRecorded {
                base: base.to_string(),
                head: head.to_string(),
            })
    }
}
