mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;
use tracing::debug;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            repo: default_repo(),
            workdir: default_workdir(),
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            launch_delay_ms: default_launch_delay_ms(),
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            eligibility: EligibilityConfig::default(),
            dataset: DatasetConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise defaults. CLI overrides apply
    /// either way.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate that the configured fetch mode has what it needs.
    pub fn validate_fetch(&self) -> Result<(), ConfigError> {
        match self.fetch.mode {
            FetchMode::Git if self.fetch.git_dir.is_none() => Err(ConfigError::MissingGitDir),
            FetchMode::Replay if self.fetch.replay_file.is_none() => {
                Err(ConfigError::MissingReplayFile)
            }
            _ => Ok(()),
        }
    }
}
