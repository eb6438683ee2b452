use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_repo() -> String {
    String::new()
}

pub fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

pub fn default_concurrency() -> usize {
    4
}

pub fn default_launch_delay_ms() -> u64 {
    200
}

pub fn default_fetch_timeout_sec() -> u64 {
    120
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}

pub fn default_true() -> bool {
    true
}
