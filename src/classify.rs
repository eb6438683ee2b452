use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::config::EligibilityConfig;
use crate::error::ConfigError;

/// Extensions treated as reviewable code.
const CODE_EXTENSIONS: &[&str] = &[
    "cpp", "c", "cc", "h", "hpp", "xml", "ets", "js", "ts", "mjs", "rs", "css", "html", "py",
    "gn", "gni", "rc", "idl", "java", "go", "rb", "php", "sql", "swift", "kt", "kts", "scala",
    "cs", "cxx", "hxx", "m", "mm",
];

/// Configuration-file extensions: known, but not code.
const CONFIG_EXTENSIONS: &[&str] = &[
    "conf", "config", "ini", "properties", "cfg", "toml", "env", "yaml", "yml",
];

/// Documents, media, archives, binaries, certificates: never code.
const NON_CODE_EXTENSIONS: &[&str] = &[
    "txt", "log", "md", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "jpg", "jpeg",
    "png", "gif", "bmp", "ico", "svg", "webp", "zip", "tar", "gz", "rar", "7z", "exe", "dll",
    "so", "dylib", "bin", "cer", "crt", "pem", "key", "p12", "pfx", "gitignore",
    "gitattributes", "lock", "sum", "license", "notice",
];

/// Extension-table classification: allow-listed code extensions are code,
/// config/doc/binary extensions are not, and unknown or missing extensions
/// default to false.
pub fn is_code_file(file_path: &str) -> bool {
    let lower = file_path.to_ascii_lowercase();
    let Some(ext) = Path::new(&lower).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if CODE_EXTENSIONS.contains(&ext) {
        return true;
    }
    if CONFIG_EXTENSIONS.contains(&ext) || NON_CODE_EXTENSIONS.contains(&ext) {
        return false;
    }
    false
}

/// Extension tables plus config-driven glob overrides. Exclude globs veto,
/// include globs force-admit, everything else falls back to the tables.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileClassifier {
    pub fn from_config(eligibility: &EligibilityConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            include: build_glob_set(&eligibility.include)?,
            exclude: build_glob_set(&eligibility.exclude)?,
        })
    }

    pub fn is_code_file(&self, file_path: &str) -> bool {
        if self.exclude.is_match(file_path) {
            return false;
        }
        if self.include.is_match(file_path) {
            return true;
        }
        is_code_file(file_path)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::GlobPattern {
        pattern: "eligibility set".to_string(),
        source: e,
    })
}
