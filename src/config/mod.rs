// Configuration loading and defaults

use crate::archive::DEFAULT_CLASS_ROOTS;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an archive scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package prefix limiting which classes count as in scope
    /// (e.g. "com.example"). `None` scopes to every class in the archive.
    pub package_prefix: Option<String>,

    /// Explicit target classes for usage analysis. Empty means "use the
    /// whole universe".
    pub targets: Vec<String>,

    /// Packaging roots tried when mapping entry paths to class names.
    pub class_roots: Vec<String>,

    /// Entry-name fragments to skip entirely.
    pub exclude: Vec<String>,

    pub scan: ScanConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Parse entries one at a time instead of on the worker pool.
    pub sequential: bool,

    /// Overall scan deadline in seconds; partial results past it.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal or json.
    pub format: String,

    /// Print the full per-class dependency listing.
    pub show_dependencies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_prefix: None,
            targets: vec![],
            class_roots: DEFAULT_CLASS_ROOTS.iter().map(|r| r.to_string()).collect(),
            exclude: vec![],
            scan: ScanConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sequential: false,
            timeout_secs: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            show_dependencies: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load from the default locations in the working directory, falling
    /// back to defaults when no file exists.
    pub fn from_default_locations() -> Result<Self> {
        for candidate in ["jardeps.toml", ".jardeps.toml"] {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Whether an archive entry should be skipped entirely.
    pub fn should_exclude(&self, entry_name: &str) -> bool {
        self.exclude
            .iter()
            .any(|pattern| entry_name.contains(pattern.as_str()))
    }
}
