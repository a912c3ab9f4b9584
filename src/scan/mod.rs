//! Whole-archive scan orchestration.
//!
//! Ties the collaborators together: archive reader -> enumerator -> parser
//! worker pool -> graph / usage / mutual-pair computations. Pure with
//! respect to the process: no exits, no environment access, all failures
//! surface as values.

use crate::analysis::{CycleDetector, MutualPair, UsageAnalyzer, UsageIndex};
use crate::archive::{ArchiveError, ClassEntry, ClassEnumerator, JarArchive};
use crate::classfile::{ClassParseError, ParseWarning, QualifiedName};
use crate::config::Config;
use crate::extract::ReflectionSite;
use crate::graph::{BuildOutput, DependencyGraph, GraphBuilder, ParallelGraphBuilder};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal scan failures. Everything below the container level degrades to
/// a [`Diagnostic`] instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot open archive: {0}")]
    ArchiveOpen(#[from] ArchiveError),
}

/// What went wrong with one entry or record. The scan itself never stops
/// for any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Entry could not be read from the archive.
    ArchiveRead,
    /// Header/version/length invariant violated; unit skipped.
    MalformedUnit,
    /// Well-formed but unrecognized record; unit kept, record ignored.
    UnsupportedRecord,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ArchiveRead => "archive-read",
            DiagnosticKind::MalformedUnit => "malformed-unit",
            DiagnosticKind::UnsupportedRecord => "unsupported-record",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded per-entry problem, kept alongside the main result so a
/// caller can judge coverage ("N of M units parsed").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub entry: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn archive_read(entry: &str, error: &ArchiveError) -> Self {
        Self {
            entry: entry.to_string(),
            kind: DiagnosticKind::ArchiveRead,
            message: error.to_string(),
        }
    }

    pub fn malformed_unit(entry: &str, error: &ClassParseError) -> Self {
        Self {
            entry: entry.to_string(),
            kind: DiagnosticKind::MalformedUnit,
            message: error.to_string(),
        }
    }

    pub fn unsupported_record(entry: &str, warning: &ParseWarning) -> Self {
        Self {
            entry: entry.to_string(),
            kind: DiagnosticKind::UnsupportedRecord,
            message: warning.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.entry, self.message)
    }
}

/// Cooperative cancellation: an external flag, a deadline, or both. Once
/// observed, no further entries are read or scheduled; work already in
/// flight completes and partial results are returned.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Self {
            flag: Some(flag),
            deadline: None,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: None,
            deadline: Some(deadline),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if let Some(flag) = &self.flag {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        false
    }
}

/// Per-run knobs. `targets` overrides the default target set (the full
/// universe) for usage indexing.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub sequential: bool,
    pub cancel: CancelToken,
    pub targets: Option<BTreeSet<QualifiedName>>,
}

/// Everything one scan produces.
#[derive(Debug)]
pub struct ScanReport {
    pub archive: PathBuf,
    /// Names considered in scope for dependency edges.
    pub universe: BTreeSet<QualifiedName>,
    pub graph: DependencyGraph,
    pub mutual: Vec<MutualPair>,
    pub usage: UsageIndex,
    pub reflection: Vec<ReflectionSite>,
    pub diagnostics: Vec<Diagnostic>,
    pub parsed_units: usize,
    pub total_entries: usize,
}

/// Drives a full scan of one archive.
pub struct Scanner {
    config: Config,
}

impl Scanner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn scan(&self, archive_path: &Path) -> Result<ScanReport, ScanError> {
        self.scan_with(archive_path, &ScanOptions::default())
    }

    pub fn scan_with(
        &self,
        archive_path: &Path,
        options: &ScanOptions,
    ) -> Result<ScanReport, ScanError> {
        let mut archive = JarArchive::open(archive_path)?;
        let entry_names = archive.entry_names()?;

        let enumerator = ClassEnumerator::new(self.config.package_prefix.clone())
            .with_roots(self.config.class_roots.clone());
        let universe = enumerator.enumerate(
            entry_names
                .iter()
                .map(String::as_str)
                .filter(|name| !self.config.should_exclude(name)),
        );
        info!(
            "{}: {} entries, {} classes in scope",
            archive_path.display(),
            entry_names.len(),
            universe.len()
        );

        let mut diagnostics = Vec::new();
        let (entries, total_entries) =
            self.read_class_entries(&mut archive, &entry_names, options, &mut diagnostics);

        let mut build = self.build_graph(&entries, &universe, options);
        diagnostics.append(&mut build.diagnostics);

        let targets = self.resolve_targets(options, &universe);
        let usage = UsageAnalyzer::new(targets).index_units(&build.units);
        let mutual = CycleDetector::new().find_mutual_pairs(&build.graph);

        if !build.reflection.is_empty() {
            warn!(
                "{} reflective call sites: static usage results are not sound",
                build.reflection.len()
            );
        }

        Ok(ScanReport {
            archive: archive_path.to_path_buf(),
            universe,
            graph: build.graph,
            mutual,
            usage,
            reflection: build.reflection,
            diagnostics,
            parsed_units: build.units.len(),
            total_entries,
        })
    }

    /// Pull every class entry into an owned buffer, honoring cancellation
    /// between reads. Unreadable entries degrade to diagnostics.
    fn read_class_entries(
        &self,
        archive: &mut JarArchive,
        entry_names: &[String],
        options: &ScanOptions,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (Vec<ClassEntry>, usize) {
        let mut entries = Vec::new();
        let mut total = 0usize;
        for name in entry_names {
            if !JarArchive::is_class_entry(name) || self.config.should_exclude(name) {
                continue;
            }
            total += 1;
            if options.cancel.is_cancelled() {
                debug!("cancelled before reading {}", name);
                continue;
            }
            match archive.read_entry(name) {
                Ok(bytes) => entries.push(ClassEntry {
                    name: name.clone(),
                    bytes,
                }),
                Err(error) => diagnostics.push(Diagnostic::archive_read(name, &error)),
            }
        }
        (entries, total)
    }

    fn build_graph(
        &self,
        entries: &[ClassEntry],
        universe: &BTreeSet<QualifiedName>,
        options: &ScanOptions,
    ) -> BuildOutput {
        if options.sequential {
            let mut builder = GraphBuilder::new(universe.clone());
            for entry in entries {
                if options.cancel.is_cancelled() {
                    break;
                }
                builder.process_entry(&entry.name, &entry.bytes);
            }
            builder.build()
        } else {
            ParallelGraphBuilder::new().build_from_entries(entries, universe, &options.cancel)
        }
    }

    /// Explicit targets from the options, then the config, then the whole
    /// universe.
    fn resolve_targets(
        &self,
        options: &ScanOptions,
        universe: &BTreeSet<QualifiedName>,
    ) -> BTreeSet<QualifiedName> {
        if let Some(targets) = &options.targets {
            return targets.clone();
        }
        if !self.config.targets.is_empty() {
            return self
                .config
                .targets
                .iter()
                .map(|t| QualifiedName::new(t.clone()))
                .collect();
        }
        universe.clone()
    }
}
