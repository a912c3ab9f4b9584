use crate::classfile::QualifiedName;
use crate::extract::ReflectionSite;
use crate::scan::{Diagnostic, ScanReport};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, report: &ScanReport) -> Result<()> {
        let json_report = JsonReport::from_scan(report);
        let json = serde_json::to_string_pretty(&json_report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    archive: String,
    summary: JsonSummary,
    dependencies: BTreeMap<QualifiedName, BTreeSet<QualifiedName>>,
    mutual: Vec<JsonMutualPair<'a>>,
    usage: &'a BTreeMap<QualifiedName, BTreeSet<QualifiedName>>,
    unused: BTreeSet<QualifiedName>,
    reflection: &'a [ReflectionSite],
    diagnostics: &'a [Diagnostic],
}

#[derive(Serialize)]
struct JsonSummary {
    total_entries: usize,
    parsed_units: usize,
    universe_size: usize,
    mutual_pairs: usize,
    unused_targets: usize,
    reflection_sites: usize,
    diagnostics: usize,
    static_results_sound: bool,
}

#[derive(Serialize)]
struct JsonMutualPair<'a> {
    a: &'a QualifiedName,
    b: &'a QualifiedName,
}

impl<'a> JsonReport<'a> {
    fn from_scan(report: &'a ScanReport) -> Self {
        let unused = report.usage.unused_targets();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            archive: report.archive.display().to_string(),
            summary: JsonSummary {
                total_entries: report.total_entries,
                parsed_units: report.parsed_units,
                universe_size: report.universe.len(),
                mutual_pairs: report.mutual.len(),
                unused_targets: unused.len(),
                reflection_sites: report.reflection.len(),
                diagnostics: report.diagnostics.len(),
                static_results_sound: report.usage.is_sound(),
            },
            dependencies: report.graph.adjacency(),
            mutual: report
                .mutual
                .iter()
                .map(|pair| JsonMutualPair {
                    a: &pair.a,
                    b: &pair.b,
                })
                .collect(),
            usage: report.usage.entries(),
            unused,
            reflection: &report.reflection,
            diagnostics: &report.diagnostics,
        }
    }
}
