use super::DependencyGraph;
use crate::classfile::{parse_class, ClassUnit, QualifiedName};
use crate::extract::{Extraction, ReferenceExtractor, ReflectionSite};
use crate::scan::Diagnostic;
use std::collections::BTreeSet;
use tracing::trace;

/// Everything a graph build produces besides the graph itself: the parsed
/// units (needed again for usage indexing), reflection flags, and the
/// per-entry diagnostics.
#[derive(Debug, Default)]
pub struct BuildOutput {
    pub graph: DependencyGraph,
    pub units: Vec<ClassUnit>,
    pub reflection: Vec<ReflectionSite>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Sequential graph builder: feed entries one by one, then `build()`.
pub struct GraphBuilder {
    universe: BTreeSet<QualifiedName>,
    output: BuildOutput,
}

impl GraphBuilder {
    pub fn new(universe: BTreeSet<QualifiedName>) -> Self {
        Self {
            universe,
            output: BuildOutput::default(),
        }
    }

    pub fn universe(&self) -> &BTreeSet<QualifiedName> {
        &self.universe
    }

    /// Parse one archive entry and fold it into the graph. A malformed
    /// unit becomes a diagnostic, never an error: the scan must go on.
    pub fn process_entry(&mut self, entry_name: &str, bytes: &[u8]) {
        match parse_class(bytes) {
            Ok(parsed) => {
                trace!("parsed {} from {}", parsed.unit.name, entry_name);
                for warning in &parsed.warnings {
                    self.output
                        .diagnostics
                        .push(Diagnostic::unsupported_record(entry_name, warning));
                }
                self.process_unit(parsed.unit);
            }
            Err(error) => {
                self.output
                    .diagnostics
                    .push(Diagnostic::malformed_unit(entry_name, &error));
            }
        }
    }

    /// Fold an already parsed unit into the graph.
    pub fn process_unit(&mut self, unit: ClassUnit) {
        let extraction = ReferenceExtractor::new(&self.universe).extract(&unit);
        self.insert(unit, extraction);
    }

    /// Single-writer merge step shared with the parallel builder.
    pub(crate) fn insert(&mut self, unit: ClassUnit, extraction: Extraction) {
        if self.universe.contains(&unit.name) {
            self.output.graph.add_unit(unit.name.clone());
            for reference in extraction.references {
                self.output.graph.add_dependency(unit.name.clone(), reference);
            }
        }
        self.output.reflection.extend(extraction.reflection);
        self.output.units.push(unit);
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.output.diagnostics.push(diagnostic);
    }

    pub fn build(self) -> BuildOutput {
        self.output
    }
}
