// Parallel graph builder using rayon

use super::builder::{BuildOutput, GraphBuilder};
use crate::archive::ClassEntry;
use crate::classfile::{parse_class, ClassUnit, ParseWarning, QualifiedName};
use crate::extract::{Extraction, ReferenceExtractor};
use crate::scan::{CancelToken, Diagnostic};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Result of one worker task: parse plus extraction, owned byte buffer in,
/// independent triple out.
enum EntryResult {
    Parsed {
        unit: ClassUnit,
        extraction: Extraction,
        warnings: Vec<(String, ParseWarning)>,
    },
    Failed(Diagnostic),
    /// Task saw the cancellation flag before starting.
    Skipped,
}

/// Fans parse + extract out over a worker pool, then merges the results
/// under a single writer. Per-unit work is pure, so the only shared state
/// is the final merge.
pub struct ParallelGraphBuilder;

impl ParallelGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_from_entries(
        &self,
        entries: &[ClassEntry],
        universe: &BTreeSet<QualifiedName>,
        cancel: &CancelToken,
    ) -> BuildOutput {
        info!("parsing {} class entries in parallel", entries.len());

        let results: Vec<EntryResult> = entries
            .par_iter()
            .map(|entry| {
                if cancel.is_cancelled() {
                    return EntryResult::Skipped;
                }
                match parse_class(&entry.bytes) {
                    Ok(parsed) => {
                        let extraction = ReferenceExtractor::new(universe).extract(&parsed.unit);
                        EntryResult::Parsed {
                            unit: parsed.unit,
                            extraction,
                            warnings: parsed
                                .warnings
                                .into_iter()
                                .map(|w| (entry.name.clone(), w))
                                .collect(),
                        }
                    }
                    Err(error) => {
                        debug!("malformed unit {} ({})", entry.name, error);
                        EntryResult::Failed(Diagnostic::malformed_unit(&entry.name, &error))
                    }
                }
            })
            .collect();

        let mut builder = GraphBuilder::new(universe.clone());
        for result in results {
            match result {
                EntryResult::Parsed {
                    unit,
                    extraction,
                    warnings,
                } => {
                    for (entry_name, warning) in &warnings {
                        builder.push_diagnostic(Diagnostic::unsupported_record(entry_name, warning));
                    }
                    builder.insert(unit, extraction);
                }
                EntryResult::Failed(diagnostic) => builder.push_diagnostic(diagnostic),
                EntryResult::Skipped => {}
            }
        }

        builder.build()
    }
}

impl Default for ParallelGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
