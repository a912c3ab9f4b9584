// Usage indexing - who references the classes we care about

use crate::classfile::{ClassUnit, QualifiedName};
use crate::extract::{ReferenceExtractor, ReflectionSite};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Inverse-oriented view of the reference relation for a chosen target
/// set: which units touch which targets. Units that touch nothing in the
/// target set are omitted.
#[derive(Debug, Default)]
pub struct UsageIndex {
    entries: BTreeMap<QualifiedName, BTreeSet<QualifiedName>>,
    targets: BTreeSet<QualifiedName>,
    reflection: Vec<ReflectionSite>,
}

impl UsageIndex {
    /// Referencing unit -> referenced subset of the target set.
    pub fn entries(&self) -> &BTreeMap<QualifiedName, BTreeSet<QualifiedName>> {
        &self.entries
    }

    pub fn targets(&self) -> &BTreeSet<QualifiedName> {
        &self.targets
    }

    /// All units that reference `target`.
    pub fn users_of(&self, target: &QualifiedName) -> BTreeSet<QualifiedName> {
        self.entries
            .iter()
            .filter(|(_, used)| used.contains(target))
            .map(|(user, _)| user.clone())
            .collect()
    }

    /// Targets no scanned unit references. Only trustworthy when
    /// [`UsageIndex::is_sound`] holds: reflective call sites can reach
    /// classes this index cannot see.
    pub fn unused_targets(&self) -> BTreeSet<QualifiedName> {
        let mut unused = self.targets.clone();
        for used in self.entries.values() {
            for target in used {
                unused.remove(target);
            }
        }
        unused
    }

    /// Whether static conclusions drawn from this index are sound, i.e.
    /// no reflective call sites were observed anywhere in the archive.
    pub fn is_sound(&self) -> bool {
        self.reflection.is_empty()
    }

    pub fn reflection(&self) -> &[ReflectionSite] {
        &self.reflection
    }
}

/// Builds a [`UsageIndex`] by running the extractor with the target set as
/// universe over every parsed unit.
pub struct UsageAnalyzer {
    targets: BTreeSet<QualifiedName>,
}

impl UsageAnalyzer {
    pub fn new(targets: BTreeSet<QualifiedName>) -> Self {
        Self { targets }
    }

    pub fn index_units(&self, units: &[ClassUnit]) -> UsageIndex {
        let extractor = ReferenceExtractor::new(&self.targets);
        let mut entries = BTreeMap::new();
        let mut reflection = Vec::new();

        for unit in units {
            let extraction = extractor.extract(unit);
            reflection.extend(extraction.reflection);
            if !extraction.references.is_empty() {
                entries.insert(unit.name.clone(), extraction.references);
            }
        }

        debug!(
            "indexed {} referencing units over {} targets",
            entries.len(),
            self.targets.len()
        );

        UsageIndex {
            entries,
            targets: self.targets.clone(),
            reflection,
        }
    }
}
