//! jardeps - Static dependency and usage analysis for JVM class archives
//!
//! This library answers three questions about a jar of compiled classes
//! without executing any of them: which classes reference which, which
//! pairs reference each other, and which classes reference a chosen set
//! of targets.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Archive access** - list and read `.class` entries from the jar
//! 2. **Enumeration** - derive the in-scope class names from entry paths
//! 3. **Parsing** - decode each class file into a structured unit
//! 4. **Extraction** - collect every symbolic reference per unit
//! 5. **Graph building** - aggregate references into a dependency graph
//! 6. **Analysis** - mutual-dependency pairs, usage index, reflection flags
//! 7. **Reporting** - terminal or JSON output

pub mod analysis;
pub mod archive;
pub mod classfile;
pub mod config;
pub mod extract;
pub mod graph;
pub mod report;
pub mod scan;

pub use analysis::{CycleDetector, MutualPair, UsageAnalyzer, UsageIndex};
pub use archive::{ClassEnumerator, JarArchive};
pub use classfile::{parse_class, ClassUnit, QualifiedName, TypeDescriptor};
pub use config::Config;
pub use extract::{ReferenceExtractor, ReflectionKind, ReflectionSite};
pub use graph::{DependencyGraph, GraphBuilder, ParallelGraphBuilder};
pub use report::{ReportFormat, Reporter};
pub use scan::{Diagnostic, DiagnosticKind, ScanOptions, ScanReport, Scanner};
