use crate::classfile::QualifiedName;
use std::collections::BTreeSet;
use tracing::debug;

/// Packaging roots tried in order when turning an entry path into a class
/// name. Spring Boot and war layouts nest compiled classes under a fixed
/// prefix; plain jars use none (the empty root must stay last).
pub const DEFAULT_CLASS_ROOTS: &[&str] = &["BOOT-INF/classes/", "WEB-INF/classes/", ""];

/// Pseudo-classes that never denote a real unit.
const PSEUDO_CLASSES: &[&str] = &["module-info", "package-info"];

/// Derives the set of qualified names in scope from archive entry paths.
///
/// Pure over the entry-name list: nothing is loaded or executed. Used for
/// both the default universe and the default target set.
#[derive(Debug, Clone)]
pub struct ClassEnumerator {
    roots: Vec<String>,
    package_prefix: Option<String>,
}

impl ClassEnumerator {
    pub fn new(package_prefix: Option<String>) -> Self {
        Self {
            roots: DEFAULT_CLASS_ROOTS.iter().map(|r| r.to_string()).collect(),
            package_prefix,
        }
    }

    /// Replace the packaging roots tried during enumeration.
    pub fn with_roots(mut self, roots: Vec<String>) -> Self {
        self.roots = roots;
        self
    }

    /// The qualified name behind one entry path, if the entry is a class
    /// within the configured package scope.
    pub fn qualified_name(&self, entry_name: &str) -> Option<QualifiedName> {
        let without_suffix = entry_name.strip_suffix(".class")?;

        let stripped = self
            .roots
            .iter()
            .find_map(|root| without_suffix.strip_prefix(root.as_str()))?;

        let simple_name = stripped.rsplit('/').next().unwrap_or(stripped);
        if PSEUDO_CLASSES.contains(&simple_name) {
            return None;
        }

        let dotted = stripped.replace('/', ".");
        if let Some(prefix) = &self.package_prefix {
            let in_package = dotted
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'));
            if !in_package {
                return None;
            }
        }

        Some(QualifiedName::new(dotted))
    }

    /// Enumerate every in-scope class behind the given entry names.
    pub fn enumerate<I, S>(&self, entry_names: I) -> BTreeSet<QualifiedName>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<QualifiedName> = entry_names
            .into_iter()
            .filter_map(|name| self.qualified_name(name.as_ref()))
            .collect();
        debug!("enumerated {} classes", classes.len());
        classes
    }
}
