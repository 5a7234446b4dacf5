//! Allowed-namespace set derivation.
//!
//! The transformer must operate inside a bounded reference scope: referencing
//! a type outside this set is a translation error, not a best-effort emit.
//! The set is built once per run from the source-tree directory structure, a
//! fixed baseline, and configured extras, and is read-only afterwards.

use std::collections::BTreeSet;
use std::path::Path;

/// Namespaces generated code may always reference, regardless of tree
/// contents. Currently just the test-framework namespace.
pub const BASELINE_NAMESPACES: &[&str] = &["testkit"];

/// Read-only set of namespaces the transformer may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedNamespaces {
    namespaces: BTreeSet<String>,
}

impl AllowedNamespaces {
    /// Build the set from every directory under the source root (the root
    /// itself included, as the empty namespace), unioned with the baseline
    /// and any configured extras.
    pub fn build<'a, D, E>(directories: D, extras: E) -> Self
    where
        D: IntoIterator<Item = &'a Path>,
        E: IntoIterator<Item = String>,
    {
        let mut namespaces: BTreeSet<String> = BASELINE_NAMESPACES
            .iter()
            .map(|ns| (*ns).to_string())
            .collect();
        for dir in directories {
            namespaces.insert(namespace_for_dir(dir));
        }
        namespaces.extend(extras);
        Self { namespaces }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Dot-joined namespace for a source-root-relative directory path.
///
/// The source root itself maps to the empty namespace (top-level modules).
pub fn namespace_for_dir(rel_dir: &Path) -> String {
    let mut parts = Vec::new();
    for component in rel_dir.components() {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn baseline_is_always_present() {
        let set = AllowedNamespaces::build(std::iter::empty(), std::iter::empty());
        for ns in BASELINE_NAMESPACES {
            assert!(set.contains(ns), "missing baseline namespace {ns}");
        }
    }

    #[test]
    fn contains_every_directory_namespace() {
        let dirs = [PathBuf::from("a"), PathBuf::from("a/b"), PathBuf::from("")];
        let set = AllowedNamespaces::build(dirs.iter().map(PathBuf::as_path), std::iter::empty());
        assert!(set.contains("a"));
        assert!(set.contains("a.b"));
        assert!(set.contains(""));
    }

    #[test]
    fn extras_are_unioned_in() {
        let set = AllowedNamespaces::build(
            std::iter::empty(),
            vec!["vendor.widgets".to_string()],
        );
        assert!(set.contains("vendor.widgets"));
        assert!(set.contains("testkit"));
    }

    #[test]
    fn namespace_for_dir_joins_with_dots() {
        assert_eq!(namespace_for_dir(Path::new("a/b/c")), "a.b.c");
        assert_eq!(namespace_for_dir(Path::new("a")), "a");
        assert_eq!(namespace_for_dir(Path::new("")), "");
    }
}
