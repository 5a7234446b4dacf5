//! Source-to-artifact path mapping.
//!
//! Maps a source-relative path to its output-relative counterpart by
//! mirroring directories and substituting the extension. The per-directory
//! marker file carries no translatable content and maps to no target at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One translatable source file discovered by a scan. Ephemeral: computed
/// per scan, never persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Path relative to the source root.
    pub rel_path: PathBuf,
    /// Absolute path on disk.
    pub abs_path: PathBuf,
    /// Dot-separated module identifier derived from `rel_path`.
    pub module_id: String,
}

impl SourceEntry {
    pub fn new(source_root: &Path, rel_path: PathBuf, rules: &MappingRules) -> Self {
        let module_id = rules.module_identifier(&rel_path);
        Self {
            abs_path: source_root.join(&rel_path),
            rel_path,
            module_id,
        }
    }
}

/// Extension and marker conventions for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRules {
    /// Extension (without dot) of translatable sources.
    pub source_extension: String,
    /// Extension (without dot) of generated artifacts.
    pub output_extension: String,
    /// Reserved file name that is skipped entirely (never mapped, never
    /// attempted, never recorded).
    pub marker_file_name: String,
}

impl Default for MappingRules {
    fn default() -> Self {
        Self {
            source_extension: "st".to_string(),
            output_extension: "js".to_string(),
            marker_file_name: "package-info.st".to_string(),
        }
    }
}

impl MappingRules {
    /// True when the file name is the reserved marker file.
    pub fn is_marker(&self, rel_path: &Path) -> bool {
        rel_path
            .file_name()
            .is_some_and(|name| name == self.marker_file_name.as_str())
    }

    /// True when the path carries the recognized source extension.
    pub fn is_source(&self, rel_path: &Path) -> bool {
        rel_path
            .extension()
            .is_some_and(|ext| ext == self.source_extension.as_str())
    }

    /// Map a source-relative path to its output-relative path.
    ///
    /// Returns `None` for the marker file. Otherwise substitutes the output
    /// extension and preserves every other path segment unchanged. Total and
    /// deterministic given its input.
    pub fn map_to_target(&self, rel_path: &Path) -> Option<PathBuf> {
        if self.is_marker(rel_path) {
            return None;
        }
        Some(rel_path.with_extension(&self.output_extension))
    }

    /// Derive the module identifier for a source-relative path: extension
    /// stripped, path separators replaced by the namespace separator.
    pub fn module_identifier(&self, rel_path: &Path) -> String {
        let stem = rel_path.with_extension("");
        let mut parts = Vec::new();
        for component in stem.components() {
            parts.push(component.as_os_str().to_string_lossy().into_owned());
        }
        parts.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_source_to_output_extension() {
        let rules = MappingRules::default();
        let target = rules.map_to_target(Path::new("a/b/Foo.st")).expect("target");
        assert_eq!(target, PathBuf::from("a/b/Foo.js"));
    }

    #[test]
    fn preserves_all_segments_except_extension() {
        let rules = MappingRules::default();
        let target = rules
            .map_to_target(Path::new("deep/nested/dir/Widget.st"))
            .expect("target");
        assert_eq!(target.parent(), Some(Path::new("deep/nested/dir")));
        assert_eq!(target.extension().unwrap(), "js");
    }

    #[test]
    fn marker_file_maps_to_no_target() {
        let rules = MappingRules::default();
        assert!(rules.map_to_target(Path::new("a/package-info.st")).is_none());
        assert!(rules.map_to_target(Path::new("package-info.st")).is_none());
    }

    #[test]
    fn marker_name_only_matches_final_segment() {
        let rules = MappingRules::default();
        // A directory that happens to share the marker name does not skip the file.
        assert!(
            rules
                .map_to_target(Path::new("package-info.st/Foo.st"))
                .is_some()
        );
    }

    #[test]
    fn module_identifier_joins_segments_with_dots() {
        let rules = MappingRules::default();
        assert_eq!(rules.module_identifier(Path::new("a/b/Foo.st")), "a.b.Foo");
        assert_eq!(rules.module_identifier(Path::new("Foo.st")), "Foo");
    }

    #[test]
    fn source_detection_uses_configured_extension() {
        let rules = MappingRules {
            source_extension: "tpl".to_string(),
            ..MappingRules::default()
        };
        assert!(rules.is_source(Path::new("x/Y.tpl")));
        assert!(!rules.is_source(Path::new("x/Y.st")));
    }
}
