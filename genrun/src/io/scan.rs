//! Source-tree scanning.
//!
//! One recursive walk produces both the candidate source files and the
//! directory list the allowlist is derived from. Traversal order is whatever
//! the walker yields; callers must not depend on it for correctness, only
//! for log readability.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::path_map::{MappingRules, SourceEntry};

/// Include/exclude predicate over source-root-relative paths.
///
/// Patterns are regexes matched against the relative path rendered with `/`
/// separators. An empty include list includes everything.
#[derive(Debug, Default)]
pub struct ScanFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl ScanFilter {
    pub fn from_patterns(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    pub fn matches(&self, rel_path: &Path) -> bool {
        let rendered = render_rel_path(rel_path);
        let included =
            self.include.is_empty() || self.include.iter().any(|re| re.is_match(&rendered));
        included && !self.exclude.iter().any(|re| re.is_match(&rendered))
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).with_context(|| format!("invalid scan pattern '{pattern}'"))
        })
        .collect()
}

fn render_rel_path(rel_path: &Path) -> String {
    let parts: Vec<String> = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Result of walking the source root once.
#[derive(Debug)]
pub struct ScanTree {
    /// Candidate source files (marker files included; mapping skips them).
    pub files: Vec<SourceEntry>,
    /// Every directory under the root, root itself included, relative to it.
    pub directories: Vec<PathBuf>,
}

/// Walk the source root, collecting source files that pass the filter and
/// all directories.
pub fn scan_source_tree(
    source_root: &Path,
    rules: &MappingRules,
    filter: &ScanFilter,
) -> Result<ScanTree> {
    if !source_root.is_dir() {
        bail!("source root {} is not a directory", source_root.display());
    }

    let mut files = Vec::new();
    let mut directories = Vec::new();
    for entry in WalkDir::new(source_root) {
        let entry = entry.with_context(|| format!("walk {}", source_root.display()))?;
        let rel_path = entry
            .path()
            .strip_prefix(source_root)
            .with_context(|| format!("relativize {}", entry.path().display()))?
            .to_path_buf();

        if entry.file_type().is_dir() {
            directories.push(rel_path);
            continue;
        }
        if !entry.file_type().is_file() || !rules.is_source(&rel_path) {
            continue;
        }
        if !filter.matches(&rel_path) {
            debug!(path = %rel_path.display(), "excluded by scan filter");
            continue;
        }
        files.push(SourceEntry::new(source_root, rel_path, rules));
    }

    debug!(
        files = files.len(),
        directories = directories.len(),
        "source tree scanned"
    );
    Ok(ScanTree { files, directories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "x").expect("write");
    }

    #[test]
    fn collects_source_files_and_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "a/Foo.st");
        touch(temp.path(), "a/b/Bar.st");
        touch(temp.path(), "a/notes.txt");

        let tree = scan_source_tree(
            temp.path(),
            &MappingRules::default(),
            &ScanFilter::default(),
        )
        .expect("scan");

        let mut rels: Vec<String> = tree
            .files
            .iter()
            .map(|f| f.rel_path.display().to_string())
            .collect();
        rels.sort();
        assert_eq!(rels, vec!["a/Foo.st", "a/b/Bar.st"]);

        let mut dirs: Vec<String> = tree
            .directories
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        dirs.sort();
        assert_eq!(dirs, vec!["", "a", "a/b"]);
    }

    #[test]
    fn filter_excludes_matching_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "a/Foo.st");
        touch(temp.path(), "gen/Skip.st");

        let filter =
            ScanFilter::from_patterns(&[], &["^gen/".to_string()]).expect("filter");
        let tree =
            scan_source_tree(temp.path(), &MappingRules::default(), &filter).expect("scan");
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.files[0].module_id, "a.Foo");
    }

    #[test]
    fn include_list_restricts_scan() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "a/Foo.st");
        touch(temp.path(), "b/Bar.st");

        let filter =
            ScanFilter::from_patterns(&["^a/".to_string()], &[]).expect("filter");
        let tree =
            scan_source_tree(temp.path(), &MappingRules::default(), &filter).expect("scan");
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.files[0].module_id, "a.Foo");
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("nope");
        let result = scan_source_tree(&missing, &MappingRules::default(), &ScanFilter::default());
        assert!(result.is_err());
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(ScanFilter::from_patterns(&["(".to_string()], &[]).is_err());
    }
}
