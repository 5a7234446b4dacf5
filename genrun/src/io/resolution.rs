//! Isolated module-resolution environment.
//!
//! The transformer reflectively loads project-authored types that were
//! compiled against framework stub definitions potentially different from
//! the ones visible to this process. Project-scoped lookups must therefore
//! be satisfied only from the declared search path plus the compiled-output
//! and resources directories; only shared-runtime modules may fall back to
//! the host's own context. The environment is an explicit value passed into
//! every transformer invocation, never an ambient/global loader.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Namespace prefixes that may resolve through the host's own context.
pub const SHARED_RUNTIME_PREFIXES: &[&str] = &["core", "testkit"];

/// One resolved search-path entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Absolute location of the entry.
    pub path: PathBuf,
    pub kind: SearchEntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEntryKind {
    /// A directory of compiled modules.
    Directory,
    /// A packed archive of compiled modules.
    Archive,
}

/// Policy deciding which lookups may fall back to the host context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Only modules under the shared-runtime prefixes fall back; project
    /// modules never do.
    SharedRuntimeOnly { prefixes: Vec<String> },
}

impl FallbackPolicy {
    pub fn shared_runtime() -> Self {
        Self::SharedRuntimeOnly {
            prefixes: SHARED_RUNTIME_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }

    /// Whether `module_id` may resolve through the host's own context.
    pub fn allows_fallback(&self, module_id: &str) -> bool {
        match self {
            Self::SharedRuntimeOnly { prefixes } => prefixes.iter().any(|prefix| {
                module_id == prefix
                    || module_id
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            }),
        }
    }
}

/// Isolated lookup context handed to the transformer. Built once per run,
/// read-only thereafter; dropped on every exit path when the run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEnvironment {
    /// Ordered search-path entries; order is significant for lookup priority.
    pub search_path: Vec<SearchEntry>,
    /// Directory of compiled project output.
    pub classes_dir: PathBuf,
    /// Directory of project resources.
    pub resources_dir: PathBuf,
    pub fallback: FallbackPolicy,
}

impl ResolutionEnvironment {
    pub fn allows_host_fallback(&self, module_id: &str) -> bool {
        self.fallback.allows_fallback(module_id)
    }
}

/// Resolve every search-path entry to an absolute location and assemble the
/// environment.
///
/// An unreadable or missing entry is a fatal configuration error; the run
/// must abort before any file is scanned.
pub fn build_resolution_environment(
    search_path: &[PathBuf],
    classes_dir: &Path,
    resources_dir: &Path,
) -> Result<ResolutionEnvironment> {
    let mut entries = Vec::with_capacity(search_path.len());
    for raw in search_path {
        entries.push(resolve_entry(raw)?);
    }

    let environment = ResolutionEnvironment {
        search_path: entries,
        classes_dir: absolutize(classes_dir)?,
        resources_dir: absolutize(resources_dir)?,
        fallback: FallbackPolicy::shared_runtime(),
    };
    debug!(
        entries = environment.search_path.len(),
        classes_dir = %environment.classes_dir.display(),
        "resolution environment assembled"
    );
    Ok(environment)
}

fn resolve_entry(raw: &Path) -> Result<SearchEntry> {
    let path = absolutize(raw)?;
    let metadata = std::fs::metadata(&path)
        .with_context(|| format!("unreadable search-path entry {}", path.display()))?;
    let kind = if metadata.is_dir() {
        SearchEntryKind::Directory
    } else if metadata.is_file() {
        SearchEntryKind::Archive
    } else {
        bail!("search-path entry {} is neither file nor directory", path.display());
    };
    Ok(SearchEntry { path, kind })
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("resolve current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_directories_and_archives() {
        let temp = tempfile::tempdir().expect("tempdir");
        let lib_dir = temp.path().join("lib");
        fs::create_dir_all(&lib_dir).expect("mkdir");
        let archive = temp.path().join("bundle.pack");
        fs::write(&archive, "pack").expect("write");

        let env = build_resolution_environment(
            &[lib_dir.clone(), archive.clone()],
            temp.path(),
            temp.path(),
        )
        .expect("build");

        assert_eq!(env.search_path.len(), 2);
        assert_eq!(env.search_path[0].kind, SearchEntryKind::Directory);
        assert_eq!(env.search_path[0].path, lib_dir);
        assert_eq!(env.search_path[1].kind, SearchEntryKind::Archive);
        assert_eq!(env.search_path[1].path, archive);
    }

    #[test]
    fn missing_entry_is_a_fatal_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let result = build_resolution_environment(
            &[temp.path().join("missing")],
            temp.path(),
            temp.path(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn fallback_allows_only_shared_runtime_modules() {
        let policy = FallbackPolicy::shared_runtime();
        assert!(policy.allows_fallback("core"));
        assert!(policy.allows_fallback("core.array"));
        assert!(policy.allows_fallback("testkit.assert"));
        assert!(!policy.allows_fallback("corelib"));
        assert!(!policy.allows_fallback("a.b.Foo"));
        assert!(!policy.allows_fallback(""));
    }
}
