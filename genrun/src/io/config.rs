//! Run configuration stored in `genrun.toml`.
//!
//! This file is intended to be edited by humans and must remain stable and
//! automatable. Missing fields default to sensible values; a missing file is
//! the full default configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Resolved configuration surface for a generation run (TOML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    /// Root of the translatable source tree.
    pub source_root: PathBuf,
    /// Root the mirrored artifact tree is written under.
    pub output_root: PathBuf,
    /// Directory of compiled project output the transformer resolves against.
    pub classes_dir: PathBuf,
    /// Directory of project resources.
    pub resources_dir: PathBuf,
    /// Ordered library search path (directories or archives).
    pub search_path: Vec<PathBuf>,

    /// Include regexes over source-root-relative paths; empty means all.
    pub include: Vec<String>,
    /// Exclude regexes over source-root-relative paths.
    pub exclude: Vec<String>,

    /// Extension (without dot) of translatable sources.
    pub source_extension: String,
    /// Extension (without dot) of generated artifacts.
    pub output_extension: String,
    /// Reserved per-directory marker file name, skipped entirely.
    pub marker_file_name: String,

    /// Source text encoding handed to the transformer.
    pub source_encoding: String,
    /// Emit a bounds check in each generated loop iteration.
    pub bounds_check_in_loops: bool,
    /// Emit a source map next to each generated artifact.
    pub emit_source_map: bool,
    /// Extra namespaces the transformer may reference, beyond the baseline
    /// and the ones derived from the source tree.
    pub allowed_namespaces: Vec<String>,

    pub transformer: TransformerConfig,
}

/// External transformer process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransformerConfig {
    /// Command argv to invoke once per source file (e.g. `["stcc"]`).
    pub command: Vec<String>,
    /// Directory holding the shared runtime support bundle.
    pub support_dir: PathBuf,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            command: vec!["stcc".to_string()],
            support_dir: PathBuf::from("support"),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            output_root: PathBuf::from("generated"),
            classes_dir: PathBuf::from("build/classes"),
            resources_dir: PathBuf::from("build/resources"),
            search_path: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            source_extension: "st".to_string(),
            output_extension: "js".to_string(),
            marker_file_name: "package-info.st".to_string(),
            source_encoding: "UTF-8".to_string(),
            bounds_check_in_loops: true,
            emit_source_map: false,
            allowed_namespaces: Vec::new(),
            transformer: TransformerConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source_extension.trim().is_empty() {
            return Err(anyhow!("source_extension must be non-empty"));
        }
        if self.output_extension.trim().is_empty() {
            return Err(anyhow!("output_extension must be non-empty"));
        }
        if self.marker_file_name.trim().is_empty() {
            return Err(anyhow!("marker_file_name must be non-empty"));
        }
        if self.source_encoding.trim().is_empty() {
            return Err(anyhow!("source_encoding must be non-empty"));
        }
        if self.transformer.command.is_empty()
            || self.transformer.command[0].trim().is_empty()
        {
            return Err(anyhow!("transformer.command must be a non-empty array"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunConfig::default()`.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    if !path.exists() {
        let cfg = RunConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_run_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, RunConfig::default());
    }

    #[test]
    fn parses_partial_file_with_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("genrun.toml");
        fs::write(
            &path,
            "source_root = \"sources\"\nemit_source_map = true\n\n[transformer]\ncommand = [\"my-gen\", \"--strict\"]\n",
        )
        .expect("write");
        let cfg = load_run_config(&path).expect("load");
        assert_eq!(cfg.source_root, PathBuf::from("sources"));
        assert!(cfg.emit_source_map);
        assert!(cfg.bounds_check_in_loops);
        assert_eq!(cfg.transformer.command[0], "my-gen");
    }

    #[test]
    fn rejects_empty_transformer_command() {
        let cfg = RunConfig {
            transformer: TransformerConfig {
                command: Vec::new(),
                ..TransformerConfig::default()
            },
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_encoding() {
        let cfg = RunConfig {
            source_encoding: " ".to_string(),
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
