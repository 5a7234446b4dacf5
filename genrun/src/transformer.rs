//! Transformer abstraction for per-file artifact generation.
//!
//! The [`Transformer`] trait decouples run orchestration from the actual
//! generation backend. The production backend spawns an external generator
//! command once per source file; tests use scripted transformers that return
//! predetermined outcomes without spawning processes.
//!
//! A transformer is a scoped, run-level resource: it holds non-re-entrant
//! internal state (caches, the isolated resolution context), so invocations
//! are strictly sequential within a run and `close` must be called on every
//! exit path.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::allowlist::AllowedNamespaces;
use crate::core::outcome::PositionedError;
use crate::io::config::TransformerConfig;
use crate::io::publish::{SupportFile, bundle_from_dir};
use crate::io::resolution::{ResolutionEnvironment, SearchEntry};

/// Immutable per-run generation options handed to every invocation.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Emit a bounds check in each generated loop iteration.
    pub bounds_check_in_loops: bool,
    /// Emit a source map next to each generated artifact.
    pub emit_source_map: bool,
    /// Source text encoding.
    pub source_encoding: String,
    /// Namespaces the transformer may reference during generation.
    pub allowed_namespaces: AllowedNamespaces,
}

/// Everything a single invocation needs.
#[derive(Debug)]
pub struct TransformRequest<'a> {
    pub environment: &'a ResolutionEnvironment,
    pub module_id: &'a str,
    pub source_root: &'a Path,
    pub output_root: &'a Path,
    pub classes_dir: &'a Path,
    pub config: &'a GenerationConfig,
}

/// How a single invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// One or more positioned errors, all for the same input file. The run
    /// continues with the next scheduled file.
    Translation(Vec<PositionedError>),
    /// Any other failure mode (malformed compiled input, internal resolution
    /// failure). The run aborts after recording it.
    Unexpected(String),
}

/// Abstraction over generation backends. No partial-effect guarantee on
/// failure.
pub trait Transformer {
    /// Generate the artifact for one module. Synchronous, no timeout: a
    /// stalled invocation blocks the run indefinitely.
    fn transform(&mut self, request: &TransformRequest<'_>) -> Result<(), TransformError>;

    /// The fixed shared-runtime support bundle this transformer's output
    /// depends on.
    fn support_bundle(&self) -> &[SupportFile];

    /// Release run-scoped resources. Called on every exit path.
    fn close(&mut self) -> Result<()>;
}

/// Transformer that spawns an external generator command per file.
///
/// Contract with the command: exit 0 means the artifact was written; a
/// nonzero exit with JSON-lines diagnostics on stdout reports translation
/// errors; anything else is unclassified.
pub struct CommandTransformer {
    command: Vec<String>,
    bundle: Vec<SupportFile>,
    closed: bool,
}

/// One diagnostic line emitted by the generator command.
#[derive(Debug, Deserialize)]
struct DiagnosticLine {
    file: String,
    line: u32,
    column: u32,
    message: String,
}

impl CommandTransformer {
    /// Initialize the transformer: enumerate its support bundle up front so
    /// a misconfigured support directory fails before any file is attempted.
    pub fn new(config: &TransformerConfig) -> Result<Self> {
        let bundle = bundle_from_dir(&config.support_dir)
            .with_context(|| format!("enumerate support bundle {}", config.support_dir.display()))?;
        Ok(Self {
            command: config.command.clone(),
            bundle,
            closed: false,
        })
    }

    fn build_command(&self, request: &TransformRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..]);
        cmd.arg(request.module_id)
            .arg("--source-root")
            .arg(request.source_root)
            .arg("--output-root")
            .arg(request.output_root)
            .arg("--classes-dir")
            .arg(request.classes_dir)
            .arg("--resources-dir")
            .arg(&request.environment.resources_dir)
            .arg("--encoding")
            .arg(&request.config.source_encoding);
        for SearchEntry { path, .. } in &request.environment.search_path {
            cmd.arg("--search").arg(path);
        }
        for namespace in request.config.allowed_namespaces.iter() {
            cmd.arg("--allow").arg(namespace);
        }
        if request.config.bounds_check_in_loops {
            cmd.arg("--bounds-check");
        }
        if request.config.emit_source_map {
            cmd.arg("--source-map");
        }
        cmd
    }
}

impl Transformer for CommandTransformer {
    #[instrument(skip_all, fields(module_id = request.module_id))]
    fn transform(&mut self, request: &TransformRequest<'_>) -> Result<(), TransformError> {
        let mut cmd = self.build_command(request);
        debug!(command = %self.command[0], "invoking generator");

        let output = cmd
            .output()
            .map_err(|err| TransformError::Unexpected(format!("spawn generator: {err}")))?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics = parse_diagnostics(&stdout);
        if !diagnostics.is_empty() {
            return Err(TransformError::Translation(diagnostics));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(exit_code = ?output.status.code(), "generator failed without diagnostics");
        Err(TransformError::Unexpected(format!(
            "generator exited with status {:?}: {}",
            output.status.code(),
            stderr.trim()
        )))
    }

    fn support_bundle(&self) -> &[SupportFile] {
        &self.bundle
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

fn parse_diagnostics(stdout: &str) -> Vec<PositionedError> {
    let mut diagnostics = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<DiagnosticLine>(line) {
            Ok(diag) => diagnostics.push(PositionedError {
                file: diag.file,
                line: diag.line,
                column: diag.column,
                message: diag.message,
            }),
            Err(_) => return Vec::new(),
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_line_diagnostics() {
        let stdout = concat!(
            "{\"file\":\"a/Foo.st\",\"line\":3,\"column\":7,\"message\":\"unknown type\"}\n",
            "{\"file\":\"a/Foo.st\",\"line\":9,\"column\":1,\"message\":\"bad loop\"}\n",
        );
        let diagnostics = parse_diagnostics(stdout);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 3);
        assert_eq!(diagnostics[1].message, "bad loop");
    }

    #[test]
    fn unparseable_output_yields_no_diagnostics() {
        assert!(parse_diagnostics("segfault\n").is_empty());
        // Mixed valid/invalid lines are treated as unclassified output.
        let mixed = "{\"file\":\"f\",\"line\":1,\"column\":1,\"message\":\"m\"}\ngarbage\n";
        assert!(parse_diagnostics(mixed).is_empty());
    }

    #[test]
    fn empty_support_dir_yields_empty_bundle() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = TransformerConfig {
            command: vec!["stcc".to_string()],
            support_dir: temp.path().to_path_buf(),
        };
        let transformer = CommandTransformer::new(&config).expect("new");
        assert!(transformer.support_bundle().is_empty());
    }

    #[test]
    fn missing_support_dir_fails_initialization() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = TransformerConfig {
            command: vec!["stcc".to_string()],
            support_dir: temp.path().join("missing"),
        };
        assert!(CommandTransformer::new(&config).is_err());
    }
}
