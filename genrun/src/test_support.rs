//! Test-only helpers: a scripted transformer and filesystem fixtures.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::outcome::PositionedError;
use crate::io::publish::SupportFile;
use crate::transformer::{TransformError, TransformRequest, Transformer};

/// Scripted result for one module.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    Success,
    Translation(Vec<PositionedError>),
    Unexpected(String),
}

/// Transformer that returns predetermined outcomes without spawning
/// processes. Unscripted modules succeed and have their artifact written, so
/// tests can assert on the mirrored output tree.
pub struct ScriptedTransformer {
    script: HashMap<String, ScriptedStep>,
    // Consumed in call order when non-empty; takes precedence over `script`.
    // Lets tests pin behavior to invocation order when traversal order is
    // not known in advance.
    sequence: std::collections::VecDeque<ScriptedStep>,
    calls: Vec<String>,
    bundle: Vec<SupportFile>,
    // Owns the backing directory for the default support bundle.
    _support_dir: tempfile::TempDir,
    artifact_extension: String,
    seen_namespaces: BTreeSet<String>,
    seen_output_root: Option<PathBuf>,
    seen_classes_dir: Option<PathBuf>,
    closed: bool,
}

impl Default for ScriptedTransformer {
    fn default() -> Self {
        let support_dir = tempfile::tempdir().expect("support tempdir");
        let runtime = support_dir.path().join("runtime.js");
        std::fs::write(&runtime, "// shared runtime\n").expect("write runtime");
        Self {
            script: HashMap::new(),
            sequence: std::collections::VecDeque::new(),
            calls: Vec::new(),
            bundle: vec![SupportFile {
                file_name: "runtime.js".to_string(),
                source: runtime,
            }],
            _support_dir: support_dir,
            artifact_extension: "js".to_string(),
            seen_namespaces: BTreeSet::new(),
            seen_output_root: None,
            seen_classes_dir: None,
            closed: false,
        }
    }
}

impl ScriptedTransformer {
    /// Script the outcome for a module id.
    pub fn script(&mut self, module_id: &str, step: ScriptedStep) {
        self.script.insert(module_id.to_string(), step);
    }

    /// Script outcomes by invocation order instead of module id.
    pub fn script_sequence(&mut self, steps: Vec<ScriptedStep>) {
        self.sequence = steps.into();
    }

    /// Replace the support bundle.
    pub fn set_bundle(&mut self, bundle: Vec<SupportFile>) {
        self.bundle = bundle;
    }

    /// Module ids in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Union of allowed namespaces seen across invocations.
    pub fn seen_namespaces(&self) -> BTreeSet<String> {
        self.seen_namespaces.clone()
    }

    pub fn seen_output_root(&self) -> Option<PathBuf> {
        self.seen_output_root.clone()
    }

    pub fn seen_classes_dir(&self) -> Option<PathBuf> {
        self.seen_classes_dir.clone()
    }

    fn artifact_path(&self, output_root: &Path, module_id: &str) -> PathBuf {
        let rel: PathBuf = module_id.split('.').collect();
        output_root.join(rel.with_extension(&self.artifact_extension))
    }
}

impl Transformer for ScriptedTransformer {
    fn transform(&mut self, request: &TransformRequest<'_>) -> Result<(), TransformError> {
        self.calls.push(request.module_id.to_string());
        self.seen_namespaces.extend(
            request
                .config
                .allowed_namespaces
                .iter()
                .map(str::to_string),
        );
        self.seen_output_root = Some(request.output_root.to_path_buf());
        self.seen_classes_dir = Some(request.classes_dir.to_path_buf());

        let step = match self.sequence.pop_front() {
            Some(step) => Some(step),
            None => self.script.get(request.module_id).cloned(),
        };
        match step {
            None | Some(ScriptedStep::Success) => {
                let artifact = self.artifact_path(request.output_root, request.module_id);
                std::fs::write(&artifact, "// generated\n").map_err(|err| {
                    TransformError::Unexpected(format!(
                        "write artifact {}: {err}",
                        artifact.display()
                    ))
                })?;
                Ok(())
            }
            Some(ScriptedStep::Translation(errors)) => Err(TransformError::Translation(errors)),
            Some(ScriptedStep::Unexpected(message)) => Err(TransformError::Unexpected(message)),
        }
    }

    fn support_bundle(&self) -> &[SupportFile] {
        &self.bundle
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Create a file (and its parent directories) under `root`.
pub fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, "source\n").expect("write file");
}

/// A positioned error with deterministic fields for assertions.
pub fn positioned(file: &str, line: u32, column: u32, message: &str) -> PositionedError {
    PositionedError {
        file: file.to_string(),
        line,
        column,
        message: message.to_string(),
    }
}
