//! Per-file outcome classification.
//!
//! The continue-vs-abort duality is intentional and irregular: translation
//! and mapping failures are tolerated so one run surfaces every translatable
//! defect across the tree, while an unexpected failure aborts the remaining
//! scan because the resolution environment is no longer trusted after it.
//! The distinction lives in the type, not in an error-class hierarchy.

use serde::{Deserialize, Serialize};

/// A diagnostic pinned to a source position, as reported by the transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedError {
    /// Source file the diagnostic refers to.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub message: String,
}

impl std::fmt::Display for PositionedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{},{} has error '{}'",
            self.file, self.line, self.column, self.message
        )
    }
}

/// Classified result of attempting one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileOutcome {
    Success,
    /// Output target could not be prepared (e.g. parent directory creation
    /// failed). Recorded, scan continues; the transformer is never invoked.
    MappingFailure { message: String },
    /// The transformer rejected the file with one or more positioned errors.
    /// Recorded, scan continues.
    TranslationFailure { errors: Vec<PositionedError> },
    /// Any other transformer failure. Recorded, and the remaining scan is
    /// aborted: the internal state of the resolution environment after such
    /// a failure is not trusted.
    UnexpectedFailure { message: String },
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success)
    }

    /// True when this outcome halts the scan for all later-scheduled files.
    pub fn aborts_run(&self) -> bool {
        matches!(self, FileOutcome::UnexpectedFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(msg: &str) -> PositionedError {
        PositionedError {
            file: "a/Foo.st".to_string(),
            line: 3,
            column: 7,
            message: msg.to_string(),
        }
    }

    #[test]
    fn only_unexpected_failure_aborts() {
        assert!(!FileOutcome::Success.aborts_run());
        assert!(
            !FileOutcome::MappingFailure {
                message: "mkdir failed".to_string()
            }
            .aborts_run()
        );
        assert!(
            !FileOutcome::TranslationFailure {
                errors: vec![positioned("bad reference")]
            }
            .aborts_run()
        );
        assert!(
            FileOutcome::UnexpectedFailure {
                message: "malformed compiled input".to_string()
            }
            .aborts_run()
        );
    }

    #[test]
    fn positioned_error_display_carries_all_fields() {
        let rendered = positioned("unknown type").to_string();
        assert!(rendered.contains("a/Foo.st"));
        assert!(rendered.contains("@3,7"));
        assert!(rendered.contains("unknown type"));
    }
}
