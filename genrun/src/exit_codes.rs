//! Stable exit codes for genrun commands.

/// Run completed and every recorded outcome was a success.
pub const OK: i32 = 0;
/// Fatal configuration, resolution, or publish error.
pub const INVALID: i32 = 1;
/// Run completed (or aborted) with at least one non-success outcome.
pub const GENERATION_FAILED: i32 = 2;
