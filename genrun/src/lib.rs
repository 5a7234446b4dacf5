//! Incremental script-generation run orchestrator.
//!
//! Walks a source tree, maps each source file to its output artifact path,
//! invokes an external per-file transformer under an isolated resolution
//! environment, and aggregates per-file outcomes into a run-level verdict.
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (path mapping, allowlist
//!   derivation, outcome classification, report aggregation). No I/O, fully
//!   testable in isolation.
//! - **[`io`]**: Side-effecting operations (tree scanning, resolution-entry
//!   probing, support-artifact copies, configuration).
//!
//! The orchestration module ([`run`]) coordinates core logic with I/O; the
//! per-file transformation algorithm itself lives behind the
//! [`transformer::Transformer`] trait and is opaque to this crate.

pub mod cli;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod transformer;
