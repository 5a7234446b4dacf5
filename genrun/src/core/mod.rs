//! Pure, deterministic generation-run logic.
//!
//! Nothing in here touches the filesystem or spawns processes; everything is
//! testable with plain values.

pub mod allowlist;
pub mod outcome;
pub mod path_map;
pub mod report;
