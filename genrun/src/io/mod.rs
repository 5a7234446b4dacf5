//! Side-effecting operations: filesystem walks, resolution-entry probing,
//! support-artifact copies, and run configuration.

pub mod config;
pub mod publish;
pub mod resolution;
pub mod scan;
