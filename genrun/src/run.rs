//! Orchestration of a full generation run.
//!
//! Drives scan → per-file {map, invoke, record} → publish → finalize, and
//! owns the [`RunReport`]. Processing is single-threaded and strictly
//! sequential: the transformer holds shared, run-scoped, non-re-entrant
//! state, so one file is mapped, invoked, and recorded before the next is
//! considered.
//!
//! Failure policy: mapping and translation failures are recorded and the
//! scan continues, so one run surfaces every translatable defect in the
//! tree. An unexpected failure is recorded and aborts the remaining scan.
//! Configuration and publish errors are fatal for the whole run.

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::core::allowlist::AllowedNamespaces;
use crate::core::outcome::FileOutcome;
use crate::core::path_map::MappingRules;
use crate::core::report::RunReport;
use crate::io::config::RunConfig;
use crate::io::publish::publish_support_bundle;
use crate::io::resolution::build_resolution_environment;
use crate::io::scan::{ScanFilter, scan_source_tree};
use crate::transformer::{GenerationConfig, TransformError, TransformRequest, Transformer};

/// Run a full generation pass over the configured source tree.
///
/// Returns the run report; fatal configuration and publish errors propagate
/// as errors instead. The transformer is closed on every exit path.
#[instrument(skip_all, fields(source_root = %config.source_root.display()))]
pub fn run_generation(
    transformer: &mut dyn Transformer,
    config: &RunConfig,
) -> Result<RunReport> {
    let result = drive(transformer, config);
    let closed = transformer.close().context("close transformer");
    match result {
        Ok(report) => closed.map(|()| report),
        Err(err) => {
            // The run error is the interesting one; a close failure on this
            // path is only logged.
            if let Err(close_err) = closed {
                error!(err = %close_err, "transformer close failed after run error");
            }
            Err(err)
        }
    }
}

fn drive(transformer: &mut dyn Transformer, config: &RunConfig) -> Result<RunReport> {
    let start = Instant::now();
    let mut report = RunReport::new(Utc::now().to_rfc3339());

    info!(output_root = %config.output_root.display(), "generating artifacts");

    // Fatal configuration errors abort before any file is scanned.
    let environment = build_resolution_environment(
        &config.search_path,
        &config.classes_dir,
        &config.resources_dir,
    )
    .context("build resolution environment")?;

    let rules = MappingRules {
        source_extension: config.source_extension.clone(),
        output_extension: config.output_extension.clone(),
        marker_file_name: config.marker_file_name.clone(),
    };
    let filter = ScanFilter::from_patterns(&config.include, &config.exclude)
        .context("compile scan filter")?;
    let scan = scan_source_tree(&config.source_root, &rules, &filter)
        .context("scan source tree")?;

    let allowed_namespaces = AllowedNamespaces::build(
        scan.directories.iter().map(|d| d.as_path()),
        config.allowed_namespaces.iter().cloned(),
    );
    debug!(namespaces = allowed_namespaces.len(), "allowlist built");

    let generation_config = GenerationConfig {
        bounds_check_in_loops: config.bounds_check_in_loops,
        emit_source_map: config.emit_source_map,
        source_encoding: config.source_encoding.clone(),
        allowed_namespaces,
    };

    for entry in scan.files {
        // Marker files map to no target and are skipped entirely: never
        // attempted, never recorded.
        let Some(target_rel) = rules.map_to_target(&entry.rel_path) else {
            debug!(path = %entry.rel_path.display(), "skipping marker file");
            continue;
        };
        let target = config.output_root.join(&target_rel);
        debug!(target = %target.display(), module_id = %entry.module_id, "generating");

        if let Some(parent) = target.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            error!(
                dir = %parent.display(),
                err = %err,
                "cannot create output directory"
            );
            report.record(
                entry,
                FileOutcome::MappingFailure {
                    message: format!("create output directory {}: {err}", parent.display()),
                },
            );
            continue;
        }

        let request = TransformRequest {
            environment: &environment,
            module_id: &entry.module_id,
            source_root: &config.source_root,
            output_root: &config.output_root,
            classes_dir: &config.classes_dir,
            config: &generation_config,
        };
        match transformer.transform(&request) {
            Ok(()) => report.record(entry, FileOutcome::Success),
            Err(TransformError::Translation(errors)) => {
                for positioned in &errors {
                    error!("{positioned}");
                }
                report.record(entry, FileOutcome::TranslationFailure { errors });
            }
            Err(TransformError::Unexpected(message)) => {
                error!(
                    file = %entry.rel_path.display(),
                    "unexpected generation failure: {message}"
                );
                report.record(entry, FileOutcome::UnexpectedFailure { message });
                // The resolution environment is no longer trusted; no
                // further files are invoked.
                report.aborted = true;
                break;
            }
        }
    }

    // Publishing runs whenever anything succeeded, the abort path included.
    if report.succeeded() > 0 {
        publish_support_bundle(transformer.support_bundle(), &config.output_root)
            .context("publish support bundle")?;
    }

    report.elapsed = start.elapsed();
    info!(
        succeeded = report.succeeded(),
        attempted = report.attempted(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "generation run finished"
    );
    Ok(report)
}
