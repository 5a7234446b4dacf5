//! CLI command implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::allowlist::AllowedNamespaces;
use crate::core::path_map::MappingRules;
use crate::core::report::{RunReport, RunResult};
use crate::exit_codes;
use crate::io::config::load_run_config;
use crate::io::scan::{ScanFilter, scan_source_tree};
use crate::run::run_generation;
use crate::transformer::CommandTransformer;

/// Run a full generation pass. Returns the process exit code.
pub fn generate(config_path: &Path, report_path: Option<&Path>) -> Result<i32> {
    let config = load_run_config(config_path).context("load run config")?;
    debug!(config_path = %config_path.display(), "config loaded");

    let mut transformer =
        CommandTransformer::new(&config.transformer).context("initialize transformer")?;
    let report = run_generation(&mut transformer, &config)?;

    println!(
        "generate: attempted={} succeeded={} elapsed_secs={:.2} result={:?}{}",
        report.attempted(),
        report.succeeded(),
        report.elapsed.as_secs_f64(),
        report.overall_result(),
        if report.aborted { " (aborted)" } else { "" }
    );

    if let Some(path) = report_path {
        write_report(path, &report).context("write report")?;
    }

    match report.overall_result() {
        RunResult::Success => Ok(exit_codes::OK),
        RunResult::Failure => Ok(exit_codes::GENERATION_FAILED),
    }
}

/// Scan and map without invoking the transformer: print every source-to-
/// artifact mapping and the derived allowlist.
pub fn plan(config_path: &Path) -> Result<i32> {
    let config = load_run_config(config_path).context("load run config")?;
    let rules = MappingRules {
        source_extension: config.source_extension.clone(),
        output_extension: config.output_extension.clone(),
        marker_file_name: config.marker_file_name.clone(),
    };
    let filter = ScanFilter::from_patterns(&config.include, &config.exclude)
        .context("compile scan filter")?;
    let scan =
        scan_source_tree(&config.source_root, &rules, &filter).context("scan source tree")?;

    for entry in &scan.files {
        match rules.map_to_target(&entry.rel_path) {
            Some(target) => println!(
                "plan: {} -> {} (module {})",
                entry.rel_path.display(),
                config.output_root.join(target).display(),
                entry.module_id
            ),
            None => println!("plan: skip {} (marker)", entry.rel_path.display()),
        }
    }

    let allowed = AllowedNamespaces::build(
        scan.directories.iter().map(|d| d.as_path()),
        config.allowed_namespaces.iter().cloned(),
    );
    for namespace in allowed.iter() {
        println!("plan: allow {namespace}");
    }
    Ok(exit_codes::OK)
}

#[derive(Serialize)]
struct ReportDoc<'a> {
    attempted: usize,
    succeeded: usize,
    overall_result: RunResult,
    #[serde(flatten)]
    report: &'a RunReport,
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report dir {}", parent.display()))?;
    }
    let doc = ReportDoc {
        attempted: report.attempted(),
        succeeded: report.succeeded(),
        overall_result: report.overall_result(),
        report,
    };
    let mut contents = serde_json::to_string_pretty(&doc).context("serialize report")?;
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
