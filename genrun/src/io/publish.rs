//! Shared support-artifact publishing.
//!
//! Every generated artifact references a fixed bundle of shared runtime
//! helper files. The bundle is copied into the output root once at least one
//! file has transformed successfully; a copy failure is fatal for the whole
//! run because output without the helpers is unusable.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

/// One file of the transformer-owned support bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    /// Name under the output root.
    pub file_name: String,
    /// Absolute source location.
    pub source: std::path::PathBuf,
}

/// Copy the support bundle into the output root.
pub fn publish_support_bundle(bundle: &[SupportFile], output_root: &Path) -> Result<()> {
    if bundle.is_empty() {
        bail!("support bundle is empty");
    }
    fs::create_dir_all(output_root)
        .with_context(|| format!("create output root {}", output_root.display()))?;

    for file in bundle {
        let target = output_root.join(&file.file_name);
        fs::copy(&file.source, &target).with_context(|| {
            format!(
                "copy support file {} to {}",
                file.source.display(),
                target.display()
            )
        })?;
        debug!(file = %file.file_name, "support file published");
    }
    info!(files = bundle.len(), output_root = %output_root.display(), "support bundle published");
    Ok(())
}

/// Enumerate a support directory into a bundle, sorted by file name so the
/// copy order is stable.
pub fn bundle_from_dir(support_dir: &Path) -> Result<Vec<SupportFile>> {
    let mut bundle = Vec::new();
    for entry in fs::read_dir(support_dir)
        .with_context(|| format!("read support dir {}", support_dir.display()))?
    {
        let entry = entry.context("read support dir entry")?;
        if !entry.file_type().context("support entry type")?.is_file() {
            continue;
        }
        bundle.push(SupportFile {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            source: entry.path(),
        });
    }
    bundle.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(bundle)
}
