use biometry_core::error::BiometryError;
use biometry_core::export::build_sheets;
use biometry_core::extraction::poppler::PopplerExtractor;
use biometry_core::options::{load_options, ExtractOptions};
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    pattern: &str,
    output_file: &Path,
    json_file: Option<&Path>,
    config_file: Option<&Path>,
    dump_regions: bool,
) -> Result<(), BiometryError> {
    let mut options = match config_file {
        Some(path) => load_options(path)?,
        None => ExtractOptions::default(),
    };
    if dump_regions {
        options.dump_regions = true;
    }

    let paths = expand_pattern(pattern)?;
    if paths.is_empty() {
        tracing::warn!(pattern, "no files matched");
    } else if !PopplerExtractor::is_available() {
        return Err(BiometryError::PopplerNotFound { tool: "pdftohtml" });
    }

    let extractor = PopplerExtractor::new();
    let outcome = biometry_core::parse_batch(&paths, &extractor, &options);

    let sheets = build_sheets(outcome.reports.iter().map(|r| &r.report));
    output::xlsx::write(&sheets, output_file)?;
    if let Some(path) = json_file {
        output::json::write(&outcome, path)?;
    }

    output::summary::print(&outcome, &sheets, output_file);
    Ok(())
}

/// Expand a glob pattern into a sorted list of files.
fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, BiometryError> {
    let entries = glob::glob(pattern).map_err(|e| BiometryError::Pattern(e.to_string()))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "cannot read path matched by pattern"),
        }
    }
    paths.sort();
    Ok(paths)
}
