pub mod dispatch;
pub mod error;
pub mod export;
pub mod extraction;
pub mod layout;
pub mod model;
pub mod options;
pub mod parsing;

use error::BiometryError;
use extraction::PdfExtractor;
use model::ParsedReport;
use options::ExtractOptions;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Main API entry point: parse one biometry PDF into a report record.
///
/// The file is read, handed to the extractor, and dispatched on its title.
/// Unsupported report types come back as warnings on a minimal record; only
/// unreadable files or structurally broken layouts are errors.
pub fn parse_pdf(
    path: &Path,
    extractor: &dyn PdfExtractor,
    options: &ExtractOptions,
) -> Result<ParsedReport, BiometryError> {
    let pdf_bytes = std::fs::read(path)?;
    parse_pdf_bytes(&path.display().to_string(), &pdf_bytes, extractor, options)
}

/// Like [`parse_pdf`] for bytes already in memory; `filename` is recorded as is.
pub fn parse_pdf_bytes(
    filename: &str,
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    options: &ExtractOptions,
) -> Result<ParsedReport, BiometryError> {
    let document = extractor.extract(pdf_bytes)?;
    let bold = options.resolve_bold_marker(extractor.bold_marker());
    dispatch::parse_document(filename, &document, options, &bold)
}

/// A file that could not be parsed at all.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub reports: Vec<ParsedReport>,
    pub failures: Vec<FileFailure>,
}

/// Parse files one after another; a failing file never stops the batch.
pub fn parse_batch<P: AsRef<Path>>(
    paths: &[P],
    extractor: &dyn PdfExtractor,
    options: &ExtractOptions,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for path in paths {
        let path = path.as_ref();
        match parse_pdf(path, extractor, options) {
            Ok(report) => outcome.reports.push(report),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                outcome.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        parsed = outcome.reports.len(),
        failed = outcome.failures.len(),
        backend = extractor.backend_name(),
        "batch finished"
    );
    outcome
}
