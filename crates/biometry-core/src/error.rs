use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BiometryError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PopplerNotFound { tool: &'static str },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    PopplerFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("document has no pages")]
    EmptyDocument,

    #[error("lens region '{region}' contains no text")]
    EmptyRegion { region: String },

    #[error("failed to load options from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid options: {0}")]
    ConfigInvalid(String),

    #[error("invalid file pattern: {0}")]
    Pattern(String),

    #[error("failed to write output: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
