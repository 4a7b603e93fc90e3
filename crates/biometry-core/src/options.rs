use crate::error::BiometryError;
use crate::extraction::BoldMarker;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for one extraction run. Every field has a default, so an empty
/// JSON object is a valid options file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractOptions {
    /// Maximum vertical gap between neighbouring spans of one MMT line.
    pub line_tolerance: f64,
    /// Overrides the extraction backend's own bold predicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold_marker: Option<BoldMarker>,
    /// Keep the reconstructed region lines in MMT records.
    pub dump_regions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            line_tolerance: 1.0,
            bold_marker: None,
            dump_regions: false,
        }
    }
}

impl ExtractOptions {
    /// The bold predicate to use with spans from a backend marking bold as `backend`.
    pub fn resolve_bold_marker(&self, backend: BoldMarker) -> BoldMarker {
        self.bold_marker.clone().unwrap_or(backend)
    }
}

/// Load extraction options from a JSON file.
pub fn load_options(path: &Path) -> Result<ExtractOptions, BiometryError> {
    let content = std::fs::read_to_string(path).map_err(|e| BiometryError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_options(&content, path)
}

/// Parse extraction options from a JSON string.
pub fn parse_options(json: &str, source: &Path) -> Result<ExtractOptions, BiometryError> {
    let options: ExtractOptions =
        serde_json::from_str(json).map_err(|e| BiometryError::ConfigLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_options(&options)?;
    Ok(options)
}

pub fn validate_options(options: &ExtractOptions) -> Result<(), BiometryError> {
    if !options.line_tolerance.is_finite() || options.line_tolerance < 0.0 {
        return Err(BiometryError::ConfigInvalid(format!(
            "line_tolerance must be a finite, non-negative number (got {})",
            options.line_tolerance
        )));
    }

    if let Some(BoldMarker::FontNameContains { needle }) = &options.bold_marker {
        if needle.trim().is_empty() {
            return Err(BiometryError::ConfigInvalid(
                "bold_marker needle must not be empty".into(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_gives_defaults() {
        let options = parse_options("{}", Path::new("opts.json")).unwrap();
        assert_eq!(options, ExtractOptions::default());
    }

    #[test]
    fn test_full_options() {
        let json = r#"{
            "line_tolerance": 1.5,
            "bold_marker": {"kind": "font_name_contains", "needle": "Bold"},
            "dump_regions": true
        }"#;
        let options = parse_options(json, Path::new("opts.json")).unwrap();
        assert_eq!(options.line_tolerance, 1.5);
        assert!(options.dump_regions);
        assert_eq!(
            options.resolve_bold_marker(BoldMarker::default()),
            BoldMarker::FontNameContains {
                needle: "Bold".into()
            }
        );
    }

    #[test]
    fn test_backend_marker_used_without_override() {
        let backend = BoldMarker::FlagBit { mask: 16 };
        assert_eq!(
            ExtractOptions::default().resolve_bold_marker(backend.clone()),
            backend
        );
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = parse_options(r#"{"line_tolerance": -1}"#, Path::new("o.json")).unwrap_err();
        assert!(matches!(err, BiometryError::ConfigInvalid(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_options(r#"{"tolerance": 2}"#, Path::new("o.json")).unwrap_err();
        assert!(matches!(err, BiometryError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_options_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"dump_regions": true}}"#).unwrap();
        let options = load_options(file.path()).unwrap();
        assert!(options.dump_regions);

        let err = load_options(Path::new("/nonexistent/options.json")).unwrap_err();
        assert!(matches!(err, BiometryError::ConfigLoad { .. }));
    }
}
