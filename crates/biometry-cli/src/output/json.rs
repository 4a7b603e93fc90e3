use biometry_core::error::BiometryError;
use biometry_core::BatchOutcome;
use std::path::Path;

/// Write the nested records, warnings and failures of a batch as JSON.
pub fn write(outcome: &BatchOutcome, path: &Path) -> Result<(), BiometryError> {
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(path, json)?;
    Ok(())
}
