use biometry_core::export::Sheet;
use biometry_core::BatchOutcome;
use std::path::Path;

pub fn print(outcome: &BatchOutcome, sheets: &[Sheet], output_file: &Path) {
    for parsed in &outcome.reports {
        for warning in &parsed.warnings {
            eprintln!("Warning: {}: {}", parsed.report.filename(), warning.message);
        }
    }
    for failure in &outcome.failures {
        eprintln!("Failed: {}: {}", failure.path.display(), failure.reason);
    }

    println!(
        "Parsed {} of {} files into {}",
        outcome.reports.len(),
        outcome.reports.len() + outcome.failures.len(),
        output_file.display()
    );
    if sheets.is_empty() {
        return;
    }

    let max_name = sheets.iter().map(|s| s.name.chars().count()).max().unwrap_or(10);
    for sheet in sheets {
        println!(
            "  {:<width$}  {} rows, {} columns",
            sheet.name,
            sheet.rows.len(),
            sheet.columns.len(),
            width = max_name
        );
    }
}
