use biometry_core::error::BiometryError;
use biometry_core::export::{Cell, Sheet, MAX_SHEET_NAME_CHARS};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::path::Path;

fn export_err(e: XlsxError) -> BiometryError {
    BiometryError::Export(e.to_string())
}

/// Write sheets to an .xlsx workbook: a bold header row of column names,
/// then one row per report. An empty batch still produces a valid workbook.
pub fn write(sheets: &[Sheet], path: &Path) -> Result<(), BiometryError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    if sheets.is_empty() {
        workbook.add_worksheet();
    }
    let mut used = HashSet::new();
    for sheet in sheets {
        let name = unique_name(&sheet.name, &mut used);
        if name != sheet.name {
            tracing::warn!(sheet = %sheet.name, renamed = %name, "sheet name already used");
        }
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name).map_err(export_err)?;
        write_sheet(worksheet, sheet, &header)?;
    }

    workbook.save(path).map_err(export_err)?;
    tracing::debug!(path = %path.display(), sheets = sheets.len(), "workbook written");
    Ok(())
}

/// `name`, or `name` with a `_<n>` suffix when a sheet of that name
/// (ignoring case) already exists. The result fits the sheet name limit.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut n = 2;
    while !used.insert(candidate.to_lowercase()) {
        let suffix = format!("_{n}");
        let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
        candidate = name.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    candidate
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    header: &Format,
) -> Result<(), BiometryError> {
    for (col, name) in sheet.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, column_index(col)?, name, header)
            .map_err(export_err)?;
    }

    for (i, row) in sheet.rows.iter().enumerate() {
        let row_index = u32::try_from(i + 1).map_err(|_| {
            BiometryError::Export(format!("too many rows in sheet '{}'", sheet.name))
        })?;
        for (col, cell) in row.iter().enumerate() {
            let col = column_index(col)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_index, col, s).map_err(export_err)?;
                }
                Cell::Number(n) if n.is_finite() => {
                    worksheet.write_number(row_index, col, *n).map_err(export_err)?;
                }
                Cell::Number(n) => {
                    worksheet
                        .write_string(row_index, col, n.to_string())
                        .map_err(export_err)?;
                }
            }
        }
    }
    Ok(())
}

fn column_index(col: usize) -> Result<u16, BiometryError> {
    u16::try_from(col).map_err(|_| BiometryError::Export(format!("column {col} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn sample_sheet() -> Sheet {
        Sheet {
            name: "IOL-Haigis".into(),
            columns: vec![
                "filename".into(),
                "od_AL".into(),
                "od_lenses_SN60WF_iolbold".into(),
            ],
            rows: vec![
                vec![
                    Cell::Text("a.pdf".into()),
                    Cell::Text("23.77 mm".into()),
                    Cell::Number(17.5),
                ],
                vec![Cell::Text("b.pdf".into()), Cell::Empty, Cell::Number(18.0)],
            ],
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write(&[sample_sheet()], &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["IOL-Haigis".to_string()]);

        let range = workbook.worksheet_range("IOL-Haigis").unwrap();
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("od_AL".into())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("a.pdf".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(17.5)));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(18.0)));
        assert!(matches!(range.get_value((2, 1)), None | Some(Data::Empty)));
    }

    #[test]
    fn test_titles_differing_in_case_write_one_sheet() {
        use biometry_core::export::build_sheets;
        use biometry_core::model::{Report, UnrecognizedReport};

        let reports: Vec<Report> = [("a.pdf", "MMT-Full"), ("b.pdf", "mmt-full")]
            .iter()
            .map(|(filename, title)| {
                Report::Unrecognized(UnrecognizedReport {
                    filename: filename.to_string(),
                    title: title.to_string(),
                })
            })
            .collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write(&build_sheets(&reports), &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["MMT-Full".to_string()]);
        let range = workbook.worksheet_range("MMT-Full").unwrap();
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("b.pdf".into())));
    }

    #[test]
    fn test_colliding_sheet_names_get_suffixes() {
        let mut first = sample_sheet();
        first.name = "A".repeat(31);
        let mut second = first.clone();
        second.name = "a".repeat(31);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write(&[first, second], &path).unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let names = workbook.sheet_names();
        assert_eq!(names.len(), 2);
        assert_eq!(names[1], format!("{}_2", "a".repeat(29)));
    }

    #[test]
    fn test_empty_batch_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write(&[], &path).unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names().len(), 1);
    }

    #[test]
    fn test_unwritable_path_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let err = write(&[sample_sheet()], &path).unwrap_err();
        assert!(matches!(err, BiometryError::Export(_)));
    }
}
