//! Flattening of nested report records into spreadsheet rows.
//!
//! Nested keys are joined with `_`, so `od.lenses.SN60WF.iol_0` becomes
//! `od_lenses_SN60WF_iol_0`. Field and lens names may contain `_`
//! themselves, so the flat form cannot be reliably split back apart.

use crate::model::{Fields, IolEye, Report, Value};
use crate::parsing::values::parse_finite;
use std::collections::HashSet;

const SEP: &str = "_";
/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

fn join(prefix: &str, key: &str) -> String {
    format!("{prefix}{SEP}{key}")
}

fn push_prefixed(out: &mut Fields, prefix: &str, fields: &Fields) {
    for (k, v) in fields.iter() {
        out.insert(join(prefix, k), v.clone());
    }
}

fn push_iol_eye(out: &mut Fields, eye: &str, data: &IolEye) {
    push_prefixed(out, eye, &data.fields);
    let lenses = join(eye, "lenses");
    for lens in &data.lenses {
        let prefix = join(&lenses, &lens.name);
        out.insert(join(&prefix, "name"), lens.name.as_str());
        push_prefixed(out, &prefix, &lens.fields);
    }
}

/// One flat row for a report, keys in record order.
pub fn flatten_report(report: &Report) -> Fields {
    let mut out = Fields::new();
    out.insert("filename", report.filename());
    out.insert("title", report.title());

    match report {
        Report::Iol(r) => {
            out.extend(r.header.clone());
            push_iol_eye(&mut out, "od", &r.od);
            push_iol_eye(&mut out, "os", &r.os);
        }
        Report::Mmt(r) => {
            out.extend(r.header.clone());
            push_prefixed(&mut out, "od", &r.od);
            push_prefixed(&mut out, "os", &r.os);
            out.extend(r.regions.clone());
        }
        Report::Unrecognized(_) => {}
    }
    out
}

/// Sheet name for a report title: invalid characters replaced, at most
/// [`MAX_SHEET_NAME_CHARS`] characters, never empty.
pub fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.trim().is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

/// One worksheet: every report sharing a (truncated) title.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Group reports into sheets by title, in first-seen order.
///
/// Workbooks compare sheet names case-insensitively, so titles differing
/// only in case share one sheet named after the first of them. Columns are the union of the rows' keys in first-seen order. A text
/// column whose non-empty cells all read as finite numbers is converted to
/// numbers; a column holding any other text is left as it is.
pub fn build_sheets<'a>(reports: impl IntoIterator<Item = &'a Report>) -> Vec<Sheet> {
    let mut groups: Vec<(String, String, Vec<Fields>)> = Vec::new();
    for report in reports {
        let name = sheet_name(report.title());
        let key = name.to_lowercase();
        let row = flatten_report(report);
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, rows)) => rows.push(row),
            None => groups.push((key, name, vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(_, name, rows)| build_sheet(name, &rows))
        .collect()
}

fn build_sheet(name: String, rows: &[Fields]) -> Sheet {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key) {
                columns.push(key.to_string());
            }
        }
    }

    let mut cells: Vec<Vec<Cell>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| match row.get(col) {
                    Some(Value::Text(s)) => Cell::Text(s.clone()),
                    Some(Value::Number(n)) => Cell::Number(*n),
                    None => Cell::Empty,
                })
                .collect()
        })
        .collect();

    for col in 0..columns.len() {
        let numeric = cells.iter().all(|row| match &row[col] {
            Cell::Text(s) => parse_finite(s).is_some(),
            _ => true,
        });
        if !numeric {
            continue;
        }
        for row in &mut cells {
            if let Cell::Text(s) = &row[col] {
                if let Some(n) = parse_finite(s) {
                    row[col] = Cell::Number(n);
                }
            }
        }
    }

    Sheet {
        name,
        columns,
        rows: cells,
    }
}
