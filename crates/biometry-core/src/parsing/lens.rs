use crate::error::BiometryError;
use crate::extraction::{BoldMarker, TextSpan};
use crate::layout::{group_lines_exact, Line};
use crate::model::{Fields, Lens};
use crate::parsing::header::colon_pair;
use crate::parsing::values::parse_number;

const IOL_HEADER: [&str; 2] = ["IOL (D)", "REF (D)"];

/// Where the scan is relative to the IOL/REF numeric table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    BeforeHeader,
    Rows { next: usize },
    Finished,
}

/// One numeric row of the lens table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow<'a> {
    pub index: usize,
    pub iol: f64,
    pub refraction: f64,
    pub iol_span: &'a TextSpan,
}

/// Line-by-line state machine for the IOL/REF table.
///
/// The header row opens the table; every following line must hold two
/// numbers. The first line that doesn't closes the table for good.
#[derive(Debug, Clone)]
pub struct LensTable {
    state: TableState,
}

impl Default for LensTable {
    fn default() -> Self {
        LensTable {
            state: TableState::BeforeHeader,
        }
    }
}

impl LensTable {
    pub fn state(&self) -> TableState {
        self.state
    }

    pub fn feed<'a>(&mut self, line: &Line<'a>) -> Option<TableRow<'a>> {
        match self.state {
            TableState::BeforeHeader => {
                if line.starts_with_texts(&IOL_HEADER) {
                    self.state = TableState::Rows { next: 0 };
                }
                None
            }
            TableState::Rows { next } => match parse_row(line) {
                Some((iol, refraction, iol_span)) => {
                    self.state = TableState::Rows { next: next + 1 };
                    Some(TableRow {
                        index: next,
                        iol,
                        refraction,
                        iol_span,
                    })
                }
                None => {
                    self.state = TableState::Finished;
                    None
                }
            },
            TableState::Finished => None,
        }
    }
}

fn parse_row<'a>(line: &Line<'a>) -> Option<(f64, f64, &'a TextSpan)> {
    let iol_span = *line.spans.first()?;
    let iol = parse_number(&iol_span.text)?;
    let refraction = parse_number(line.text(1)?)?;
    Some((iol, refraction, iol_span))
}

/// Extract one lens sub-table.
///
/// The topmost line names the lens. Numeric rows after the `IOL (D)` /
/// `REF (D)` header become `iol_<n>`/`ref_<n>`; a bold IOL cell also sets
/// `iolbold`/`refbold` (the last bold row wins). Label lines (`"Label:"
/// "value"` or a single `"Label: value"` span) are recorded on every line.
pub fn extract_lens(
    region: &str,
    spans: &[&TextSpan],
    bold: &BoldMarker,
) -> Result<Lens, BiometryError> {
    let lines = group_lines_exact(spans);
    let name = lines
        .first()
        .and_then(|l| l.first_text())
        .ok_or_else(|| BiometryError::EmptyRegion {
            region: region.to_string(),
        })?
        .to_string();

    let mut fields = Fields::new();
    let mut table = LensTable::default();
    for line in &lines {
        if let Some(row) = table.feed(line) {
            fields.insert(format!("iol_{}", row.index), row.iol);
            fields.insert(format!("ref_{}", row.index), row.refraction);
            if bold.is_bold(row.iol_span) {
                fields.insert("iolbold", row.iol);
                fields.insert("refbold", row.refraction);
            }
        }

        if let Some((key, value)) = label_pair(line) {
            fields.insert(key, value);
        }
    }

    tracing::debug!(region, lens = %name, fields = fields.len(), "extracted lens table");
    Ok(Lens { name, fields })
}

fn label_pair<'a>(line: &Line<'a>) -> Option<(&'a str, &'a str)> {
    let first = line.first_text()?;
    if first.ends_with(':') {
        return colon_pair(line);
    }
    // e.g. "Emme. IOL: 21.34" printed as one span
    first.split_once(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    const REGULAR: u32 = 12;
    const BOLD: u32 = 20;

    fn row(y: f64, iol: &str, refraction: &str, flags: u32) -> Vec<TextSpan> {
        vec![
            TextSpan::new(iol, 335.0, y).with_style("Courier", flags),
            TextSpan::new(refraction, 380.0, y).with_style("Courier", flags),
        ]
    }

    fn sample_spans() -> Vec<TextSpan> {
        let mut spans = vec![
            TextSpan::new("SN60WF", 330.0, 320.0),
            TextSpan::new("A const: 118.7", 330.0, 332.0),
            TextSpan::new("IOL (D)", 335.0, 380.0),
            TextSpan::new("REF (D)", 380.0, 380.0),
        ];
        spans.extend(row(392.0, "17.0", "\u{2212}0.20", REGULAR));
        spans.extend(row(402.0, "17.5", "0.10", BOLD));
        spans
    }

    fn num(fields: &Fields, key: &str) -> f64 {
        fields.get(key).and_then(Value::as_f64).unwrap()
    }

    #[test]
    fn test_lens_table_with_bold_row() {
        let spans = sample_spans();
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lens = extract_lens("od_lens_1", &refs, &BoldMarker::default()).unwrap();

        assert_eq!(lens.name, "SN60WF");
        assert_eq!(num(&lens.fields, "iol_0"), 17.0);
        assert_eq!(num(&lens.fields, "ref_0"), -0.20);
        assert_eq!(num(&lens.fields, "iol_1"), 17.5);
        assert_eq!(num(&lens.fields, "ref_1"), 0.10);
        assert_eq!(num(&lens.fields, "iolbold"), 17.5);
        assert_eq!(num(&lens.fields, "refbold"), 0.10);
        assert_eq!(
            lens.fields.get("A const"),
            Some(&Value::Text("118.7".into()))
        );
    }

    #[test]
    fn test_empty_region_is_an_error() {
        let err = extract_lens("os_lens_3", &[], &BoldMarker::default()).unwrap_err();
        match err {
            BiometryError::EmptyRegion { region } => assert_eq!(region, "os_lens_3"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_row_ends_table() {
        let mut spans = sample_spans();
        spans.push(TextSpan::new("Emme. IOL: 21.34", 330.0, 420.0));
        spans.extend(row(430.0, "18.0", "0.50", REGULAR));
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lens = extract_lens("od_lens_1", &refs, &BoldMarker::default()).unwrap();

        assert!(lens.fields.contains_key("iol_1"));
        assert!(!lens.fields.contains_key("iol_2"));
        assert_eq!(
            lens.fields.get("Emme. IOL"),
            Some(&Value::Text("21.34".into()))
        );
    }

    #[test]
    fn test_last_bold_row_wins() {
        let mut spans = sample_spans();
        spans.extend(row(412.0, "18.0", "0.45", BOLD));
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lens = extract_lens("od_lens_1", &refs, &BoldMarker::default()).unwrap();
        assert_eq!(num(&lens.fields, "iolbold"), 18.0);
        assert_eq!(num(&lens.fields, "refbold"), 0.45);
    }

    #[test]
    fn test_no_bold_row_leaves_bold_fields_unset() {
        let mut spans = sample_spans();
        spans.retain(|s| s.flags != BOLD);
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lens = extract_lens("od_lens_1", &refs, &BoldMarker::default()).unwrap();
        assert!(!lens.fields.contains_key("iolbold"));
        assert!(!lens.fields.contains_key("refbold"));
    }

    #[test]
    fn test_split_label_spans() {
        let spans = vec![
            TextSpan::new("SA60AT", 60.0, 320.0),
            TextSpan::new("Emme. IOL:", 60.0, 332.0),
            TextSpan::new("21.34", 120.0, 332.0),
        ];
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lens = extract_lens("od_lens_2", &refs, &BoldMarker::default()).unwrap();
        assert_eq!(
            lens.fields.get("Emme. IOL"),
            Some(&Value::Text("21.34".into()))
        );
    }

    #[test]
    fn test_table_state_transitions() {
        let spans = [
            TextSpan::new("IOL (D)", 10.0, 1.0),
            TextSpan::new("REF (D)", 50.0, 1.0),
            TextSpan::new("17.0", 10.0, 2.0),
            TextSpan::new("0.1", 50.0, 2.0),
            TextSpan::new("---", 10.0, 3.0),
        ];
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lines = group_lines_exact(&refs);
        let mut table = LensTable::default();

        assert!(table.feed(&lines[0]).is_none());
        assert_eq!(table.state(), TableState::Rows { next: 0 });
        let row = table.feed(&lines[1]).unwrap();
        assert_eq!((row.index, row.iol, row.refraction), (0, 17.0, 0.1));
        assert!(table.feed(&lines[2]).is_none());
        assert_eq!(table.state(), TableState::Finished);
        assert!(table.feed(&lines[1]).is_none());
    }
}
