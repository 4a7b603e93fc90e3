use crate::extraction::TextSpan;
use crate::layout::{group_lines_exact, Line};
use crate::model::Fields;

/// Extract `Label:` / value pairs from a header block.
///
/// A line contributes when it has at least two spans and the first ends in
/// a colon; the colon is dropped from the key and the second span is the
/// value. Any other line is skipped.
pub fn extract_key_values(spans: &[&TextSpan]) -> Fields {
    let mut fields = Fields::new();
    for line in group_lines_exact(spans) {
        if let Some((key, value)) = colon_pair(&line) {
            fields.insert(key, value);
        }
    }
    fields
}

/// `["Label:", "value", ...]` -> `("Label", "value")`.
pub(crate) fn colon_pair<'a>(line: &Line<'a>) -> Option<(&'a str, &'a str)> {
    let key = line.first_text()?.strip_suffix(':')?;
    let value = line.text(1)?;
    Some((key, value))
}
