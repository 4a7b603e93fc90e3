/// Parse a report number such as `"17.5"`, `"-0.20"` or `"−0.20"`.
///
/// Surrounding whitespace is ignored and the typographic minus sign
/// (U+2212) is accepted in place of `-`. Returns `None` for anything else.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('\u{2212}') {
        s.replace('\u{2212}', "-").parse().ok()
    } else {
        s.parse().ok()
    }
}

/// Parse an axial length cell like `"22.50 mm"`; the unit is optional.
pub fn parse_millimetres(s: &str) -> Option<f64> {
    let s = s.trim();
    let number = s.strip_suffix("mm").unwrap_or(s);
    parse_number(number)
}

/// Like [`parse_number`] but rejects NaN and infinities.
pub fn parse_finite(s: &str) -> Option<f64> {
    parse_number(s).filter(|n| n.is_finite())
}
