use crate::extraction::TextSpan;
use std::cmp::Ordering;

/// Spans sharing one visual baseline, ordered left to right.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// Vertical coordinate of the span that opened the line.
    pub y: f64,
    pub spans: Vec<&'a TextSpan>,
}

impl<'a> Line<'a> {
    pub fn text(&self, index: usize) -> Option<&'a str> {
        self.spans.get(index).map(|s| s.text.as_str())
    }

    pub fn first_text(&self) -> Option<&'a str> {
        self.text(0)
    }

    /// True when the line starts with exactly these span texts.
    pub fn starts_with_texts(&self, texts: &[&str]) -> bool {
        self.spans.len() >= texts.len()
            && self.spans.iter().zip(texts).all(|(s, t)| s.text == *t)
    }

    pub fn joined(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn by_position(a: &&TextSpan, b: &&TextSpan) -> Ordering {
    a.origin
        .y
        .total_cmp(&b.origin.y)
        .then(a.origin.x.total_cmp(&b.origin.x))
        .then_with(|| a.text.cmp(&b.text))
}

fn by_x(a: &&TextSpan, b: &&TextSpan) -> Ordering {
    a.origin.x.total_cmp(&b.origin.x)
}

/// Cluster spans into lines by vertical proximity.
///
/// After sorting top to bottom, a new line starts whenever a span sits more
/// than `tolerance` below the span before it. Close spans chain, so a line
/// may drift further than `tolerance` from its first span.
pub fn group_lines_tolerant<'a>(spans: &[&'a TextSpan], tolerance: f64) -> Vec<Line<'a>> {
    let mut sorted: Vec<&TextSpan> = spans.to_vec();
    sorted.sort_by(by_position);

    let mut lines: Vec<Line<'a>> = Vec::new();
    let mut prev_y: Option<f64> = None;
    for span in sorted {
        let y = span.origin.y;
        match (prev_y, lines.last_mut()) {
            (Some(prev), Some(line)) if (y - prev).abs() <= tolerance => line.spans.push(span),
            _ => lines.push(Line {
                y,
                spans: vec![span],
            }),
        }
        prev_y = Some(y);
    }

    for line in &mut lines {
        line.spans.sort_by(by_x);
    }
    lines
}

/// Group spans whose vertical coordinates are exactly equal.
pub fn group_lines_exact<'a>(spans: &[&'a TextSpan]) -> Vec<Line<'a>> {
    let mut sorted: Vec<&TextSpan> = spans.to_vec();
    sorted.sort_by(by_position);

    let mut lines: Vec<Line<'a>> = Vec::new();
    for span in sorted {
        match lines.last_mut() {
            Some(line) if line.y == span.origin.y => line.spans.push(span),
            _ => lines.push(Line {
                y: span.origin.y,
                spans: vec![span],
            }),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.text.clone()).collect())
            .collect()
    }

    #[test]
    fn test_tolerant_groups_close_baselines() {
        let spans = vec![
            TextSpan::new("b", 50.0, 100.4),
            TextSpan::new("a", 10.0, 100.0),
            TextSpan::new("c", 10.0, 110.0),
        ];
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lines = group_lines_tolerant(&refs, 1.0);
        assert_eq!(texts(&lines), vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(lines[0].y, 100.0);
    }

    #[test]
    fn test_tolerant_boundary_is_inclusive() {
        let spans = vec![
            TextSpan::new("a", 10.0, 100.0),
            TextSpan::new("b", 20.0, 101.0),
            TextSpan::new("c", 30.0, 102.5),
        ];
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lines = group_lines_tolerant(&refs, 1.0);
        assert_eq!(texts(&lines), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_tolerant_chains_across_spans() {
        let spans = vec![
            TextSpan::new("a", 10.0, 100.0),
            TextSpan::new("b", 20.0, 100.8),
            TextSpan::new("c", 30.0, 101.6),
        ];
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lines = group_lines_tolerant(&refs, 1.0);
        assert_eq!(texts(&lines), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_grouping_ignores_input_order() {
        let spans = vec![
            TextSpan::new("K1:", 10.0, 200.3),
            TextSpan::new("43.25", 40.0, 200.0),
            TextSpan::new("AL", 10.0, 220.0),
            TextSpan::new("SNR", 60.0, 220.0),
        ];
        let forward: Vec<&TextSpan> = spans.iter().collect();
        let reversed: Vec<&TextSpan> = spans.iter().rev().collect();
        assert_eq!(
            texts(&group_lines_tolerant(&forward, 1.0)),
            texts(&group_lines_tolerant(&reversed, 1.0))
        );
        assert_eq!(
            texts(&group_lines_exact(&forward)),
            texts(&group_lines_exact(&reversed))
        );
    }

    #[test]
    fn test_exact_splits_nearby_baselines() {
        let spans = vec![
            TextSpan::new("IOL (D)", 10.0, 300.0),
            TextSpan::new("REF (D)", 60.0, 300.0),
            TextSpan::new("17.0", 10.0, 300.5),
        ];
        let refs: Vec<&TextSpan> = spans.iter().collect();
        let lines = group_lines_exact(&refs);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with_texts(&["IOL (D)", "REF (D)"]));
        assert_eq!(lines[1].first_text(), Some("17.0"));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_lines_tolerant(&[], 1.0).is_empty());
        assert!(group_lines_exact(&[]).is_empty());
    }
}
