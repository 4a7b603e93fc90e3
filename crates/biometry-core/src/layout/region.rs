use crate::extraction::{Point, TextSpan};

/// Axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Rect { x0, y0, x1, y1 }
    }

    /// Strict interior test; a point on any edge is outside.
    pub fn contains(&self, p: Point) -> bool {
        self.x0 < p.x && p.x < self.x1 && self.y0 < p.y && p.y < self.y1
    }

    pub fn translated_x(&self, dx: f64) -> Rect {
        Rect::new(self.x0 + dx, self.y0, self.x1 + dx, self.y1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub rect: Rect,
}

/// The fixed set of named regions for one report layout.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    pub fn new() -> Self {
        RegionTable::default()
    }

    pub fn with(mut self, name: &str, rect: Rect) -> Self {
        self.regions.push(Region {
            name: name.to_string(),
            rect,
        });
        self
    }

    /// Add an `os_*` copy of every `od_*` region, shifted right by `dx`.
    pub fn mirrored_od_to_os(mut self, dx: f64) -> Self {
        let mirrored: Vec<Region> = self
            .regions
            .iter()
            .filter_map(|r| {
                r.name.strip_prefix("od_").map(|rest| Region {
                    name: format!("os_{rest}"),
                    rect: r.rect.translated_x(dx),
                })
            })
            .collect();
        self.regions.extend(mirrored);
        self
    }

    pub fn rect(&self, name: &str) -> Option<Rect> {
        self.regions.iter().find(|r| r.name == name).map(|r| r.rect)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Spans of `name`, or an empty set when the table has no such region.
    pub fn select<'a>(&self, name: &str, spans: &'a [TextSpan]) -> Vec<&'a TextSpan> {
        match self.rect(name) {
            Some(rect) => select_spans(spans, &rect),
            None => Vec::new(),
        }
    }
}

/// Spans whose origin lies strictly inside `rect`. Output keeps input order.
pub fn select_spans<'a>(spans: &'a [TextSpan], rect: &Rect) -> Vec<&'a TextSpan> {
    spans.iter().filter(|s| rect.contains(s.origin)).collect()
}
