pub mod lines;
pub mod region;
pub mod tables;

pub use lines::{group_lines_exact, group_lines_tolerant, Line};
pub use region::{select_spans, Rect, Region, RegionTable};
