//! Page region coordinates for each supported report layout.
//!
//! All values are in PDF points measured from the top-left page corner, as
//! printed by the IOLMaster. Right-eye (OD) regions sit in the left column;
//! left-eye (OS) regions are the same rectangles shifted by [`OS_OFFSET_X`].

use crate::layout::region::{Rect, RegionTable};

const LEFT_MARGIN: f64 = 54.0;
const OD_COLUMN_RIGHT: f64 = 313.1999816894531;
const OS_COLUMN_LEFT: f64 = 316.0799865722656;

/// Horizontal distance between the OD and OS columns.
pub const OS_OFFSET_X: f64 = OS_COLUMN_LEFT - LEFT_MARGIN;

const IOL_HEADER_TOP: f64 = 56.52001953125;
const IOL_HEADER_BOTTOM: f64 = 140.0400390625;
const IOL_EYE_HEADER_TOP: f64 = 193.79998779296875;
const IOL_LENS_TOP: f64 = 310.6800231933594;

/// Lens sub-tables sit in a 2x2 grid under each eye header.
fn lens_grid(table: RegionTable, split_x: f64, middle_y: f64, bottom_y: f64) -> RegionTable {
    table
        .with("od_lens_1", Rect::new(LEFT_MARGIN, IOL_LENS_TOP, split_x, middle_y))
        .with("od_lens_2", Rect::new(split_x, IOL_LENS_TOP, OD_COLUMN_RIGHT, middle_y))
        .with("od_lens_3", Rect::new(LEFT_MARGIN, middle_y, split_x, bottom_y))
        .with("od_lens_4", Rect::new(split_x, middle_y, OD_COLUMN_RIGHT, bottom_y))
}

pub fn iol_haigis() -> RegionTable {
    let midline = 0.5 * (OD_COLUMN_RIGHT + OS_COLUMN_LEFT);
    let quarter = LEFT_MARGIN + (OD_COLUMN_RIGHT - LEFT_MARGIN) / 2.0;
    let table = RegionTable::new()
        .with(
            "header_1",
            Rect::new(LEFT_MARGIN, IOL_HEADER_TOP, midline, IOL_HEADER_BOTTOM),
        )
        .with(
            "header_2",
            Rect::new(midline, IOL_HEADER_TOP, 576.0, IOL_HEADER_BOTTOM),
        )
        .with(
            "od_header",
            Rect::new(LEFT_MARGIN, IOL_EYE_HEADER_TOP, OD_COLUMN_RIGHT, IOL_LENS_TOP),
        );
    lens_grid(table, quarter, 483.8399963378906, 657.0).mirrored_od_to_os(OS_OFFSET_X)
}

/// Shared by the Holladay 1 and SRK/T formula sheets.
pub fn iol_holladay_srkt() -> RegionTable {
    let midline = 314.6399841308594;
    let table = RegionTable::new()
        .with(
            "header_1",
            Rect::new(LEFT_MARGIN, IOL_HEADER_TOP, midline, IOL_HEADER_BOTTOM),
        )
        .with(
            "header_2",
            Rect::new(midline, IOL_HEADER_TOP, 612.0, IOL_HEADER_BOTTOM),
        )
        .with(
            "od_header",
            Rect::new(LEFT_MARGIN, IOL_EYE_HEADER_TOP, OD_COLUMN_RIGHT, IOL_LENS_TOP),
        );
    lens_grid(table, 183.59999084472656, 458.6400146484375, 606.5999755859375)
        .mirrored_od_to_os(OS_OFFSET_X)
}

pub fn mmt_full() -> RegionTable {
    let midline = (LEFT_MARGIN + 576.0) / 2.0;
    let header_bottom = 135.1199951171875;
    let top = 259.44000244140625;
    let bottom = 653.8800048828125;
    RegionTable::new()
        .with(
            "header_1",
            Rect::new(LEFT_MARGIN, LEFT_MARGIN, midline, header_bottom),
        )
        .with(
            "header_2",
            Rect::new(midline, LEFT_MARGIN, 576.0, header_bottom),
        )
        .with(
            "od_measurements",
            Rect::new(LEFT_MARGIN, top, OD_COLUMN_RIGHT, bottom),
        )
        .with(
            "os_measurements",
            Rect::new(OS_COLUMN_LEFT, top, 576.0, bottom),
        )
}
