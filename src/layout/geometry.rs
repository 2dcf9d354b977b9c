//! Pure column and row geometry. Everything here is in millimeters.

use crate::error::Error;
use crate::model::{Item, Margins};

pub const FIRST_COLUMN_WIDTH: f32 = 70.0;
/// First column once overtime prices claim a seventh column.
pub const FIRST_COLUMN_WIDTH_OT: f32 = 58.0;
pub const COLUMN_SPACING: f32 = 0.5;

/// Height of a single-line item row.
pub const ROW_HEIGHT: f32 = 8.0;
/// Fixed part of the row estimate: a single-line row plus breathing room.
pub const ROW_ESTIMATE_BASELINE: f32 = 20.0;
/// Distance between the name cell's top and its description sub-layout.
pub const SUBLAYOUT_HEADER_GAP: f32 = 8.0;
/// Bottom pad closing the name column under a description.
pub const SUBLAYOUT_PAD: f32 = 2.0;
pub const GRID_LINE_HEIGHT: f32 = 6.0;
pub const GRID_SPACER: f32 = 2.0;

/// Cells reaching below `page_height - AUTO_BREAK_MARGIN` move to a new page.
pub const AUTO_BREAK_MARGIN: f32 = 20.0;

const MM_PER_INCH: f32 = 25.4;
const SCREEN_DPI: f32 = 96.0;

/// Width shared by every column after the first:
/// `(page_width - left - right - first - columns * spacing) / (columns - 1)`.
pub fn other_column_width(
    page_width: f32,
    margins: Margins,
    first_col_width: f32,
    columns: usize,
    spacing: f32,
) -> Result<f32, Error> {
    if columns < 2 {
        return Err(Error::InvalidColumnConfiguration {
            columns,
            detail: "at least two columns are required".into(),
        });
    }
    let available =
        page_width - margins.left - margins.right - first_col_width - columns as f32 * spacing;
    let width = available / (columns - 1) as f32;
    if !width.is_finite() {
        return Err(Error::InvalidColumnConfiguration {
            columns,
            detail: format!("column width {width} is not finite"),
        });
    }
    Ok(width)
}

/// 3 units per started group of three skills, plus a 2-unit spacer.
pub fn skill_height_estimate(skill_count: usize) -> f32 {
    if skill_count == 0 {
        return 0.0;
    }
    skill_count.div_ceil(3) as f32 * 3.0 + 2.0
}

/// 12 units per description row plus a 2-unit spacer each.
pub fn description_height_estimate(rows: usize) -> f32 {
    rows as f32 * 12.0 + rows as f32 * 2.0
}

/// Coarse height used only to decide whether the row needs a fresh page.
/// The drawn height comes from [`actual_row_height`] once the row's
/// sub-layout has been placed; the two are deliberately not unified.
pub fn estimate_row_height(item: &Item) -> f32 {
    let skills = skill_height_estimate(item.skills.len());
    let description = item
        .description
        .as_ref()
        .map(|d| description_height_estimate(d.row_count()))
        .unwrap_or(0.0);
    skills + description + ROW_ESTIMATE_BASELINE
}

/// Row height measured from the sub-layout: displacement plus the closing pad.
pub fn actual_row_height(anchor_y: f32, content_bottom: f32) -> f32 {
    content_bottom - anchor_y + SUBLAYOUT_PAD
}

/// Three-cell rows give the third cell the extra width (0.75, 0.75, 1.5);
/// other rows are uniform. Row width stays `cells * base width` either way.
pub fn grid_cell_multiplier(cells_in_row: usize, index: usize) -> f32 {
    if cells_in_row == 3 {
        if index == 2 { 1.5 } else { 0.75 }
    } else {
        1.0
    }
}

/// Base cell width of a description grid, sized from its first row.
pub fn grid_column_width(first_col_width: f32, cells_in_first_row: usize) -> f32 {
    (first_col_width - GRID_SPACER) / cells_in_first_row.max(1) as f32
}

pub fn pixels_to_mm(px: f32) -> f32 {
    px * MM_PER_INCH / SCREEN_DPI
}

/// Fit an image into `max_w` × `max_h` pixels keeping its aspect ratio;
/// returns whole millimeters.
pub fn fit_logo(pixel_w: f32, pixel_h: f32, max_w: f32, max_h: f32) -> (f32, f32) {
    let scale = (max_w / pixel_w).min(max_h / pixel_h);
    (
        pixels_to_mm(scale * pixel_w).round(),
        pixels_to_mm(scale * pixel_h).round(),
    )
}
