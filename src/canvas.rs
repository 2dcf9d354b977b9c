//! The drawing capability the layout engine paints onto.
//!
//! All coordinates are millimeters from the top-left corner of the page; font
//! sizes are points. Implementations convert to their own device space.

use crate::error::Error;
use crate::model::Logo;

pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Inner horizontal padding of a cell, the gap between its edge and its text.
pub const CELL_MARGIN: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub bold: bool,
    pub size: f32, // points
}

impl Font {
    pub fn regular(size: f32) -> Self {
        Self { bold: false, size }
    }

    pub fn bold(size: f32) -> Self {
        Self { bold: true, size }
    }

    /// Font size in millimeters.
    pub fn size_mm(&self) -> f32 {
        self.size * MM_PER_PT
    }
}

pub trait TextMeasure {
    /// Width of `text` in millimeters when set in `font`.
    fn string_width(&self, text: &str, font: Font) -> f32;
}

pub trait Canvas: TextMeasure {
    /// Open a new page of the given size; the page is current until `end_page`.
    fn begin_page(&mut self, width: f32, height: f32);
    fn end_page(&mut self);
    /// Pages opened so far.
    fn page_count(&self) -> usize;

    fn set_font(&mut self, font: Font);
    fn set_text_color(&mut self, color: [u8; 3]);
    fn set_fill_color(&mut self, color: [u8; 3]);
    fn set_draw_color(&mut self, color: [u8; 3]);
    fn set_line_width(&mut self, width: f32);

    /// A box with single-line text, vertically centered, padded by
    /// [`CELL_MARGIN`] on the aligned side. `fill` paints the box with the fill color.
    fn cell(&mut self, rect: Rect, text: &str, align: Align, fill: bool);

    /// Pre-wrapped lines stacked from `rect.y`, each `line_height` tall.
    fn multi_cell(&mut self, rect: Rect, line_height: f32, lines: &[String], align: Align, fill: bool) {
        for (i, line) in lines.iter().enumerate() {
            let row = Rect::new(rect.x, rect.y + i as f32 * line_height, rect.w, line_height);
            self.cell(row, line, align, fill);
        }
    }

    fn line(&mut self, from: Point, to: Point);
    /// Stroke a rectangle outline with the draw color.
    fn rect(&mut self, rect: Rect);

    /// Rotate subsequent drawing by `angle` degrees counter-clockwise around
    /// `origin`. An angle of 0 resets to the unrotated state.
    fn rotate(&mut self, angle: f32, origin: Point);
    fn rotation(&self) -> f32;

    fn image(&mut self, image: &Logo, rect: Rect) -> Result<(), Error>;

    /// Emit the final document bytes. `title` becomes the document title.
    fn finish(&mut self, title: &str) -> Result<Vec<u8>, Error>;
}
