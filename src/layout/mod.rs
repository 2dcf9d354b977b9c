//! Measure/layout pass: turns a [`Document`] into pages of absolutely
//! positioned [`DrawOp`]s. Painting onto a canvas is a separate pass
//! ([`paint`]), so a layout can be inspected, painted twice or thrown away.

mod flow;
pub mod geometry;
mod header;
mod paint;
mod table;
mod totals;
mod wrap;

pub use flow::FlowState;
pub use paint::paint;
pub use wrap::wrap_text;

use crate::canvas::{Align, Font, Point, Rect, TextMeasure};
use crate::error::Error;
use crate::model::{Document, Logo, Margins};

use flow::Flow;
use geometry::{FIRST_COLUMN_WIDTH, FIRST_COLUMN_WIDTH_OT, other_column_width};

pub(crate) const TEXT_DARK: [u8; 3] = [50, 50, 50];
pub(crate) const TEXT_MUTED: [u8; 3] = [100, 100, 100];
pub(crate) const TEXT_SUBTLE: [u8; 3] = [120, 120, 120];
pub(crate) const TEXT_BODY: [u8; 3] = [80, 80, 80];
pub(crate) const WHITE: [u8; 3] = [255, 255, 255];
pub(crate) const BLACK: [u8; 3] = [0, 0, 0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStyle {
    pub font: Font,
    pub color: [u8; 3],
    pub fill: Option<[u8; 3]>,
}

impl CellStyle {
    pub fn text(font: Font, color: [u8; 3]) -> Self {
        Self {
            font,
            color,
            fill: None,
        }
    }

    pub fn filled(font: Font, color: [u8; 3], fill: [u8; 3]) -> Self {
        Self {
            font,
            color,
            fill: Some(fill),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: [u8; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Cell {
        rect: Rect,
        text: String,
        align: Align,
        style: CellStyle,
    },
    /// Pre-wrapped text; `rect.h` is `lines.len() * line_height`.
    TextBlock {
        rect: Rect,
        line_height: f32,
        lines: Vec<String>,
        align: Align,
        style: CellStyle,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Outline {
        rect: Rect,
        stroke: Stroke,
    },
    Logo {
        rect: Rect,
    },
    /// Drawn rotated by `angle` degrees around `origin`; the rotation ends with the group.
    Rotated {
        angle: f32,
        origin: Point,
        ops: Vec<DrawOp>,
    },
}

impl DrawOp {
    /// Text carried by this op (lines of a block joined by `\n`).
    pub fn text(&self) -> Option<String> {
        match self {
            DrawOp::Cell { text, .. } => Some(text.clone()),
            DrawOp::TextBlock { lines, .. } => Some(lines.join("\n")),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Page {
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Every op on the page, rotated groups flattened in drawing order.
    pub fn flat_ops(&self) -> Vec<&DrawOp> {
        fn walk<'a>(ops: &'a [DrawOp], out: &mut Vec<&'a DrawOp>) {
            for op in ops {
                out.push(op);
                if let DrawOp::Rotated { ops, .. } = op {
                    walk(ops, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.ops, &mut out);
        out
    }
}

#[derive(Clone)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub logo: Option<Logo>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Table geometry and header policy, derived once from the finished document.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    pub columns: usize,
    pub first_col_width: f32,
    pub other_col_width: f32,
    pub spacing: f32,
    pub show_price_ot: bool,
    pub show_quantity_ot: bool,
    /// Index of the only section that carries the column titles.
    pub table_header_section: Option<usize>,
    pub theme: [u8; 3],
    pub shade: [u8; 3],
}

impl LayoutPlan {
    pub fn derive(doc: &Document) -> Result<Self, Error> {
        let (page_width, page_height) = doc.page_size.dimensions();
        let show_price_ot = doc.has_overtime_price();
        let show_quantity_ot = show_price_ot || doc.has_overtime_quantity();
        let columns = doc.column_count();
        let first_col_width = if show_price_ot {
            FIRST_COLUMN_WIDTH_OT
        } else {
            FIRST_COLUMN_WIDTH
        };
        let spacing = doc.column_spacing.max(0.0);
        let other_col_width =
            other_column_width(page_width, doc.margins, first_col_width, columns, spacing)?;
        let shade = ((1.0 - doc.column_opacity) * 255.0).round() as u8;
        Ok(Self {
            page_width,
            page_height,
            margins: doc.margins,
            columns,
            first_col_width,
            other_col_width,
            spacing,
            show_price_ot,
            show_quantity_ot,
            table_header_section: if doc.sections.is_empty() { None } else { Some(0) },
            theme: doc.color,
            shade: [shade; 3],
        })
    }

    pub fn printable_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }

    /// Offset of the value column shared by subtotal and totals rows, from the left margin.
    pub(crate) fn summary_label_x(&self) -> f32 {
        1.0 + self.first_col_width
            + (self.columns - 3) as f32 * (self.other_col_width + self.spacing)
            + self.spacing
    }
}

/// Lay the whole document out: first-page header, sections, totals, badge,
/// annex text, then the footers once the page count is known.
pub fn build(doc: &Document, measure: &dyn TextMeasure) -> Result<Layout, Error> {
    let plan = LayoutPlan::derive(doc)?;
    log::debug!(
        "layout plan: {} columns, first={:.1}mm other={:.2}mm",
        plan.columns,
        plan.first_col_width,
        plan.other_col_width
    );

    let mut flow = Flow::new(&plan, measure);
    flow.open_page();
    header::first_page(&mut flow, doc);

    flow.enter(FlowState::RenderingSections);
    let badge_anchor = table::sections(&mut flow, doc);

    flow.enter(FlowState::RenderingTotals);
    totals::grand_totals(&mut flow, doc);
    if let Some(badge) = &doc.badge {
        totals::badge(&mut flow, badge, badge_anchor);
    }

    flow.enter(FlowState::RenderingAnnex);
    totals::text_blocks(&mut flow, doc);

    flow.enter(FlowState::Footer);
    let mut pages = flow.finish();
    header::footers(&mut pages, doc, &plan);

    Ok(Layout {
        pages,
        logo: doc.logo.clone(),
    })
}
