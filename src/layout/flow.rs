use crate::canvas::{Align, CELL_MARGIN, Font, Point, Rect, TextMeasure};

use super::geometry::AUTO_BREAK_MARGIN;
use super::wrap::wrap_text;
use super::{CellStyle, DrawOp, LayoutPlan, Page, Stroke};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlowState {
    NeedsHeader,
    RenderingSections,
    RenderingTotals,
    RenderingAnnex,
    Footer,
    Done,
}

/// Page flow controller: owns the cursor and the pages being filled.
///
/// The cursor is explicit state of the layout pass; nothing is read back from
/// a canvas. Cells placed while `auto_break` is on move to a fresh page when
/// they would reach into the bottom margin.
pub(super) struct Flow<'a> {
    pub(super) plan: &'a LayoutPlan,
    measure: &'a dyn TextMeasure,
    pages: Vec<Page>,
    groups: Vec<Vec<DrawOp>>,
    pub(super) x: f32,
    pub(super) y: f32,
    auto_break: bool,
    state: FlowState,
}

impl<'a> Flow<'a> {
    pub(super) fn new(plan: &'a LayoutPlan, measure: &'a dyn TextMeasure) -> Self {
        Self {
            plan,
            measure,
            pages: Vec::new(),
            groups: Vec::new(),
            x: plan.margins.left,
            y: plan.margins.top,
            auto_break: true,
            state: FlowState::NeedsHeader,
        }
    }

    pub(super) fn enter(&mut self, next: FlowState) {
        debug_assert!(next >= self.state, "flow moved back from {:?} to {next:?}", self.state);
        log::trace!("flow {:?} -> {next:?} (page {}, y={:.1})", self.state, self.page_number(), self.y);
        self.state = next;
    }

    pub(super) fn state(&self) -> FlowState {
        self.state
    }

    pub(super) fn open_page(&mut self) {
        self.pages.push(Page {
            number: self.pages.len() + 1,
            width: self.plan.page_width,
            height: self.plan.page_height,
            ops: Vec::new(),
        });
        self.x = self.plan.margins.left;
        self.y = self.plan.margins.top;
    }

    /// Close the current page and continue at the top of a new one. Only the
    /// first page carries header content, so nothing is drawn here.
    pub(super) fn break_page(&mut self, reason: &str) {
        log::debug!(
            "page break before {reason}: page {} y={:.1}",
            self.page_number(),
            self.y
        );
        self.open_page();
    }

    pub(super) fn page_number(&self) -> usize {
        self.pages.len()
    }

    pub(super) fn room_left(&self) -> f32 {
        self.plan.page_height - self.y
    }

    pub(super) fn left(&self) -> f32 {
        self.plan.margins.left
    }

    pub(super) fn right(&self) -> f32 {
        self.plan.page_width - self.plan.margins.right
    }

    pub(super) fn set_auto_break(&mut self, on: bool) {
        self.auto_break = on;
    }

    fn overflows(&self, h: f32) -> bool {
        self.auto_break && self.y + h > self.bottom_limit()
    }

    /// Move to a new page when a cell of height `h` would overflow; keeps x.
    fn break_if_needed(&mut self, h: f32, reason: &str) {
        if self.overflows(h) {
            let x = self.x;
            self.break_page(reason);
            self.x = x;
        }
    }

    /// Lowest y content may reach on a page.
    pub(super) fn bottom_limit(&self) -> f32 {
        self.plan.page_height - AUTO_BREAK_MARGIN
    }

    /// Would a cell of height `h` placed at the cursor spill into the bottom margin?
    pub(super) fn cell_would_overflow(&self, h: f32) -> bool {
        self.y + h > self.bottom_limit()
    }

    pub(super) fn at_page_top(&self) -> bool {
        self.y <= self.plan.margins.top
    }

    pub(super) fn string_width(&self, text: &str, font: Font) -> f32 {
        self.measure.string_width(text, font)
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(group) = self.groups.last_mut() {
            group.push(op);
        } else if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// A width of 0 extends to the right margin.
    fn resolve_width(&self, w: f32) -> f32 {
        if w == 0.0 { self.right() - self.x } else { w }
    }

    /// Place a cell at the cursor and move right past it.
    pub(super) fn cell(&mut self, w: f32, h: f32, text: &str, align: Align, style: CellStyle) {
        self.break_if_needed(h, "cell");
        let w = self.resolve_width(w);
        if !text.is_empty() || style.fill.is_some() {
            self.push(DrawOp::Cell {
                rect: Rect::new(self.x, self.y, w, h),
                text: text.to_string(),
                align,
                style,
            });
        }
        self.x += w;
    }

    /// Blank, unfilled space to the right.
    pub(super) fn skip(&mut self, w: f32) {
        self.x += w;
    }

    /// Back to the left margin, `h` further down.
    pub(super) fn ln(&mut self, h: f32) {
        self.x = self.left();
        self.y += h;
    }

    pub(super) fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Wrapped text at the cursor, `line_height` per line. Lines that would
    /// overflow continue on a new page. The cursor ends below the block at the
    /// left margin; returns the height used on the final page.
    pub(super) fn text_block(
        &mut self,
        w: f32,
        line_height: f32,
        text: &str,
        align: Align,
        style: CellStyle,
    ) -> f32 {
        let w = self.resolve_width(w);
        let lines = wrap_text(text, (w - 2.0 * CELL_MARGIN).max(0.0), style.font, self.measure);
        let x = self.x;
        let mut chunk: Vec<String> = Vec::new();
        let mut top = self.y;
        for line in lines {
            if self.overflows(line_height) {
                self.flush_block(x, top, w, line_height, &mut chunk, align, style);
                self.break_page("text line");
                top = self.y;
            }
            chunk.push(line);
            self.y += line_height;
        }
        self.flush_block(x, top, w, line_height, &mut chunk, align, style);
        self.x = self.left();
        self.y - top
    }

    #[allow(clippy::too_many_arguments)]
    fn flush_block(
        &mut self,
        x: f32,
        top: f32,
        w: f32,
        line_height: f32,
        chunk: &mut Vec<String>,
        align: Align,
        style: CellStyle,
    ) {
        if chunk.is_empty() {
            return;
        }
        let lines = std::mem::take(chunk);
        self.push(DrawOp::TextBlock {
            rect: Rect::new(x, top, w, lines.len() as f32 * line_height),
            line_height,
            lines,
            align,
            style,
        });
    }

    pub(super) fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(DrawOp::Line { from, to, stroke });
    }

    pub(super) fn outline(&mut self, rect: Rect, stroke: Stroke) {
        self.push(DrawOp::Outline { rect, stroke });
    }

    pub(super) fn logo(&mut self, rect: Rect) {
        self.push(DrawOp::Logo { rect });
    }

    /// Run `draw` without committing its ops; they are returned instead. The
    /// cursor moves as usual. Auto break must be off inside, since the ops
    /// are not on any page yet.
    pub(super) fn tentative<T>(&mut self, draw: impl FnOnce(&mut Self) -> T) -> (Vec<DrawOp>, T) {
        self.groups.push(Vec::new());
        let out = draw(self);
        (self.groups.pop().unwrap_or_default(), out)
    }

    pub(super) fn commit(&mut self, ops: Vec<DrawOp>) {
        for op in ops {
            self.push(op);
        }
    }

    /// Collect everything `draw` places into one rotated group.
    pub(super) fn rotated(&mut self, angle: f32, origin: Point, draw: impl FnOnce(&mut Self)) {
        let (ops, ()) = self.tentative(draw);
        self.push(DrawOp::Rotated { angle, origin, ops });
    }

    pub(super) fn finish(mut self) -> Vec<Page> {
        self.enter(FlowState::Done);
        self.pages
    }
}
