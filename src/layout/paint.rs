use crate::canvas::{Canvas, Point};
use crate::error::Error;

use super::{CellStyle, DrawOp, Layout, Stroke};

/// Puts the canvas back to unrotated drawing when a rotated group ends,
/// however it ends.
struct RotationReset<'c, C: Canvas + ?Sized> {
    canvas: &'c mut C,
}

impl<C: Canvas + ?Sized> Drop for RotationReset<'_, C> {
    fn drop(&mut self) {
        self.canvas.rotate(0.0, Point::new(0.0, 0.0));
    }
}

/// Replay a finished layout onto `canvas`, one canvas page per layout page.
pub fn paint(layout: &Layout, canvas: &mut dyn Canvas) -> Result<(), Error> {
    for page in &layout.pages {
        canvas.begin_page(page.width, page.height);
        paint_ops(&page.ops, layout, canvas)?;
        canvas.end_page();
    }
    Ok(())
}

fn apply_style<C: Canvas + ?Sized>(canvas: &mut C, style: &CellStyle) {
    canvas.set_font(style.font);
    canvas.set_text_color(style.color);
    if let Some(fill) = style.fill {
        canvas.set_fill_color(fill);
    }
}

fn apply_stroke<C: Canvas + ?Sized>(canvas: &mut C, stroke: &Stroke) {
    canvas.set_line_width(stroke.width);
    canvas.set_draw_color(stroke.color);
}

fn paint_ops<C: Canvas + ?Sized>(
    ops: &[DrawOp],
    layout: &Layout,
    canvas: &mut C,
) -> Result<(), Error> {
    for op in ops {
        match op {
            DrawOp::Cell {
                rect,
                text,
                align,
                style,
            } => {
                apply_style(canvas, style);
                canvas.cell(*rect, text, *align, style.fill.is_some());
            }
            DrawOp::TextBlock {
                rect,
                line_height,
                lines,
                align,
                style,
            } => {
                apply_style(canvas, style);
                canvas.multi_cell(*rect, *line_height, lines, *align, style.fill.is_some());
            }
            DrawOp::Line { from, to, stroke } => {
                apply_stroke(canvas, stroke);
                canvas.line(*from, *to);
            }
            DrawOp::Outline { rect, stroke } => {
                apply_stroke(canvas, stroke);
                canvas.rect(*rect);
            }
            DrawOp::Logo { rect } => match &layout.logo {
                Some(logo) => canvas.image(logo, *rect)?,
                None => log::warn!("layout places a logo but carries no image"),
            },
            DrawOp::Rotated { angle, origin, ops } => {
                canvas.rotate(*angle, *origin);
                let guard = RotationReset {
                    canvas: &mut *canvas,
                };
                paint_ops(ops, layout, &mut *guard.canvas)?;
            }
        }
    }
    Ok(())
}
