use crate::canvas::{Align, Font, Point, Rect};
use crate::locale::Label;
use crate::model::{Document, TextBlock};

use super::flow::Flow;
use super::geometry::ROW_HEIGHT;
use super::{CellStyle, Stroke, TEXT_BODY, TEXT_DARK, WHITE};

const BADGE_ANGLE: f32 = 10.0;
const BADGE_HEIGHT: f32 = 10.0;
/// Badge origin below its anchor.
const BADGE_DROP: f32 = 15.0;

/// Grand-total caption on the right half, then one row per total. Colored
/// totals use the theme as fill with white text.
pub(super) fn grand_totals(flow: &mut Flow, doc: &Document) {
    let plan = flow.plan;
    let half = plan.printable_width() / 2.0;
    let left = flow.left();

    flow.ln(5.0);
    flow.skip(half);
    flow.cell(
        0.0,
        5.0,
        doc.language.get(Label::GrandTotal),
        Align::Left,
        CellStyle::text(Font::bold(10.0), TEXT_DARK),
    );
    flow.ln(7.0);
    let y = flow.y;
    flow.line(
        Point::new(left + half, y),
        Point::new(left + 2.0 * half, y),
        Stroke {
            width: 0.4,
            color: plan.theme,
        },
    );
    flow.ln(7.0);

    for total in &doc.totals {
        let style = if total.colored {
            CellStyle::filled(Font::bold(8.0), WHITE, plan.theme)
        } else {
            CellStyle::filled(Font::bold(8.0), TEXT_DARK, plan.shade)
        };
        flow.skip(plan.summary_label_x());
        flow.cell(1.0, ROW_HEIGHT, "", Align::Left, style);
        flow.cell(plan.other_col_width - 1.0, ROW_HEIGHT, &total.name, Align::Left, style);
        flow.skip(plan.spacing);
        flow.cell(
            plan.other_col_width,
            ROW_HEIGHT,
            &doc.format_amount(&total.value),
            Align::Center,
            style,
        );
        flow.ln(ROW_HEIGHT);
        flow.ln(plan.spacing);
    }

    flow.ln(if doc.totals.is_empty() { 5.0 } else { ROW_HEIGHT });
    flow.ln(3.0);
}

/// Outlined, rotated badge 15mm below `anchor`. The cursor is restored when
/// the totals already reach well below the badge, otherwise it moves past it.
pub(super) fn badge(flow: &mut Flow, text: &str, anchor: Point) {
    let plan = flow.plan;
    let label = format!(" {} ", text.to_uppercase());
    let font = Font::bold(15.0);
    let (resume_x, resume_y) = (flow.x, flow.y);

    let origin = Point::new(anchor.x, anchor.y + BADGE_DROP);
    let width = flow.string_width(&label, font) + 2.0;
    let theme = plan.theme;

    flow.set_auto_break(false);
    flow.set_xy(origin.x, origin.y);
    flow.rotated(BADGE_ANGLE, origin, |f| {
        f.outline(
            Rect::new(origin.x, origin.y, width, BADGE_HEIGHT),
            Stroke {
                width: 0.4,
                color: theme,
            },
        );
        f.cell(width, BADGE_HEIGHT, &label, Align::Left, CellStyle::text(font, theme));
    });
    flow.set_auto_break(true);

    if resume_y > origin.y + 20.0 {
        flow.set_xy(resume_x, resume_y);
    } else {
        flow.set_xy(flow.left(), origin.y);
        flow.ln(18.0);
    }
}

/// Titles and paragraphs appended after the totals, in insertion order.
pub(super) fn text_blocks(flow: &mut Flow, doc: &Document) {
    let theme = flow.plan.theme;
    for block in &doc.texts {
        match block {
            TextBlock::Title(title) => {
                flow.cell(
                    0.0,
                    10.0,
                    &title.to_uppercase(),
                    Align::Left,
                    CellStyle::text(Font::bold(9.0), TEXT_DARK),
                );
                flow.ln(10.0);
                let y = flow.y;
                let (left, right) = (flow.left(), flow.right());
                flow.line(
                    Point::new(left, y),
                    Point::new(right, y),
                    Stroke {
                        width: 0.3,
                        color: theme,
                    },
                );
                flow.ln(4.0);
            }
            TextBlock::Paragraph(text) => {
                flow.text_block(
                    0.0,
                    4.0,
                    text,
                    Align::Left,
                    CellStyle::text(Font::regular(8.0), TEXT_BODY),
                );
                flow.ln(4.0);
            }
        }
    }
}
