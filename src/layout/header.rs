use crate::canvas::{Align, Font, Point, Rect};
use crate::locale::Label;
use crate::model::Document;

use super::flow::Flow;
use super::{BLACK, CellStyle, DrawOp, LayoutPlan, Page, Stroke, TEXT_DARK, TEXT_MUTED};

const LINE_H: f32 = 5.0;
const INFO_LABEL_WIDTH: f32 = 47.0;
/// Room kept right of the info labels for their values.
const INFO_VALUE_RESERVE: f32 = 50.0;

fn info_rows(doc: &Document) -> Vec<(Label, String)> {
    let mut rows = Vec::new();
    let mut push = |label: Label, value: &Option<String>| {
        if let Some(v) = value {
            rows.push((label, v.clone()));
        }
    };
    push(Label::Number, &doc.reference);
    push(Label::PoNumber, &doc.po_number);
    push(Label::Date, &doc.date);
    push(Label::Time, &doc.time);
    push(Label::Due, &doc.due);
    push(Label::PaymentDate, &doc.payment_date);
    let period = doc.period.as_ref().map(|(s, e)| format!("{s} - {e}"));
    push(Label::Period, &period);
    push(Label::PaymentMethod, &doc.payment_method);
    rows
}

/// Logo, title, address, the info grid and the from/to parties. Only the
/// first page has a header.
pub(super) fn first_page(flow: &mut Flow, doc: &Document) {
    let plan = flow.plan;
    let lang = &doc.language;
    let left = plan.margins.left;
    let top = plan.margins.top;

    let logo_bottom = match &doc.logo {
        Some(logo) => {
            flow.logo(Rect::new(left, top, logo.display_width, logo.display_height));
            top + logo.display_height
        }
        None => 0.0,
    };

    if let Some(title) = &doc.title {
        flow.cell(0.0, LINE_H, &title.to_uppercase(), Align::Right, CellStyle::text(Font::bold(20.0), BLACK));
        flow.ln(LINE_H);
    }
    flow.ln(2.0);

    if let Some(address) = &doc.address {
        flow.cell(0.0, LINE_H, address, Align::Right, CellStyle::text(Font::regular(9.0), TEXT_DARK));
        flow.ln(LINE_H);
    }
    flow.ln(3.0);

    let label_font = Font::bold(9.0);
    let widest = [Label::Number, Label::Date, Label::Due]
        .into_iter()
        .map(|l| flow.string_width(lang.get(l), label_font))
        .fold(0.0f32, f32::max);
    let label_x = plan.printable_width() - widest - INFO_VALUE_RESERVE;

    for (label, value) in info_rows(doc) {
        flow.skip(label_x);
        let caption = format!("{}:", lang.get(label).to_uppercase());
        flow.cell(INFO_LABEL_WIDTH, LINE_H, &caption, Align::Left, CellStyle::text(label_font, plan.theme));
        flow.cell(0.0, LINE_H, &value, Align::Right, CellStyle::text(Font::regular(9.0), TEXT_DARK));
        flow.ln(LINE_H);
    }

    if logo_bottom > flow.y {
        flow.set_xy(left, logo_bottom + 5.0);
    } else {
        flow.set_xy(left, flow.y + 10.0);
    }
    flow.ln(5.0);

    if !doc.display_from_to {
        flow.ln(-10.0);
        return;
    }

    let (from_label, to_label, from, to) = if doc.swap_from_to {
        (lang.get(Label::To), lang.get(Label::From), &doc.to, &doc.from)
    } else {
        (lang.get(Label::From), lang.get(Label::To), &doc.from, &doc.to)
    };
    let half = plan.printable_width() / 2.0;

    let caption = CellStyle::text(Font::bold(10.0), plan.theme);
    flow.cell(half, LINE_H, &from_label.to_uppercase(), Align::Left, caption);
    flow.cell(0.0, LINE_H, &to_label.to_uppercase(), Align::Left, caption);
    flow.ln(7.0);

    let rule = Stroke {
        width: 0.4,
        color: plan.theme,
    };
    let y = flow.y;
    flow.line(Point::new(left, y), Point::new(left + half - 10.0, y), rule);
    flow.line(Point::new(left + half, y), Point::new(left + 2.0 * half, y), rule);
    flow.ln(5.0);

    let line_at = |lines: &[String], i: usize| lines.get(i).cloned().unwrap_or_default();
    let first = CellStyle::text(Font::bold(10.0), TEXT_DARK);
    flow.cell(half, LINE_H, &line_at(from, 0), Align::Left, first);
    flow.cell(0.0, LINE_H, &line_at(to, 0), Align::Left, first);
    flow.ln(7.0);

    let rest = CellStyle::text(Font::regular(8.0), TEXT_MUTED);
    for i in 1..from.len().max(to.len()) {
        flow.cell(half, LINE_H, &line_at(from, i), Align::Left, rest);
        flow.cell(0.0, LINE_H, &line_at(to, i), Align::Left, rest);
        flow.ln(LINE_H);
    }
    flow.ln(-1.0);
}

/// Footnote and "Page X of Y" on every page, once the page count is final.
pub(super) fn footers(pages: &mut [Page], doc: &Document, plan: &LayoutPlan) {
    let total = pages.len();
    let style = CellStyle::text(Font::regular(8.0), TEXT_DARK);
    let rect = Rect::new(
        plan.margins.left,
        plan.page_height - plan.margins.top,
        plan.printable_width(),
        10.0,
    );
    for page in pages.iter_mut() {
        if let Some(note) = &doc.footnote {
            page.ops.push(DrawOp::Cell {
                rect,
                text: note.clone(),
                align: Align::Left,
                style,
            });
        }
        page.ops.push(DrawOp::Cell {
            rect,
            text: doc.language.page_of(page.number, total),
            align: Align::Right,
            style,
        });
    }
}
