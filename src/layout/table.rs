use crate::canvas::{Align, Font, Point};
use crate::locale::Label;
use crate::model::{Description, Document, Item, Section};

use super::flow::{Flow, FlowState};
use super::geometry::{
    GRID_LINE_HEIGHT, GRID_SPACER, ROW_HEIGHT, SUBLAYOUT_HEADER_GAP, SUBLAYOUT_PAD,
    actual_row_height, estimate_row_height, grid_cell_multiplier, grid_column_width,
};
use super::{CellStyle, Stroke, TEXT_DARK, TEXT_MUTED, TEXT_SUBTLE};

/// Every section in insertion order. Returns the cursor after the last
/// subtotal row, which anchors the badge.
pub(super) fn sections(flow: &mut Flow, doc: &Document) -> Point {
    debug_assert_eq!(flow.state(), FlowState::RenderingSections);
    for (index, section) in doc.sections.values().enumerate() {
        section_header(flow, section);

        if flow.plan.table_header_section == Some(index) {
            column_titles(flow, doc);
        } else {
            flow.ln(12.0);
        }

        for item in &section.items {
            item_row(flow, doc, item);
        }
        subtotal_row(flow, doc, section);
    }
    Point::new(flow.x, flow.y)
}

fn section_header(flow: &mut Flow, section: &Section) {
    let plan = flow.plan;
    let width = plan.printable_width();

    flow.ln(12.0);
    let heading = CellStyle::text(Font::bold(10.0), TEXT_DARK);
    flow.cell(width, 5.0, &section.name, Align::Left, heading);
    flow.ln(4.0);
    flow.cell(width, 5.0, &section.address, Align::Left, heading);

    let detail = CellStyle::text(Font::regular(8.0), TEXT_MUTED);
    flow.ln(4.0);
    flow.cell(width, 5.0, &format!("Supervisor: {}", section.supervisor), Align::Left, detail);
    if let Some(po) = &section.po_number {
        flow.ln(4.0);
        flow.cell(width, 5.0, &format!("PO#: {po}"), Align::Left, detail);
    }
    flow.ln(6.0);

    let y = flow.y;
    let left = flow.left();
    flow.line(
        Point::new(left, y),
        Point::new(left + width, y),
        Stroke {
            width: 0.4,
            color: plan.theme,
        },
    );
}

fn column_labels(flow: &Flow) -> Vec<Label> {
    let plan = flow.plan;
    let mut labels = vec![Label::Price, Label::TotalQty, Label::Qty];
    if plan.show_price_ot {
        labels.push(Label::PriceOt);
    }
    if plan.show_quantity_ot {
        labels.push(Label::QuantityOt);
    }
    labels.push(Label::Total);
    labels
}

fn column_titles(flow: &mut Flow, doc: &Document) {
    let plan = flow.plan;
    let lang = &doc.language;
    let style = CellStyle::text(Font::bold(9.0), TEXT_DARK);

    flow.skip(1.0);
    flow.cell(
        plan.first_col_width,
        10.0,
        &lang.get(Label::Product).to_uppercase(),
        Align::Left,
        style,
    );
    for label in column_labels(flow) {
        flow.skip(plan.spacing);
        flow.cell(plan.other_col_width, 10.0, &lang.get(label).to_uppercase(), Align::Center, style);
    }
    flow.ln(10.0);

    let y = flow.y;
    let (left, right) = (flow.left(), flow.right());
    flow.line(
        Point::new(left, y),
        Point::new(right, y),
        Stroke {
            width: 0.3,
            color: plan.theme,
        },
    );
    flow.ln(2.0);
}

/// One item row. The estimate decides the break before drawing; the row is
/// then drawn off-page and measured. A row that still reaches into the bottom
/// margin moves to a fresh page once. Only a row taller than a whole page is
/// split, its description continuing on the following pages.
fn item_row(flow: &mut Flow, doc: &Document, item: &Item) {
    let plan = flow.plan;
    flow.ln(1.0);

    let estimate = estimate_row_height(item);
    if estimate >= flow.room_left() || flow.cell_would_overflow(ROW_HEIGHT) {
        flow.break_page("item row");
    }
    flow.set_auto_break(false);

    let row_height = loop {
        let row_top = flow.y;
        let (ops, height) = flow.tentative(|f| draw_row(f, doc, item));
        if row_top + height <= flow.bottom_limit() {
            flow.commit(ops);
            break Some(height);
        }
        flow.set_xy(flow.left(), row_top);
        if !flow.at_page_top() {
            flow.break_page("item row taller than its estimate");
            continue;
        }
        split_row(flow, doc, item);
        break None;
    };

    flow.ln(plan.spacing);
    flow.set_auto_break(true);

    match row_height {
        Some(h) => log::debug!(
            "row {:?} on page {}: estimate {estimate:.1}mm, drawn {h:.1}mm",
            item.name,
            flow.page_number()
        ),
        None => log::debug!(
            "row {:?} split, ends on page {} (estimate {estimate:.1}mm)",
            item.name,
            flow.page_number()
        ),
    }
}

fn name_column_style(flow: &Flow) -> CellStyle {
    CellStyle::filled(Font::bold(8.0), TEXT_DARK, flow.plan.shade)
}

/// Draws the row at the cursor and leaves the cursor at its bottom-left.
/// Returns the drawn height.
fn draw_row(flow: &mut Flow, doc: &Document, item: &Item) -> f32 {
    let plan = flow.plan;
    let name_style = name_column_style(flow);
    let row_top = flow.y;
    flow.cell(1.0, ROW_HEIGHT, "", Align::Left, name_style);
    let name_x = flow.x;
    flow.cell(plan.first_col_width, ROW_HEIGHT, &item.name, Align::Left, name_style);

    let mut row_height = ROW_HEIGHT;
    if item.description.is_some() || !item.skills.is_empty() {
        let resume_x = flow.x;
        flow.set_xy(name_x, row_top + SUBLAYOUT_HEADER_GAP);
        describe(flow, item, name_x);

        let content_bottom = flow.y;
        row_height = actual_row_height(row_top, content_bottom);

        // Close the name column around the description.
        flow.set_xy(name_x - 1.0, row_top);
        flow.cell(1.0, row_height, "", Align::Left, name_style);
        flow.set_xy(name_x, content_bottom);
        flow.cell(plan.first_col_width, SUBLAYOUT_PAD, "", Align::Left, name_style);
        flow.set_xy(resume_x, row_top);
    }

    value_cells(flow, doc, item, row_height);
    flow.ln(row_height);
    row_height
}

/// A row taller than a page. The spacer and value columns run down to the
/// bottom margin of the first page; the description breaks like body text.
fn split_row(flow: &mut Flow, doc: &Document, item: &Item) {
    let plan = flow.plan;
    let name_style = name_column_style(flow);
    let row_top = flow.y;
    let first_page_height = flow.bottom_limit() - row_top;

    flow.cell(1.0, first_page_height, "", Align::Left, name_style);
    let name_x = flow.x;
    flow.cell(plan.first_col_width, ROW_HEIGHT, &item.name, Align::Left, name_style);
    value_cells(flow, doc, item, first_page_height);

    flow.set_xy(name_x, row_top + SUBLAYOUT_HEADER_GAP);
    flow.set_auto_break(true);
    describe(flow, item, name_x);
    flow.set_auto_break(false);

    let content_bottom = flow.y;
    flow.set_xy(name_x, content_bottom);
    flow.cell(plan.first_col_width, SUBLAYOUT_PAD, "", Align::Left, name_style);
    flow.set_xy(flow.left(), content_bottom + SUBLAYOUT_PAD);
}

/// Price, quantities, optional overtime columns and total, `height` tall,
/// starting at the cursor.
fn value_cells(flow: &mut Flow, doc: &Document, item: &Item, height: f32) {
    let plan = flow.plan;
    let value = CellStyle::filled(Font::regular(8.0), TEXT_DARK, plan.shade);
    let column = |flow: &mut Flow, text: &str| {
        flow.skip(plan.spacing);
        flow.cell(plan.other_col_width, height, text, Align::Center, value);
    };
    column(flow, &doc.format_price(item.price));
    column(flow, &item.total_quantity);
    column(flow, &item.quantity);
    if plan.show_price_ot {
        let price_ot = item
            .price_ot
            .as_ref()
            .map(|p| doc.format_amount(p))
            .unwrap_or_default();
        column(flow, &price_ot);
    }
    if plan.show_quantity_ot {
        column(flow, item.quantity_ot.as_deref().unwrap_or(""));
    }
    column(flow, &doc.format_price(item.total));
}

/// Skills and description under the item name, starting at the cursor.
fn describe(flow: &mut Flow, item: &Item, name_x: f32) {
    let plan = flow.plan;
    let shade = plan.shade;

    if !item.skills.is_empty() {
        let tasks = item
            .skills
            .iter()
            .map(|s| s.description.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        flow.text_block(
            plan.first_col_width,
            3.0,
            &format!("Performed Tasks:\n{tasks}"),
            Align::Left,
            CellStyle::filled(Font::regular(6.0), TEXT_SUBTLE, shade),
        );
        flow.x = name_x;
    }

    match &item.description {
        Some(Description::Text(text)) => {
            flow.text_block(
                plan.first_col_width,
                3.0,
                text,
                Align::Left,
                CellStyle::filled(Font::regular(7.0), TEXT_SUBTLE, shade),
            );
            flow.x = name_x;
        }
        Some(Description::Grid(rows)) => {
            let base = grid_column_width(plan.first_col_width, rows.first().map_or(1, Vec::len));
            let style = CellStyle::filled(Font::regular(6.0), TEXT_SUBTLE, shade);
            for row in rows {
                for (i, cell) in row.iter().enumerate() {
                    let w = base * grid_cell_multiplier(row.len(), i);
                    flow.cell(w, GRID_LINE_HEIGHT, cell, Align::Left, style);
                }
                flow.cell(GRID_SPACER, GRID_LINE_HEIGHT, "", Align::Left, style);
                flow.set_xy(name_x, flow.y + GRID_LINE_HEIGHT);
            }
        }
        None => {}
    }
}

fn subtotal_row(flow: &mut Flow, doc: &Document, section: &Section) {
    let plan = flow.plan;
    let style = CellStyle::filled(Font::bold(8.0), TEXT_DARK, plan.shade);

    flow.skip(plan.summary_label_x());
    flow.cell(1.0, ROW_HEIGHT, "", Align::Left, style);
    flow.cell(
        plan.other_col_width - 1.0,
        ROW_HEIGHT,
        doc.language.get(Label::Total),
        Align::Left,
        style,
    );
    flow.skip(plan.spacing);
    flow.cell(
        plan.other_col_width,
        ROW_HEIGHT,
        &doc.format_amount(&section.total),
        Align::Center,
        style,
    );
    flow.ln(ROW_HEIGHT);
    flow.ln(plan.spacing);
}
