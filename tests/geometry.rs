mod common;

use invoice_pdf::layout::geometry::{
    COLUMN_SPACING, FIRST_COLUMN_WIDTH, FIRST_COLUMN_WIDTH_OT, actual_row_height,
    estimate_row_height, fit_logo, grid_cell_multiplier, grid_column_width, other_column_width,
    pixels_to_mm, skill_height_estimate,
};
use invoice_pdf::{Error, LayoutPlan, Margins, Skill};

const A4_WIDTH: f32 = 210.0;

fn margins() -> Margins {
    Margins {
        left: 15.0,
        top: 15.0,
        right: 15.0,
    }
}

#[test]
fn columns_fill_printable_width() {
    let printable = A4_WIDTH - 30.0;
    for (columns, first) in [(5, FIRST_COLUMN_WIDTH), (6, FIRST_COLUMN_WIDTH), (7, FIRST_COLUMN_WIDTH_OT)] {
        let other = other_column_width(A4_WIDTH, margins(), first, columns, COLUMN_SPACING)
            .expect("valid columns");
        let used = other * (columns - 1) as f32 + first + columns as f32 * COLUMN_SPACING;
        assert!(
            (used - printable).abs() < 1e-3,
            "{columns} columns use {used}mm of {printable}mm"
        );
    }
}

#[test]
fn five_column_width() {
    let other = other_column_width(A4_WIDTH, margins(), 70.0, 5, 0.5).expect("valid columns");
    assert!((other - 26.875).abs() < 1e-4, "got {other}");
}

#[test]
fn fewer_than_two_columns_is_rejected() {
    for columns in [0, 1] {
        let err = other_column_width(A4_WIDTH, margins(), 70.0, columns, 0.5).unwrap_err();
        assert!(
            matches!(err, Error::InvalidColumnConfiguration { columns: c, .. } if c == columns),
            "unexpected error {err:?}"
        );
    }
}

#[test]
fn skill_estimate_grows_per_started_group_of_three() {
    assert_eq!(skill_height_estimate(0), 0.0);
    assert_eq!(skill_height_estimate(1), 5.0);
    assert_eq!(skill_height_estimate(3), 5.0);
    assert_eq!(skill_height_estimate(4), 8.0);
    assert_eq!(skill_height_estimate(7), 11.0);
}

#[test]
fn row_estimate_is_monotonic() {
    let mut previous = 0.0;
    for skills in 0..10 {
        let item = common::simple_item("Welding")
            .with_skills((0..skills).map(|i| Skill::new(format!("task {i}"))).collect());
        let estimate = estimate_row_height(&item);
        assert!(estimate >= previous, "{skills} skills: {estimate} < {previous}");
        previous = estimate;
    }

    let mut previous = 0.0;
    for rows in 0..10 {
        let mut item = common::simple_item("Inspection");
        if rows > 0 {
            item = item.with_grid_description(common::grid("r", rows));
        }
        let estimate = estimate_row_height(&item);
        assert!(estimate >= previous, "{rows} rows: {estimate} < {previous}");
        previous = estimate;
    }
}

#[test]
fn row_estimate_components() {
    assert_eq!(estimate_row_height(&common::simple_item("Plain")), 20.0);

    let text = common::simple_item("Text").with_text_description("one line");
    assert_eq!(estimate_row_height(&text), 20.0 + 14.0);

    let both = common::simple_item("Both")
        .with_grid_description(common::grid("g", 3))
        .with_skills(vec![Skill::new("a"), Skill::new("b")]);
    assert_eq!(estimate_row_height(&both), 5.0 + 3.0 * 14.0 + 20.0);
}

#[test]
fn actual_height_adds_closing_pad() {
    assert_eq!(actual_row_height(100.0, 126.0), 28.0);
}

#[test]
fn three_cell_grid_rows_widen_the_last_cell() {
    let widths: Vec<f32> = (0..3).map(|i| grid_cell_multiplier(3, i)).collect();
    assert_eq!(widths, vec![0.75, 0.75, 1.5]);
    assert_eq!(widths.iter().sum::<f32>(), 3.0);

    for cells in [1, 2, 4, 5] {
        assert!((0..cells).all(|i| grid_cell_multiplier(cells, i) == 1.0));
    }
}

#[test]
fn grid_columns_share_the_first_column() {
    assert_eq!(grid_column_width(70.0, 2), 34.0);
    assert_eq!(grid_column_width(58.0, 4), 14.0);
    // An empty first row is treated as one cell wide.
    assert_eq!(grid_column_width(70.0, 0), 68.0);
}

#[test]
fn logo_fits_box_keeping_aspect() {
    // 460x130 px into 230x130: width-bound, scale 0.5.
    let (w, h) = fit_logo(460.0, 130.0, 230.0, 130.0);
    assert_eq!(w, pixels_to_mm(230.0).round());
    assert_eq!(h, pixels_to_mm(65.0).round());

    // A tall image is height-bound.
    let (w, h) = fit_logo(100.0, 400.0, 230.0, 130.0);
    assert_eq!(h, pixels_to_mm(130.0).round());
    assert_eq!(w, pixels_to_mm(32.5).round());
}

#[test]
fn plan_follows_overtime_flags() {
    let mut doc = common::basic_document();
    doc.add_item(common::site("a"), common::simple_item("Plain"));
    let plan = LayoutPlan::derive(&doc).expect("plan");
    assert_eq!(plan.columns, 5);
    assert_eq!(plan.first_col_width, FIRST_COLUMN_WIDTH);
    assert!(!plan.show_price_ot && !plan.show_quantity_ot);
    assert_eq!(plan.table_header_section, Some(0));

    doc.add_item(common::site("a"), common::simple_item("Late").with_overtime_quantity("2"));
    let plan = LayoutPlan::derive(&doc).expect("plan");
    assert_eq!(plan.columns, 6);
    assert_eq!(plan.first_col_width, FIRST_COLUMN_WIDTH);
    assert!(!plan.show_price_ot && plan.show_quantity_ot);

    doc.add_item(common::site("b"), common::simple_item("Night").with_overtime_price(60.0));
    let plan = LayoutPlan::derive(&doc).expect("plan");
    assert_eq!(plan.columns, 7);
    assert_eq!(plan.first_col_width, FIRST_COLUMN_WIDTH_OT);
    assert!(plan.show_price_ot && plan.show_quantity_ot);
    assert_eq!(doc.first_column_width(), plan.first_col_width);
}

#[test]
fn shade_comes_from_column_opacity() {
    let mut doc = common::basic_document();
    let plan = LayoutPlan::derive(&doc).expect("plan");
    assert_eq!(plan.shade, [240, 240, 240]);
    assert_eq!(plan.table_header_section, None);

    doc.set_column_opacity(0.0);
    assert_eq!(LayoutPlan::derive(&doc).expect("plan").shade, [255, 255, 255]);
}
