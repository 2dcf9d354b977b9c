mod common;

use invoice_pdf::{Amount, Description, Document, Error, Item, Language, PageSize, SectionInfo};

#[test]
fn sections_keep_insertion_order_and_first_metadata() {
    let mut doc = common::basic_document();
    doc.add_item(common::site("north"), common::simple_item("Survey"));
    doc.add_item(common::site("south"), common::simple_item("Drilling"));
    doc.add_item(
        SectionInfo::new("north", "Renamed").supervisor("Somebody else").total(1.0),
        common::simple_item("Backfill"),
    );

    let sections: Vec<_> = doc.sections().collect();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].id, "north");
    assert_eq!(sections[0].name, "Site north");
    assert_eq!(sections[0].supervisor, "J. Doe");
    assert_eq!(sections[0].total, Amount::Number(1250.0));
    let names: Vec<_> = sections[0].items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Survey", "Backfill"]);
    assert_eq!(sections[1].id, "south");
}

#[test]
fn empty_po_number_is_dropped() {
    let mut doc = common::basic_document();
    doc.add_item(common::site("a").po_number(""), common::simple_item("One"));
    doc.add_item(common::site("b").po_number("PO-77"), common::simple_item("Two"));
    let pos: Vec<_> = doc.sections().map(|s| s.po_number.clone()).collect();
    assert_eq!(pos, [None, Some("PO-77".to_string())]);
}

#[test]
fn overtime_flags_are_document_wide() {
    let mut doc = common::basic_document();
    doc.add_item(common::site("a"), common::simple_item("One"));
    assert_eq!(doc.column_count(), 5);
    assert_eq!(doc.first_column_width(), 70.0);

    doc.add_item(common::site("b"), common::simple_item("Two").with_overtime_quantity("1.5"));
    assert!(doc.has_overtime_quantity());
    assert_eq!(doc.column_count(), 6);

    doc.add_item(common::site("a"), common::simple_item("Three").with_overtime_price("call us"));
    assert!(doc.has_overtime_price());
    assert_eq!(doc.column_count(), 7);
    assert_eq!(doc.first_column_width(), 58.0);
}

#[test]
fn flipping_twice_restores_parties() {
    let mut doc = common::basic_document();
    assert!(!doc.is_from_to_swapped());
    doc.flip_from_to();
    assert!(doc.is_from_to_swapped());
    doc.flip_from_to();
    assert!(!doc.is_from_to_swapped());
    assert_eq!(doc.from_lines()[0], "Acme Works");
    assert_eq!(doc.to_lines()[0], "Globex");
}

#[test]
fn invalid_timezone_leaves_document_unchanged() {
    let mut doc = common::basic_document();
    assert!(!doc.set_timezone("Mars/Olympus_Mons"));
    assert!(!doc.set_timezone(""));
    assert_eq!(doc.timezone(), None);

    assert!(doc.set_timezone("Europe/Amsterdam"));
    assert_eq!(doc.timezone(), Some(chrono_tz::Europe::Amsterdam));
    assert!(!doc.set_timezone("Not/AZone"));
    assert_eq!(doc.timezone(), Some(chrono_tz::Europe::Amsterdam));
}

#[test]
fn date_today_uses_configured_zone() {
    let mut doc = common::basic_document();
    assert!(doc.set_timezone("Pacific/Kiritimati"));
    doc.set_date_today("%Y-%m-%d");
    let expected = chrono::Utc::now()
        .with_timezone(&chrono_tz::Pacific::Kiritimati)
        .format("%Y-%m-%d")
        .to_string();
    assert_eq!(doc.date(), Some(expected.as_str()));
}

#[test]
fn names_are_transliterated() {
    let mut doc = Document::new(PageSize::Letter, "EUR", Language::english());
    doc.set_from(&["Müller & Søn", "Straße 5"]);
    doc.add_item(
        SectionInfo::new("x", "Chantier Élysée").address("Côte d'Azur"),
        Item::new("Réparation", "1", "1", 10.0, 10.0),
    );
    assert_eq!(doc.from_lines(), ["Muller & Son", "Strasse 5"]);
    let section = doc.sections().next().expect("section");
    assert_eq!(section.name, "Chantier Elysee");
    assert_eq!(section.address, "Cote d'Azur");
    assert_eq!(section.items[0].name, "Reparation");
}

#[test]
fn descriptions() {
    let text = common::simple_item("a").with_text_description("first<br>second<BR />third");
    assert_eq!(
        text.description,
        Some(Description::Text("first\nsecond\nthird".into()))
    );

    assert_eq!(common::simple_item("b").with_text_description("").description, None);
    assert_eq!(common::simple_item("c").with_grid_description(vec![]).description, None);

    let grid = common::simple_item("d").with_grid_description(common::grid("g", 2));
    assert_eq!(grid.description.as_ref().map(Description::row_count), Some(2));
    assert_eq!(Description::Text("x\ny".into()).row_count(), 1);
}

#[test]
fn amounts() {
    assert_eq!(Amount::parse("12.5"), Amount::Number(12.5));
    assert_eq!(Amount::parse(" 7 "), Amount::Number(7.0));
    assert_eq!(Amount::parse("on request"), Amount::Text("on request".into()));

    assert_eq!(Amount::Number(1234.5).format("$", ".", ","), "$ 1,234.50");
    assert_eq!(Amount::Number(1234.5).format("EUR", ",", "."), "EUR 1.234,50");
    assert_eq!(Amount::Text("N/A".into()).format("$", ".", ","), "N/A");
}

#[test]
fn hex_colors() {
    let mut doc = common::basic_document();
    doc.set_color_hex("#007fff").expect("valid color");
    let err = doc.set_color_hex("#12345").unwrap_err();
    assert!(matches!(err, Error::InvalidColor(ref c) if c == "#12345"));
}

#[test]
fn unreadable_logo_is_rejected() {
    let mut doc = common::basic_document();
    let err = doc.set_logo(b"definitely not an image".to_vec(), None).unwrap_err();
    assert!(matches!(err, Error::InvalidImage(_)), "unexpected error {err:?}");
    assert!(doc.logo().is_none());
}

#[test]
fn png_logo_gets_display_size() {
    let mut png = Vec::new();
    image::RgbaImage::new(460, 260)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("encode png");

    let mut doc = common::basic_document();
    doc.set_logo(png, None).expect("valid logo");
    let logo = doc.logo().expect("logo");
    assert_eq!((logo.pixel_width, logo.pixel_height), (460, 260));
    // 460x260 into 230x130 px: scale 0.5, 230 px = 60.85mm.
    assert_eq!((logo.display_width, logo.display_height), (61.0, 34.0));
}
