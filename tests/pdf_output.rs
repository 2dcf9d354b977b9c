mod common;

use invoice_pdf::{Canvas, Destination, Document, Error, FontSet, Language, Output, PageSize, PdfCanvas};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn invoice() -> Document {
    let mut doc = common::basic_document();
    for i in 0..30 {
        doc.add_item(common::site("a"), common::simple_item(&format!("Row {i}")));
    }
    doc.add_total("Net", 10800.0, false);
    doc.add_badge("paid");
    doc.set_footnote("Thank you");
    doc
}

fn buffer(doc: &Document, name: &str) -> Vec<u8> {
    match doc.render(name, Destination::Buffer).expect("render") {
        Output::Bytes(bytes) => bytes,
        other => panic!("expected bytes, got {other:?}"),
    }
}

#[test]
fn buffer_holds_a_pdf() {
    let _ = env_logger::try_init();
    let bytes = buffer(&invoice(), "INV-0042");
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(contains(&bytes, b"INV-0042"), "title missing from document info");
    assert!(contains(&bytes, b"Helvetica"));
    assert!(contains(&bytes, b"%%EOF"));
}

#[test]
fn canvas_pages_match_layout() {
    let _ = env_logger::try_init();
    let doc = invoice();
    let expected = common::layout(&doc).page_count();
    assert!(expected >= 2);

    let mut canvas = PdfCanvas::new();
    let bytes = invoice_pdf::render_with(&doc, &mut canvas, "pages").expect("render");
    assert_eq!(canvas.page_count(), expected);

    let count = |needle: &[u8]| bytes.windows(needle.len()).filter(|w| *w == needle).count();
    let tree = count(b"/Type /Pages");
    let all = count(b"/Type /Page");
    assert_eq!(all - tree, expected);
}

#[test]
fn file_destination_reports_length() {
    let path = std::env::temp_dir().join(format!("invoice-pdf-{}.pdf", std::process::id()));
    let output = invoice().render("file", Destination::File(&path)).expect("render");

    let on_disk = std::fs::metadata(&path).expect("written").len() as usize;
    assert_eq!(
        output,
        Output::Written {
            path: path.clone(),
            len: on_disk
        }
    );
    assert!(!output.is_empty());
    std::fs::remove_file(&path).expect("cleanup");
}

#[test]
fn stream_destination_writes_everything() {
    let mut sink: Vec<u8> = Vec::new();
    let output = invoice()
        .render("stream", Destination::Stream(&mut sink))
        .expect("render");
    assert_eq!(output, Output::Streamed { len: sink.len() });
    assert!(sink.starts_with(b"%PDF-"));
}

#[test]
fn empty_document_renders_one_page() {
    let doc = Document::new(PageSize::Letter, "$", Language::english());
    let mut canvas = PdfCanvas::new();
    let bytes = invoice_pdf::render_with(&doc, &mut canvas, "empty").expect("render");
    assert_eq!(canvas.page_count(), 1);
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn png_logo_is_embedded_once() {
    let mut png = Vec::new();
    image::RgbaImage::from_pixel(40, 20, image::Rgba([200, 30, 30, 255]))
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("encode png");
    let mut doc = invoice();
    doc.set_logo(png, None).expect("logo");

    let bytes = buffer(&doc, "logo");
    let images = bytes
        .windows(b"/Subtype /Image".len())
        .filter(|w| *w == b"/Subtype /Image")
        .count();
    // Fully opaque, so no soft mask.
    assert_eq!(images, 1);
}

#[test]
fn page_count_survives_finish() {
    let mut canvas = PdfCanvas::new();
    for _ in 0..2 {
        canvas.begin_page(210.0, 297.0);
        canvas.end_page();
    }
    assert_eq!(canvas.page_count(), 2);

    let bytes = canvas.finish("two").expect("finish");
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(canvas.page_count(), 2);
}

#[test]
fn finishing_without_pages_fails() {
    let err = PdfCanvas::new().finish("nothing").unwrap_err();
    assert!(matches!(err, Error::Pdf(_)), "unexpected error {err:?}");
}

#[test]
fn garbage_font_is_rejected() {
    let err = FontSet::from_bytes(b"not a font at all".to_vec(), None)
        .err()
        .expect("garbage accepted");
    assert!(matches!(err, Error::InvalidFont(_)), "unexpected error {err:?}");
    assert!(!FontSet::standard().is_embedded());
}
