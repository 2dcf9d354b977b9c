#![allow(dead_code)]

use invoice_pdf::canvas::MM_PER_PT;
use invoice_pdf::{
    Align, Canvas, Document, DrawOp, Error, Font, Item, Layout, Logo, PageSize, Point, Rect,
    SectionInfo, TextMeasure,
};

/// Every glyph is half an em wide.
pub fn fixed_width(text: &str, font: Font) -> f32 {
    text.chars().count() as f32 * font.size * MM_PER_PT * 0.5
}

pub struct FixedMeasure;

impl TextMeasure for FixedMeasure {
    fn string_width(&self, text: &str, font: Font) -> f32 {
        fixed_width(text, font)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    BeginPage { width: f32, height: f32 },
    EndPage,
    Cell { page: usize, rect: Rect, text: String, fill: bool, rotation: f32 },
    Line { page: usize, from: Point, to: Point },
    Rect { page: usize, rect: Rect, rotation: f32 },
    Rotate { angle: f32 },
    Image { page: usize, rect: Rect },
    Finish { title: String },
}

/// Canvas that records what is drawn. `panic_on` makes a cell with that text
/// panic, to check what survives an aborted paint.
#[derive(Default)]
pub struct RecordingCanvas {
    pub events: Vec<Event>,
    pub panic_on: Option<String>,
    pages: usize,
    rotation: f32,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking_on(text: &str) -> Self {
        Self {
            panic_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn cells(&self) -> Vec<(usize, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Cell { page, text, .. } => Some((*page, text.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn rotations(&self) -> Vec<f32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Rotate { angle } => Some(*angle),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingCanvas {
    fn string_width(&self, text: &str, font: Font) -> f32 {
        fixed_width(text, font)
    }
}

impl Canvas for RecordingCanvas {
    fn begin_page(&mut self, width: f32, height: f32) {
        self.pages += 1;
        self.events.push(Event::BeginPage { width, height });
    }

    fn end_page(&mut self) {
        self.events.push(Event::EndPage);
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn set_font(&mut self, _font: Font) {}
    fn set_text_color(&mut self, _color: [u8; 3]) {}
    fn set_fill_color(&mut self, _color: [u8; 3]) {}
    fn set_draw_color(&mut self, _color: [u8; 3]) {}
    fn set_line_width(&mut self, _width: f32) {}

    fn cell(&mut self, rect: Rect, text: &str, _align: Align, fill: bool) {
        if self.panic_on.as_deref() == Some(text) {
            panic!("refusing to draw {text:?}");
        }
        self.events.push(Event::Cell {
            page: self.pages,
            rect,
            text: text.to_string(),
            fill,
            rotation: self.rotation,
        });
    }

    fn line(&mut self, from: Point, to: Point) {
        self.events.push(Event::Line {
            page: self.pages,
            from,
            to,
        });
    }

    fn rect(&mut self, rect: Rect) {
        self.events.push(Event::Rect {
            page: self.pages,
            rect,
            rotation: self.rotation,
        });
    }

    fn rotate(&mut self, angle: f32, _origin: Point) {
        self.rotation = angle;
        self.events.push(Event::Rotate { angle });
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn image(&mut self, _image: &Logo, rect: Rect) -> Result<(), Error> {
        self.events.push(Event::Image {
            page: self.pages,
            rect,
        });
        Ok(())
    }

    fn finish(&mut self, title: &str) -> Result<Vec<u8>, Error> {
        self.events.push(Event::Finish {
            title: title.to_string(),
        });
        Ok(Vec::new())
    }
}

pub fn layout(doc: &Document) -> Layout {
    invoice_pdf::layout::build(doc, &FixedMeasure).expect("layout")
}

/// Cells (page number, op) in drawing order, rotated groups included.
pub fn cells(layout: &Layout) -> Vec<(usize, &DrawOp)> {
    layout
        .pages
        .iter()
        .flat_map(|p| p.flat_ops().into_iter().map(move |op| (p.number, op)))
        .filter(|(_, op)| matches!(op, DrawOp::Cell { .. }))
        .collect()
}

/// Pages and rects of every cell or text block whose text is exactly `text`.
pub fn find_text(layout: &Layout, text: &str) -> Vec<(usize, Rect)> {
    let mut found = Vec::new();
    for page in &layout.pages {
        for op in page.flat_ops() {
            match op {
                DrawOp::Cell { rect, text: t, .. } if t == text => found.push((page.number, *rect)),
                DrawOp::TextBlock { rect, lines, .. } if lines.join("\n") == text => {
                    found.push((page.number, *rect))
                }
                _ => {}
            }
        }
    }
    found
}

pub fn page_of(layout: &Layout, text: &str) -> usize {
    let hits = find_text(layout, text);
    assert_eq!(hits.len(), 1, "expected one {text:?}, found {hits:?}");
    hits[0].0
}

pub fn basic_document() -> Document {
    let mut doc = Document::new(PageSize::A4, "$", Default::default());
    doc.set_type("Invoice");
    doc.set_reference("INV-0042");
    doc.set_date("2024-03-01");
    doc.set_due("2024-03-31");
    doc.set_from(&["Acme Works", "1 Main Street", "Springfield"]);
    doc.set_to(&["Globex", "42 Side Road"]);
    doc
}

pub fn site(id: &str) -> SectionInfo {
    SectionInfo::new(id, format!("Site {id}"))
        .address(format!("{id} Industrial Park"))
        .supervisor("J. Doe")
        .total(1250.0)
}

pub fn simple_item(name: &str) -> Item {
    Item::new(name, "8", "8", 45.0, 360.0)
}

/// Description grid with `rows` rows of two cells, labelled `prefix0a`, `prefix0b`, ...
pub fn grid(prefix: &str, rows: usize) -> Vec<Vec<String>> {
    (0..rows)
        .map(|r| vec![format!("{prefix}{r}a"), format!("{prefix}{r}b")])
        .collect()
}
