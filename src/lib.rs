pub mod canvas;
mod error;
pub mod fonts;
pub mod layout;
pub mod locale;
mod model;
pub mod pdf;
pub mod text;

pub use canvas::{Align, Canvas, Font, Point, Rect, TextMeasure};
pub use error::Error;
pub use fonts::FontSet;
pub use layout::{DrawOp, Layout, LayoutPlan, Page};
pub use locale::{Label, Language};
pub use model::{
    Amount, DEFAULT_LOGO_BOX, Description, Document, ImageFormat, Item, Logo, Margins, PageSize,
    Section, SectionInfo, Skill, TextBlock, Total,
};
pub use pdf::PdfCanvas;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where rendered bytes go.
pub enum Destination<'a> {
    /// Return the bytes to the caller.
    Buffer,
    File(&'a Path),
    /// Write to an already open writer, e.g. an HTTP response body.
    Stream(&'a mut dyn Write),
}

#[derive(Debug, PartialEq)]
pub enum Output {
    Bytes(Vec<u8>),
    Written { path: PathBuf, len: usize },
    Streamed { len: usize },
}

impl Output {
    pub fn len(&self) -> usize {
        match self {
            Output::Bytes(b) => b.len(),
            Output::Written { len, .. } | Output::Streamed { len } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render `doc` to PDF in the standard fonts. `name` becomes the document title.
pub fn render(doc: &Document, name: &str, destination: Destination<'_>) -> Result<Output, Error> {
    let mut canvas = PdfCanvas::new();
    let bytes = render_with(doc, &mut canvas, name)?;
    deliver(bytes, destination)
}

/// Lay `doc` out with the canvas' own metrics, paint it and return the bytes.
pub fn render_with(doc: &Document, canvas: &mut dyn Canvas, name: &str) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let layout = layout::build(doc, &*canvas)?;
    let t_layout = t0.elapsed();

    layout::paint(&layout, canvas)?;
    let t_paint = t0.elapsed();

    let bytes = canvas.finish(name)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, paint={:.1}ms, output={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_paint - t_layout).as_secs_f64() * 1000.0,
        (t_total - t_paint).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        layout.page_count(),
        bytes.len(),
    );
    Ok(bytes)
}

fn deliver(bytes: Vec<u8>, destination: Destination<'_>) -> Result<Output, Error> {
    match destination {
        Destination::Buffer => Ok(Output::Bytes(bytes)),
        Destination::File(path) => {
            std::fs::write(path, &bytes)?;
            log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
            Ok(Output::Written {
                path: path.to_path_buf(),
                len: bytes.len(),
            })
        }
        Destination::Stream(writer) => {
            writer.write_all(&bytes)?;
            writer.flush()?;
            Ok(Output::Streamed { len: bytes.len() })
        }
    }
}
