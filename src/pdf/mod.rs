//! `pdf-writer` backed [`Canvas`]. Drawing is recorded into one content
//! stream per page; fonts and images are written once, in [`Canvas::finish`].

use std::collections::{BTreeMap, BTreeSet};

use pdf_writer::{Content, Filter, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};

use crate::canvas::{Align, CELL_MARGIN, Canvas, Font, MM_PER_PT, Point, Rect, TextMeasure};
use crate::error::Error;
use crate::fonts::{FontSet, embed_truetype, to_winansi_bytes, write_standard_font};
use crate::model::{ImageFormat, Logo};

const PT_PER_MM: f32 = 1.0 / MM_PER_PT;
/// Baseline offset below a cell's vertical center, in font sizes.
const BASELINE_SHIFT: f32 = 0.3;
const FONT_NAMES: [&str; 2] = ["F1", "F2"];

struct PageContent {
    width: f32,
    height: f32,
    content: Content,
    images: BTreeSet<usize>,
}

struct EmbeddedImage {
    data: Vec<u8>,
    format: ImageFormat,
    pixel_width: u32,
    pixel_height: u32,
}

/// Glyphs used per font slot, for subsetting embedded faces.
struct GlyphUsage {
    remapper: subsetter::GlyphRemapper,
    /// New glyph id -> character.
    used: BTreeMap<u16, char>,
}

impl GlyphUsage {
    fn new() -> Self {
        Self {
            remapper: subsetter::GlyphRemapper::new(),
            used: BTreeMap::new(),
        }
    }
}

pub struct PdfCanvas {
    fonts: FontSet,
    glyphs: [GlyphUsage; 2],
    pages: Vec<PageContent>,
    /// Pages begun; survives `finish`, which hands the page contents to the writer.
    pages_begun: usize,
    page_open: bool,
    images: Vec<EmbeddedImage>,
    font: Font,
    text_color: [u8; 3],
    fill_color: [u8; 3],
    draw_color: [u8; 3],
    line_width: f32,
    rotation: f32,
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfCanvas {
    /// Canvas set in the standard Helvetica fonts.
    pub fn new() -> Self {
        Self::with_fonts(FontSet::standard())
    }

    /// Canvas that embeds (subsets of) the given faces.
    pub fn with_fonts(fonts: FontSet) -> Self {
        Self {
            fonts,
            glyphs: [GlyphUsage::new(), GlyphUsage::new()],
            pages: Vec::new(),
            pages_begun: 0,
            page_open: false,
            images: Vec::new(),
            font: Font::regular(12.0),
            text_color: [0, 0, 0],
            fill_color: [255, 255, 255],
            draw_color: [0, 0, 0],
            line_width: 0.2,
            rotation: 0.0,
        }
    }

    fn page(&mut self) -> Option<&mut PageContent> {
        if !self.page_open {
            log::warn!("drawing outside of a page is ignored");
            return None;
        }
        self.pages.last_mut()
    }

    /// Page height in mm, for flipping y.
    fn page_height(&self) -> f32 {
        self.pages.last().map_or(0.0, |p| p.height)
    }

    /// Encode `text` for the current font slot, recording glyph usage of
    /// embedded faces.
    fn encode(&mut self, text: &str, slot: usize) -> Vec<u8> {
        let Some(face) = self.fonts.face(slot) else {
            return to_winansi_bytes(text);
        };
        let usage = &mut self.glyphs[slot];
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let gid = match face.glyph(ch) {
                Some((gid, _)) => {
                    let new_gid = usage.remapper.remap(gid);
                    usage.used.insert(new_gid, ch);
                    new_gid
                }
                None => {
                    log::warn!("font {} has no glyph for {ch:?}", face.name());
                    0
                }
            };
            out.extend_from_slice(&gid.to_be_bytes());
        }
        out
    }

    fn image_index(&mut self, logo: &Logo) -> usize {
        if let Some(i) = self.images.iter().position(|img| img.data == logo.data) {
            return i;
        }
        self.images.push(EmbeddedImage {
            data: logo.data.clone(),
            format: logo.format,
            pixel_width: logo.pixel_width,
            pixel_height: logo.pixel_height,
        });
        self.images.len() - 1
    }
}

fn rgb(c: [u8; 3]) -> (f32, f32, f32) {
    (c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0)
}

impl TextMeasure for PdfCanvas {
    fn string_width(&self, text: &str, font: Font) -> f32 {
        self.fonts.string_width(text, font)
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self, width: f32, height: f32) {
        if self.page_open {
            self.end_page();
        }
        self.pages.push(PageContent {
            width,
            height,
            content: Content::new(),
            images: BTreeSet::new(),
        });
        self.pages_begun += 1;
        self.page_open = true;
        self.rotation = 0.0;
    }

    fn end_page(&mut self) {
        if self.rotation != 0.0 {
            self.rotate(0.0, Point::new(0.0, 0.0));
        }
        self.page_open = false;
    }

    fn page_count(&self) -> usize {
        self.pages_begun
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_text_color(&mut self, color: [u8; 3]) {
        self.text_color = color;
    }

    fn set_fill_color(&mut self, color: [u8; 3]) {
        self.fill_color = color;
    }

    fn set_draw_color(&mut self, color: [u8; 3]) {
        self.draw_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn cell(&mut self, rect: Rect, text: &str, align: Align, fill: bool) {
        let page_h = self.page_height();
        let font = self.font;
        let slot = self.fonts.slot(font.bold);
        let text_w = self.string_width(text, font);
        let encoded = if text.is_empty() { Vec::new() } else { self.encode(text, slot) };
        let (fill_color, text_color) = (rgb(self.fill_color), rgb(self.text_color));

        let Some(page) = self.page() else { return };
        let c = &mut page.content;
        if fill {
            c.save_state();
            c.set_fill_rgb(fill_color.0, fill_color.1, fill_color.2);
            c.rect(
                rect.x * PT_PER_MM,
                (page_h - rect.y - rect.h) * PT_PER_MM,
                rect.w * PT_PER_MM,
                rect.h * PT_PER_MM,
            );
            c.fill_nonzero();
            c.restore_state();
        }
        if encoded.is_empty() {
            return;
        }

        let dx = match align {
            Align::Left => CELL_MARGIN,
            Align::Center => (rect.w - text_w) / 2.0,
            Align::Right => rect.w - CELL_MARGIN - text_w,
        };
        let baseline = rect.y + 0.5 * rect.h + BASELINE_SHIFT * font.size_mm();
        c.save_state();
        c.set_fill_rgb(text_color.0, text_color.1, text_color.2);
        c.begin_text()
            .set_font(Name(FONT_NAMES[slot].as_bytes()), font.size)
            .next_line((rect.x + dx) * PT_PER_MM, (page_h - baseline) * PT_PER_MM)
            .show(Str(&encoded))
            .end_text();
        c.restore_state();
    }

    fn line(&mut self, from: Point, to: Point) {
        let page_h = self.page_height();
        let (width, color) = (self.line_width, rgb(self.draw_color));
        let Some(page) = self.page() else { return };
        let c = &mut page.content;
        c.save_state();
        c.set_line_width(width * PT_PER_MM);
        c.set_stroke_rgb(color.0, color.1, color.2);
        c.move_to(from.x * PT_PER_MM, (page_h - from.y) * PT_PER_MM);
        c.line_to(to.x * PT_PER_MM, (page_h - to.y) * PT_PER_MM);
        c.stroke();
        c.restore_state();
    }

    fn rect(&mut self, rect: Rect) {
        let page_h = self.page_height();
        let (width, color) = (self.line_width, rgb(self.draw_color));
        let Some(page) = self.page() else { return };
        let c = &mut page.content;
        c.save_state();
        c.set_line_width(width * PT_PER_MM);
        c.set_stroke_rgb(color.0, color.1, color.2);
        c.rect(
            rect.x * PT_PER_MM,
            (page_h - rect.y - rect.h) * PT_PER_MM,
            rect.w * PT_PER_MM,
            rect.h * PT_PER_MM,
        );
        c.stroke();
        c.restore_state();
    }

    fn rotate(&mut self, angle: f32, origin: Point) {
        let page_h = self.page_height();
        let was_rotated = self.rotation != 0.0;
        self.rotation = angle;
        let Some(page) = self.page() else { return };
        let c = &mut page.content;
        if was_rotated {
            c.restore_state();
        }
        if angle != 0.0 {
            let (sin, cos) = angle.to_radians().sin_cos();
            let cx = origin.x * PT_PER_MM;
            let cy = (page_h - origin.y) * PT_PER_MM;
            c.save_state();
            c.transform([cos, sin, -sin, cos, cx, cy]);
            c.transform([1.0, 0.0, 0.0, 1.0, -cx, -cy]);
        }
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn image(&mut self, logo: &Logo, rect: Rect) -> Result<(), Error> {
        let page_h = self.page_height();
        let index = self.image_index(logo);
        let Some(page) = self.page() else {
            return Ok(());
        };
        page.images.insert(index);
        let c = &mut page.content;
        c.save_state();
        c.transform([
            rect.w * PT_PER_MM,
            0.0,
            0.0,
            rect.h * PT_PER_MM,
            rect.x * PT_PER_MM,
            (page_h - rect.y - rect.h) * PT_PER_MM,
        ]);
        c.x_object(Name(image_name(index).as_bytes()));
        c.restore_state();
        Ok(())
    }

    fn finish(&mut self, title: &str) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        if self.page_open {
            self.end_page();
        }
        if self.pages.is_empty() {
            return Err(Error::Pdf("document has no pages".into()));
        }

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let mut font_pairs: Vec<(&str, Ref)> = Vec::new();
        for (slot, name) in FONT_NAMES.iter().enumerate() {
            let font_ref = alloc();
            match self.fonts.face(slot) {
                Some(face) => {
                    let usage = &self.glyphs[slot];
                    embed_truetype(&mut pdf, font_ref, face, &usage.remapper, &usage.used, &mut alloc)?;
                }
                None if self.fonts.is_embedded() => continue,
                None => write_standard_font(&mut pdf, font_ref, slot == 1),
            }
            font_pairs.push((*name, font_ref));
        }
        let t_fonts = t0.elapsed();

        let mut image_refs = Vec::with_capacity(self.images.len());
        for img in &self.images {
            image_refs.push(embed_image(&mut pdf, img, &mut alloc)?);
        }
        let t_images = t0.elapsed();

        let pages = std::mem::take(&mut self.pages);
        let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();
        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(pages.len() as i32);

        for (page, &page_id) in pages.into_iter().zip(&page_ids) {
            let content_id = alloc();
            let raw = page.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

            let mut pdf_page = pdf.page(page_id);
            pdf_page
                .media_box(PdfRect::new(
                    0.0,
                    0.0,
                    page.width * PT_PER_MM,
                    page.height * PT_PER_MM,
                ))
                .parent(pages_id)
                .contents(content_id);
            let mut resources = pdf_page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !page.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for &i in &page.images {
                    xobjects.pair(Name(image_name(i).as_bytes()), image_refs[i]);
                }
            }
        }

        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr(concat!("invoice-pdf ", env!("CARGO_PKG_VERSION"))));

        let bytes = pdf.finish();
        log::info!(
            "PDF assembly: fonts={:.1}ms, images={:.1}ms, pages={:.1}ms ({} pages, {} bytes)",
            t_fonts.as_secs_f64() * 1000.0,
            (t_images - t_fonts).as_secs_f64() * 1000.0,
            (t0.elapsed() - t_images).as_secs_f64() * 1000.0,
            page_ids.len(),
            bytes.len(),
        );
        Ok(bytes)
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// JPEG data passes through as DCT; PNG is decoded to RGB with an optional
/// alpha soft mask.
fn embed_image(
    pdf: &mut Pdf,
    img: &EmbeddedImage,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<Ref, Error> {
    let xobj_ref = alloc();
    match img.format {
        ImageFormat::Jpeg => {
            let mut xobj = pdf.image_xobject(xobj_ref, &img.data);
            xobj.filter(Filter::DctDecode);
            xobj.width(img.pixel_width as i32);
            xobj.height(img.pixel_height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }
        ImageFormat::Png => {
            let cursor = std::io::Cursor::new(&img.data);
            let reader = image::ImageReader::with_format(
                std::io::BufReader::new(cursor),
                image::ImageFormat::Png,
            );
            let decoded = reader
                .decode()
                .map_err(|e| Error::InvalidImage(format!("PNG logo: {e}")))?;
            let rgba: image::RgbaImage = decoded.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
    Ok(xobj_ref)
}
