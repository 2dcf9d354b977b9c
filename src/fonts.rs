use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;
use unicode_normalization::UnicodeNormalization;

use crate::canvas::{Font, MM_PER_PT, TextMeasure};
use crate::error::Error;

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0 - ?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @ - O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P - _
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // ` - o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p - ~
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0 - ?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @ - O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P - _
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // ` - o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p - ~
];

/// Standard-font width of `ch`. Accented Latin letters take the width of their
/// base letter; anything else outside ASCII gets an average glyph width.
pub(crate) fn helvetica_width_1000(ch: char, bold: bool) -> f32 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let ascii = if ch.is_ascii() {
        Some(ch)
    } else {
        std::iter::once(ch).nfd().next().filter(char::is_ascii)
    };
    match ascii {
        Some(c) if (' '..='~').contains(&c) => table[(c as u8 - 32) as usize] as f32,
        Some(_) => 0.0,
        None => 556.0,
    }
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or `None` if unmappable.
pub(crate) fn char_to_winansi(c: char) -> Option<u8> {
    let byte = match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters with no WinAnsi code are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        match char_to_winansi(c) {
            Some(b) => out.push(b),
            None => log::warn!("no WinAnsi code for {c:?}; dropped"),
        }
    }
    out
}

enum FontBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl std::ops::Deref for FontBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FontBytes::Mapped(m) => m,
            FontBytes::Owned(v) => v,
        }
    }
}

/// A parsed TrueType/OpenType face kept alongside its bytes.
pub struct TrueTypeFace {
    ps_name: String,
    data: FontBytes,
    index: u32,
    units_per_em: f32,
    /// Glyph id and advance (1000 units) for every WinAnsi character the face covers.
    common: HashMap<char, (u16, f32)>,
}

impl TrueTypeFace {
    fn parse(data: FontBytes, index: u32, label: &str) -> Result<Self, Error> {
        let face = Face::parse(&data, index)
            .map_err(|e| Error::InvalidFont(format!("{label}: {e}")))?;
        let units_per_em = face.units_per_em() as f32;
        let ps_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| label.to_string())
            .replace(' ', "");

        let common = (32u8..=255u8)
            .map(winansi_to_char)
            .filter_map(|ch| glyph_of(&face, ch, units_per_em).map(|g| (ch, g)))
            .collect();
        drop(face);

        log::debug!("loaded font face {ps_name} ({label}, index {index})");
        Ok(Self {
            ps_name,
            data,
            index,
            units_per_em,
            common,
        })
    }

    pub fn name(&self) -> &str {
        &self.ps_name
    }

    /// Glyph id and advance width (1000 units) of `ch`, if the face has it.
    pub(crate) fn glyph(&self, ch: char) -> Option<(u16, f32)> {
        if let Some(&g) = self.common.get(&ch) {
            return Some(g);
        }
        let face = Face::parse(&self.data, self.index).ok()?;
        glyph_of(&face, ch, self.units_per_em)
    }

    fn width_1000(&self, ch: char) -> f32 {
        self.glyph(ch).map_or(0.0, |(_, w)| w)
    }
}

fn glyph_of(face: &Face, ch: char, units_per_em: f32) -> Option<(u16, f32)> {
    let gid = face.glyph_index(ch)?;
    let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f32 / units_per_em * 1000.0;
    Some((gid.0, advance))
}

/// The two faces a document is set in. Without TrueType faces the standard
/// Helvetica pair is used; a missing bold face falls back to the regular one.
#[derive(Default)]
pub struct FontSet {
    regular: Option<TrueTypeFace>,
    bold: Option<TrueTypeFace>,
}

impl FontSet {
    /// Helvetica and Helvetica-Bold, not embedded.
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, Error> {
        let regular = TrueTypeFace::parse(FontBytes::Owned(regular), 0, "regular")?;
        let bold = bold
            .map(|b| TrueTypeFace::parse(FontBytes::Owned(b), 0, "bold"))
            .transpose()?;
        Ok(Self {
            regular: Some(regular),
            bold,
        })
    }

    pub fn from_files(regular: &Path, bold: Option<&Path>) -> Result<Self, Error> {
        let regular = load_face(regular)?;
        let bold = bold.map(load_face).transpose()?;
        Ok(Self {
            regular: Some(regular),
            bold,
        })
    }

    pub fn is_embedded(&self) -> bool {
        self.regular.is_some()
    }

    /// Slot used for `bold` text: 1 only when a separate bold face exists
    /// (or for the standard pair, which always has Helvetica-Bold).
    pub(crate) fn slot(&self, bold: bool) -> usize {
        match (&self.regular, &self.bold) {
            (None, _) => usize::from(bold),
            (Some(_), Some(_)) => usize::from(bold),
            (Some(_), None) => 0,
        }
    }

    pub(crate) fn face(&self, slot: usize) -> Option<&TrueTypeFace> {
        match slot {
            0 => self.regular.as_ref(),
            _ => self.bold.as_ref(),
        }
    }

    pub(crate) fn width_1000(&self, ch: char, bold: bool) -> f32 {
        match self.face(self.slot(bold)) {
            Some(face) => face.width_1000(ch),
            None => helvetica_width_1000(ch, bold),
        }
    }
}

impl TextMeasure for FontSet {
    fn string_width(&self, text: &str, font: Font) -> f32 {
        let units: f32 = text.chars().map(|c| self.width_1000(c, font.bold)).sum();
        units * font.size / 1000.0 * MM_PER_PT
    }
}

fn load_face(path: &Path) -> Result<TrueTypeFace, Error> {
    let file = std::fs::File::open(path)?;
    // SAFETY: the mapping is read-only and font files are not expected to be
    // rewritten while a document is being produced.
    let data = unsafe { Mmap::map(&file) }?;
    TrueTypeFace::parse(FontBytes::Mapped(data), 0, &path.display().to_string())
}

/// Write a standard Type1 font dictionary with WinAnsi encoding.
pub(crate) fn write_standard_font(pdf: &mut Pdf, font_ref: Ref, bold: bool) {
    let base: &[u8] = if bold { b"Helvetica-Bold" } else { b"Helvetica" };
    pdf.type1_font(font_ref)
        .base_font(Name(base))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
}

fn identity() -> pdf_writer::types::SystemInfo<'static> {
    pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    }
}

/// Embed a TrueType/OpenType face as a CIDFont (Type0 composite) with
/// Identity-H encoding, subset to the glyphs in `used` (new glyph id ->
/// character).
pub(crate) fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    face: &TrueTypeFace,
    remapper: &subsetter::GlyphRemapper,
    used: &BTreeMap<u16, char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    let parsed = Face::parse(&face.data, face.index)
        .map_err(|e| Error::InvalidFont(format!("{}: {e}", face.ps_name)))?;
    let units = face.units_per_em;
    let scale = |v: f32| v / units * 1000.0;

    let ascent = scale(parsed.ascender() as f32);
    let descent = scale(parsed.descender() as f32);
    let cap_height = parsed
        .capital_height()
        .map(|h| scale(h as f32))
        .unwrap_or(700.0);
    let bb = parsed.global_bounding_box();
    let bbox = Rect::new(
        scale(bb.x_min as f32),
        scale(bb.y_min as f32),
        scale(bb.x_max as f32),
        scale(bb.y_max as f32),
    );

    let subset_data = subsetter::subset(&face.data, face.index, remapper).unwrap_or_else(|e| {
        log::warn!("font subsetting failed for {}: {e}; embedding full font", face.ps_name);
        face.data.to_vec()
    });
    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::InvalidFont(format!("{} is too large to embed", face.ps_name)))?;

    let data_ref = alloc();
    let descriptor_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();
    let ps_name = face.ps_name.as_bytes();

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&subset_data, 6);
    pdf.stream(data_ref, &compressed)
        .filter(pdf_writer::Filter::FlateDecode)
        .pair(Name(b"Length1"), data_len);

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name));
        cid.system_info(identity());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !used.is_empty() {
            let mut w = cid.widths();
            for (&gid, &ch) in used {
                w.consecutive(gid, [face.width_1000(ch)]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", face.ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), identity());
    for (&gid, &ch) in used {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    log::debug!("embedded {} with {} glyphs", face.ps_name, used.len());
    Ok(())
}
