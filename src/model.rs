use std::io::Cursor;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::Error;
use crate::layout::geometry::{COLUMN_SPACING, FIRST_COLUMN_WIDTH, FIRST_COLUMN_WIDTH_OT};
use crate::locale::Language;
use crate::text::{br_to_newline, format_number, parse_hex_color, to_ascii};
use crate::{Destination, Output};

/// Logo bounding box in pixels before conversion to millimeters.
pub const DEFAULT_LOGO_BOX: (f32, f32) = (230.0, 130.0);

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// (width, height) in millimeters.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }

    /// Case-insensitive; unknown names fall back to A4.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "letter" => PageSize::Letter,
            "legal" => PageSize::Legal,
            _ => PageSize::A4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 15.0,
            top: 15.0,
            right: 15.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Clone)]
pub struct Logo {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub display_width: f32,  // mm
    pub display_height: f32, // mm
}

impl Logo {
    /// Probe the image and fit it into `max_box` (pixels) keeping its aspect ratio.
    pub fn from_bytes(data: Vec<u8>, max_box: (f32, f32)) -> Result<Self, Error> {
        let reader = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| Error::InvalidImage(e.to_string()))?;
        let format = match reader.format() {
            Some(image::ImageFormat::Png) => ImageFormat::Png,
            Some(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
            Some(other) => {
                return Err(Error::InvalidImage(format!("unsupported format {other:?}")));
            }
            None => return Err(Error::InvalidImage("unrecognized image data".into())),
        };
        let (pixel_width, pixel_height) = reader
            .into_dimensions()
            .map_err(|e| Error::InvalidImage(e.to_string()))?;
        if pixel_width == 0 || pixel_height == 0 {
            return Err(Error::InvalidImage("image has no pixels".into()));
        }
        let (display_width, display_height) = crate::layout::geometry::fit_logo(
            pixel_width as f32,
            pixel_height as f32,
            max_box.0,
            max_box.1,
        );
        log::debug!(
            "logo {format:?} {pixel_width}x{pixel_height}px -> {display_width}x{display_height}mm"
        );
        Ok(Self {
            data,
            format,
            pixel_width,
            pixel_height,
            display_width,
            display_height,
        })
    }
}

/// A money value: numbers get currency formatting at render time, text is
/// taken as already formatted.
#[derive(Clone, Debug, PartialEq)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Amount::Number(n),
            _ => Amount::Text(value.to_string()),
        }
    }

    pub fn format(&self, currency: &str, decimal: &str, thousands: &str) -> String {
        match self {
            Amount::Number(n) => format!("{} {}", currency, format_number(*n, decimal, thousands)),
            Amount::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Amount::Number(n)
    }
}

impl From<i64> for Amount {
    fn from(n: i64) -> Self {
        Amount::Number(n as f64)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::parse(s)
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Self {
        Amount::parse(&s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Description {
    Text(String),
    /// Rows of cells; every row is expected to have the same cell count.
    Grid(Vec<Vec<String>>),
}

impl Description {
    /// Rows counted by the row-height estimate; free text counts as one.
    pub fn row_count(&self) -> usize {
        match self {
            Description::Text(_) => 1,
            Description::Grid(rows) => rows.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    pub description: String,
}

impl Skill {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub name: String,
    pub description: Option<Description>,
    pub skills: Vec<Skill>,
    pub total_quantity: String,
    pub quantity: String,
    pub quantity_ot: Option<String>,
    pub price: f64,
    pub price_ot: Option<Amount>,
    pub total: f64,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        total_quantity: impl Into<String>,
        quantity: impl Into<String>,
        price: f64,
        total: f64,
    ) -> Self {
        Self {
            name: to_ascii(&name.into()),
            description: None,
            skills: Vec::new(),
            total_quantity: total_quantity.into(),
            quantity: quantity.into(),
            quantity_ot: None,
            price,
            price_ot: None,
            total,
        }
    }

    /// Free text, `<br>` tags become line breaks. Empty text means no description.
    pub fn with_text_description(mut self, text: &str) -> Self {
        self.description = if text.is_empty() {
            None
        } else {
            Some(Description::Text(br_to_newline(text)))
        };
        self
    }

    pub fn with_grid_description(mut self, rows: Vec<Vec<String>>) -> Self {
        if let Some(first) = rows.first()
            && rows.iter().any(|r| r.len() != first.len())
        {
            log::warn!(
                "description grid of {:?} is ragged; cell widths follow the first row",
                self.name
            );
        }
        self.description = if rows.is_empty() {
            None
        } else {
            Some(Description::Grid(rows))
        };
        self
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_overtime_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity_ot = Some(quantity.into());
        self
    }

    pub fn with_overtime_price(mut self, price: impl Into<Amount>) -> Self {
        self.price_ot = Some(price.into());
        self
    }
}

/// Section metadata passed with every `add_item`; only the first call for a
/// given id is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionInfo {
    pub id: String,
    pub name: String,
    pub address: String,
    pub supervisor: String,
    pub total: Amount,
    pub po_number: Option<String>,
}

impl SectionInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            supervisor: String::new(),
            total: Amount::Text(String::new()),
            po_number: None,
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn supervisor(mut self, supervisor: impl Into<String>) -> Self {
        self.supervisor = supervisor.into();
        self
    }

    pub fn total(mut self, total: impl Into<Amount>) -> Self {
        self.total = total.into();
        self
    }

    pub fn po_number(mut self, po: impl Into<String>) -> Self {
        self.po_number = Some(po.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub address: String,
    pub supervisor: String,
    pub po_number: Option<String>,
    /// Declared by the caller; never reconciled with the item totals.
    pub total: Amount,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Total {
    pub name: String,
    pub value: Amount,
    pub colored: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TextBlock {
    Title(String),
    Paragraph(String),
}

#[derive(Clone)]
pub struct Document {
    pub(crate) page_size: PageSize,
    pub(crate) margins: Margins,
    pub(crate) color: [u8; 3],
    pub(crate) column_opacity: f32,
    pub(crate) column_spacing: f32,
    pub(crate) currency: String,
    pub(crate) decimal_separator: String,
    pub(crate) thousands_separator: String,
    pub(crate) language: Language,
    pub(crate) timezone: Option<chrono_tz::Tz>,
    pub(crate) title: Option<String>,
    pub(crate) address: Option<String>,
    pub(crate) reference: Option<String>,
    pub(crate) po_number: Option<String>,
    pub(crate) date: Option<String>,
    pub(crate) time: Option<String>,
    pub(crate) due: Option<String>,
    pub(crate) payment_date: Option<String>,
    pub(crate) payment_method: Option<String>,
    pub(crate) period: Option<(String, String)>,
    pub(crate) logo: Option<Logo>,
    pub(crate) from: Vec<String>,
    pub(crate) to: Vec<String>,
    pub(crate) swap_from_to: bool,
    pub(crate) display_from_to: bool,
    pub(crate) sections: IndexMap<String, Section>,
    pub(crate) totals: Vec<Total>,
    pub(crate) texts: Vec<TextBlock>,
    pub(crate) badge: Option<String>,
    pub(crate) footnote: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(PageSize::A4, "$", Language::english())
    }
}

fn non_empty(s: impl Into<String>) -> Option<String> {
    let s = s.into();
    if s.is_empty() { None } else { Some(s) }
}

impl Document {
    pub fn new(page_size: PageSize, currency: &str, language: Language) -> Self {
        Self {
            page_size,
            margins: Margins::default(),
            color: [0x22, 0x22, 0x22],
            column_opacity: 0.06,
            column_spacing: COLUMN_SPACING,
            currency: currency.to_string(),
            decimal_separator: ".".into(),
            thousands_separator: ",".into(),
            language,
            timezone: None,
            title: None,
            address: None,
            reference: None,
            po_number: None,
            date: None,
            time: None,
            due: None,
            payment_date: None,
            payment_method: None,
            period: None,
            logo: None,
            from: Vec::new(),
            to: Vec::new(),
            swap_from_to: false,
            display_from_to: true,
            sections: IndexMap::new(),
            totals: Vec::new(),
            texts: Vec::new(),
            badge: None,
            footnote: None,
        }
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn set_color(&mut self, color: [u8; 3]) {
        self.color = color;
    }

    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), Error> {
        self.color = parse_hex_color(hex).ok_or_else(|| Error::InvalidColor(hex.to_string()))?;
        Ok(())
    }

    /// Background opacity of the table cells, clamped to 0..=1.
    pub fn set_column_opacity(&mut self, opacity: f32) {
        self.column_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_number_format(&mut self, decimal: &str, thousands: &str) {
        self.decimal_separator = decimal.to_string();
        self.thousands_separator = thousands.to_string();
    }

    /// Returns false, leaving the document untouched, for an empty or unknown
    /// IANA zone name.
    pub fn set_timezone(&mut self, zone: &str) -> bool {
        if zone.is_empty() {
            return false;
        }
        match zone.parse::<chrono_tz::Tz>() {
            Ok(tz) => {
                self.timezone = Some(tz);
                true
            }
            Err(_) => {
                log::debug!("rejected timezone {zone:?}");
                false
            }
        }
    }

    /// Set the date field to today in the configured timezone (UTC when unset).
    pub fn set_date_today(&mut self, format: &str) {
        let tz = self.timezone.unwrap_or(chrono_tz::UTC);
        let today = chrono::Utc::now().with_timezone(&tz);
        self.date = Some(today.format(format).to_string());
    }

    /// Document type printed as the title, e.g. "Invoice".
    pub fn set_type(&mut self, title: impl Into<String>) {
        self.title = non_empty(title);
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = non_empty(address);
    }

    pub fn set_reference(&mut self, reference: impl Into<String>) {
        self.reference = non_empty(reference);
    }

    pub fn set_po_number(&mut self, po: impl Into<String>) {
        self.po_number = non_empty(po);
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = non_empty(date);
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.time = non_empty(time);
    }

    pub fn set_due(&mut self, due: impl Into<String>) {
        self.due = non_empty(due);
    }

    pub fn set_payment_date(&mut self, date: impl Into<String>) {
        self.payment_date = non_empty(date);
    }

    pub fn set_payment_method(&mut self, method: impl Into<String>) {
        self.payment_method = non_empty(method);
    }

    /// Printed as "start - end"; both ends are required.
    pub fn set_period(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.period = match (non_empty(start), non_empty(end)) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        };
    }

    pub fn set_logo(&mut self, data: Vec<u8>, max_box: Option<(f32, f32)>) -> Result<(), Error> {
        self.logo = Some(Logo::from_bytes(data, max_box.unwrap_or(DEFAULT_LOGO_BOX))?);
        Ok(())
    }

    pub fn set_logo_file(&mut self, path: &Path, max_box: Option<(f32, f32)>) -> Result<(), Error> {
        let data = std::fs::read(path).map_err(|e| {
            Error::InvalidImage(format!("{}: {}", path.display(), e))
        })?;
        self.set_logo(data, max_box)
    }

    pub fn set_from<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.from = lines.iter().map(|l| to_ascii(l.as_ref())).collect();
    }

    pub fn set_to<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.to = lines.iter().map(|l| to_ascii(l.as_ref())).collect();
    }

    /// Toggle the exchange of the from/to blocks (labels and values).
    pub fn flip_from_to(&mut self) {
        self.swap_from_to = !self.swap_from_to;
    }

    pub fn hide_from_to(&mut self) {
        self.display_from_to = false;
    }

    /// Append `item` to the section `section.id`, creating the section on first use.
    pub fn add_item(&mut self, section: SectionInfo, item: Item) {
        let entry = self
            .sections
            .entry(section.id.clone())
            .or_insert_with(|| Section {
                id: section.id,
                name: to_ascii(&section.name),
                address: to_ascii(&section.address),
                supervisor: to_ascii(&section.supervisor),
                po_number: section.po_number.and_then(non_empty),
                total: section.total,
                items: Vec::new(),
            });
        entry.items.push(item);
    }

    pub fn add_total(&mut self, name: impl Into<String>, value: impl Into<Amount>, colored: bool) {
        self.totals.push(Total {
            name: name.into(),
            value: value.into(),
            colored,
        });
    }

    pub fn add_title(&mut self, title: impl Into<String>) {
        self.texts.push(TextBlock::Title(title.into()));
    }

    pub fn add_paragraph(&mut self, paragraph: &str) {
        self.texts.push(TextBlock::Paragraph(br_to_newline(paragraph)));
    }

    pub fn add_badge(&mut self, badge: impl Into<String>) {
        self.badge = non_empty(badge);
    }

    pub fn set_footnote(&mut self, note: &str) {
        self.footnote = non_empty(to_ascii(note));
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn timezone(&self) -> Option<chrono_tz::Tz> {
        self.timezone
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn logo(&self) -> Option<&Logo> {
        self.logo.as_ref()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn totals(&self) -> &[Total] {
        &self.totals
    }

    pub fn texts(&self) -> &[TextBlock] {
        &self.texts
    }

    pub fn from_lines(&self) -> &[String] {
        &self.from
    }

    pub fn to_lines(&self) -> &[String] {
        &self.to
    }

    pub fn is_from_to_swapped(&self) -> bool {
        self.swap_from_to
    }

    pub fn has_overtime_quantity(&self) -> bool {
        self.items().any(|i| i.quantity_ot.is_some())
    }

    pub fn has_overtime_price(&self) -> bool {
        self.items().any(|i| i.price_ot.is_some())
    }

    /// 5 base columns, 6 with overtime quantities, 7 with overtime prices.
    pub fn column_count(&self) -> usize {
        if self.has_overtime_price() {
            7
        } else if self.has_overtime_quantity() {
            6
        } else {
            5
        }
    }

    pub fn first_column_width(&self) -> f32 {
        if self.has_overtime_price() {
            FIRST_COLUMN_WIDTH_OT
        } else {
            FIRST_COLUMN_WIDTH
        }
    }

    fn items(&self) -> impl Iterator<Item = &Item> {
        self.sections.values().flat_map(|s| s.items.iter())
    }

    pub(crate) fn format_amount(&self, amount: &Amount) -> String {
        amount.format(&self.currency, &self.decimal_separator, &self.thousands_separator)
    }

    pub(crate) fn format_price(&self, value: f64) -> String {
        self.format_amount(&Amount::Number(value))
    }

    pub fn render(&self, name: &str, destination: Destination<'_>) -> Result<Output, Error> {
        crate::render(self, name, destination)
    }
}
