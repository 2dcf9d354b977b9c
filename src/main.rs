use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use invoice_pdf::{
    Amount, Destination, Document, FontSet, Item, Language, PageSize, PdfCanvas, SectionInfo,
    Skill,
};

#[derive(Parser)]
#[command(name = "invoice-pdf", version, about = "Render a JSON invoice description to PDF")]
struct Cli {
    /// Invoice description (JSON)
    input: PathBuf,
    /// Output PDF path (defaults to the input path with a .pdf extension)
    output: Option<PathBuf>,
    /// Label language as an ISO code, e.g. en, nl, fr, de, es, it
    #[arg(long, default_value = "en")]
    lang: String,
    #[arg(long, value_enum, default_value = "a4")]
    size: Size,
    #[arg(long, default_value = "$")]
    currency: String,
    /// TrueType face to embed for regular text
    #[arg(long, value_name = "TTF")]
    font_regular: Option<PathBuf>,
    /// TrueType face to embed for bold text (requires --font-regular)
    #[arg(long, value_name = "TTF", requires = "font_regular")]
    font_bold: Option<PathBuf>,
    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Size {
    A4,
    Letter,
    Legal,
}

impl From<Size> for PageSize {
    fn from(size: Size) -> Self {
        match size {
            Size::A4 => PageSize::A4,
            Size::Letter => PageSize::Letter,
            Size::Legal => PageSize::Legal,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonAmount {
    Number(f64),
    Text(String),
}

impl From<JsonAmount> for Amount {
    fn from(a: JsonAmount) -> Self {
        match a {
            JsonAmount::Number(n) => Amount::Number(n),
            JsonAmount::Text(s) => Amount::parse(&s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDescription {
    Text(String),
    Grid(Vec<Vec<String>>),
}

#[derive(Deserialize)]
struct JsonItem {
    name: String,
    description: Option<JsonDescription>,
    #[serde(default)]
    skills: Vec<String>,
    total_quantity: String,
    quantity: String,
    quantity_ot: Option<String>,
    price: f64,
    price_ot: Option<JsonAmount>,
    total: f64,
}

#[derive(Deserialize)]
struct JsonSection {
    id: String,
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    supervisor: String,
    po_number: Option<String>,
    total: JsonAmount,
    items: Vec<JsonItem>,
}

#[derive(Deserialize)]
struct JsonTotal {
    name: String,
    value: JsonAmount,
    #[serde(default)]
    colored: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum JsonText {
    Title(String),
    Paragraph(String),
}

#[derive(Deserialize)]
struct NumberFormat {
    decimal: String,
    thousands: String,
}

#[derive(Deserialize)]
struct JsonInvoice {
    title: Option<String>,
    address: Option<String>,
    reference: Option<String>,
    po_number: Option<String>,
    date: Option<String>,
    /// strftime pattern; sets the date to today in `timezone`
    date_today: Option<String>,
    time: Option<String>,
    due: Option<String>,
    payment_date: Option<String>,
    payment_method: Option<String>,
    period: Option<(String, String)>,
    color: Option<String>,
    timezone: Option<String>,
    number_format: Option<NumberFormat>,
    logo: Option<PathBuf>,
    #[serde(default)]
    from: Vec<String>,
    #[serde(default)]
    to: Vec<String>,
    #[serde(default)]
    flip_from_to: bool,
    #[serde(default)]
    hide_from_to: bool,
    #[serde(default)]
    sections: Vec<JsonSection>,
    #[serde(default)]
    totals: Vec<JsonTotal>,
    #[serde(default)]
    texts: Vec<JsonText>,
    badge: Option<String>,
    footnote: Option<String>,
}

fn build_document(invoice: JsonInvoice, cli: &Cli, base_dir: &Path) -> Result<Document, String> {
    let language = Language::from_code(&cli.lang).unwrap_or_else(|| {
        log::warn!("no labels for language {:?}; using English", cli.lang);
        Language::english()
    });
    let mut doc = Document::new(cli.size.into(), &cli.currency, language);

    if let Some(zone) = &invoice.timezone
        && !doc.set_timezone(zone)
    {
        log::warn!("unknown timezone {zone:?}; dates use UTC");
    }
    if let Some(color) = &invoice.color {
        doc.set_color_hex(color).map_err(|e| e.to_string())?;
    }
    if let Some(format) = &invoice.number_format {
        doc.set_number_format(&format.decimal, &format.thousands);
    }
    if let Some(logo) = &invoice.logo {
        doc.set_logo_file(&base_dir.join(logo), None).map_err(|e| e.to_string())?;
    }

    let fields: [(Option<String>, fn(&mut Document, String)); 9] = [
        (invoice.title, |d, v| d.set_type(v)),
        (invoice.address, |d, v| d.set_address(v)),
        (invoice.reference, |d, v| d.set_reference(v)),
        (invoice.po_number, |d, v| d.set_po_number(v)),
        (invoice.date, |d, v| d.set_date(v)),
        (invoice.time, |d, v| d.set_time(v)),
        (invoice.due, |d, v| d.set_due(v)),
        (invoice.payment_date, |d, v| d.set_payment_date(v)),
        (invoice.payment_method, |d, v| d.set_payment_method(v)),
    ];
    for (value, set) in fields {
        if let Some(v) = value {
            set(&mut doc, v);
        }
    }
    if let Some(format) = &invoice.date_today {
        doc.set_date_today(format);
    }
    if let Some((start, end)) = invoice.period {
        doc.set_period(start, end);
    }

    doc.set_from(&invoice.from);
    doc.set_to(&invoice.to);
    if invoice.flip_from_to {
        doc.flip_from_to();
    }
    if invoice.hide_from_to {
        doc.hide_from_to();
    }

    for section in invoice.sections {
        let mut info = SectionInfo::new(section.id, section.name)
            .address(section.address)
            .supervisor(section.supervisor)
            .total(Amount::from(section.total));
        if let Some(po) = section.po_number {
            info = info.po_number(po);
        }
        for it in section.items {
            let mut item = Item::new(it.name, it.total_quantity, it.quantity, it.price, it.total)
                .with_skills(it.skills.into_iter().map(Skill::new).collect());
            item = match it.description {
                Some(JsonDescription::Text(text)) => item.with_text_description(&text),
                Some(JsonDescription::Grid(rows)) => item.with_grid_description(rows),
                None => item,
            };
            if let Some(q) = it.quantity_ot {
                item = item.with_overtime_quantity(q);
            }
            if let Some(p) = it.price_ot {
                item = item.with_overtime_price(Amount::from(p));
            }
            doc.add_item(info.clone(), item);
        }
    }

    for total in invoice.totals {
        doc.add_total(total.name, Amount::from(total.value), total.colored);
    }
    for text in invoice.texts {
        match text {
            JsonText::Title(t) => doc.add_title(t),
            JsonText::Paragraph(p) => doc.add_paragraph(&p),
        }
    }
    if let Some(badge) = invoice.badge {
        doc.add_badge(badge);
    }
    if let Some(note) = &invoice.footnote {
        doc.set_footnote(note);
    }
    Ok(doc)
}

fn run(cli: &Cli) -> Result<PathBuf, String> {
    let json = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let invoice: JsonInvoice =
        serde_json::from_str(&json).map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let base_dir = cli.input.parent().unwrap_or(Path::new("."));
    let doc = build_document(invoice, cli, base_dir)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    let name = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice")
        .to_string();

    match &cli.font_regular {
        Some(regular) => {
            let fonts = FontSet::from_files(regular, cli.font_bold.as_deref())
                .map_err(|e| e.to_string())?;
            let mut canvas = PdfCanvas::with_fonts(fonts);
            let bytes = invoice_pdf::render_with(&doc, &mut canvas, &name).map_err(|e| e.to_string())?;
            std::fs::write(&output, bytes).map_err(|e| format!("{}: {e}", output.display()))?;
        }
        None => {
            doc.render(&name, Destination::File(&output))
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(output)
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(output) => println!("Wrote {}", output.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
