use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static BR_TAG: OnceLock<Regex> = OnceLock::new();

/// Replace `<br>`, `<br/>` and `<br />` tags (any case) with `\n`.
pub fn br_to_newline(text: &str) -> String {
    let re = BR_TAG.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("static pattern"));
    re.replace_all(text, "\n").into_owned()
}

/// Letters that have no canonical decomposition into an ASCII base.
fn ascii_fallback(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'þ' => "th",
        'Þ' => "Th",
        'ı' => "i",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2013}' | '\u{2014}' | '\u{2212}' => "-",
        '\u{2026}' => "...",
        '\u{20AC}' => "EUR",
        '\u{00A0}' | '\u{2007}' | '\u{202F}' => " ",
        '\u{2022}' => "*",
        _ => return None,
    })
}

/// Transliterate to plain ASCII so the text survives the canvas' single-byte
/// encoding. Accents are stripped, a handful of ligatures and punctuation get
/// spelled out, everything else without an ASCII form is dropped.
pub fn to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if let Some(s) = ascii_fallback(c) {
            out.push_str(s);
            continue;
        }
        for d in c.nfkd() {
            if d.is_ascii() {
                out.push(d);
            } else if !is_combining_mark(d)
                && let Some(s) = ascii_fallback(d)
            {
                out.push_str(s);
            }
        }
    }
    out
}

/// Format with two decimals, `decimal` between the integer and fractional
/// part and `thousands` between each group of three integer digits.
/// Halves round away from zero.
pub fn format_number(value: f64, decimal: &str, thousands: &str) -> String {
    let cents = (value.abs() * 100.0).round() as u128;
    let negative = value < 0.0 && cents > 0;
    let int_part = (cents / 100).to_string();
    let frac_part = cents % 100;

    let grouped = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(thousands);

    format!(
        "{}{}{}{:02}",
        if negative { "-" } else { "" },
        grouped,
        decimal,
        frac_part
    )
}

/// `#rgb` or `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    let hex = val.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        _ => None,
    }
}
