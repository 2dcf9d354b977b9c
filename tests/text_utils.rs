mod common;

use invoice_pdf::canvas::MM_PER_PT;
use invoice_pdf::layout::wrap_text;
use invoice_pdf::text::{br_to_newline, format_number, parse_hex_color, to_ascii};
use invoice_pdf::{Font, Label, Language};

/// One millimeter per character with [`common::FixedMeasure`].
fn mm_font() -> Font {
    Font::regular(2.0 / MM_PER_PT)
}

fn wrap(text: &str, width: f32) -> Vec<String> {
    wrap_text(text, width, mm_font(), &common::FixedMeasure)
}

#[test]
fn number_formatting() {
    assert_eq!(format_number(1234567.891, ".", ","), "1,234,567.89");
    assert_eq!(format_number(-1234.5, ".", ","), "-1,234.50");
    assert_eq!(format_number(0.0, ".", ","), "0.00");
    assert_eq!(format_number(999.999, ".", ","), "1,000.00");
    assert_eq!(format_number(0.125, ".", ","), "0.13");
    assert_eq!(format_number(1_000_000.0, ",", "."), "1.000.000,00");
    assert_eq!(format_number(1234.5, ".", ""), "1234.50");
    assert_eq!(format_number(100.0, ".", ","), "100.00");
}

#[test]
fn negative_values_rounding_to_zero_lose_their_sign() {
    assert_eq!(format_number(-0.001, ".", ","), "0.00");
    assert_eq!(format_number(-0.005, ".", ","), "-0.01");
}

#[test]
fn br_tags_become_newlines() {
    assert_eq!(br_to_newline("a<br>b<BR/>c<br />d<Br  >e"), "a\nb\nc\nd\ne");
    assert_eq!(br_to_newline("no tags <b>here</b>"), "no tags <b>here</b>");
}

#[test]
fn transliteration() {
    assert_eq!(
        to_ascii("Crème brûlée \u{2013} \u{201C}quoted\u{201D}"),
        "Creme brulee - \"quoted\""
    );
    assert_eq!(to_ascii("Ærøskøbing Straße"), "AEroskobing Strasse");
    assert_eq!(to_ascii("Total 50\u{20AC}"), "Total 50EUR");
    assert_eq!(to_ascii("価格 ok"), " ok");
    assert_eq!(to_ascii("plain ascii"), "plain ascii");
}

#[test]
fn hex_color_parsing() {
    assert_eq!(parse_hex_color("#ff8000"), Some([255, 128, 0]));
    assert_eq!(parse_hex_color("0A0B0C"), Some([10, 11, 12]));
    assert_eq!(parse_hex_color("#fff"), Some([255, 255, 255]));
    assert_eq!(parse_hex_color(" #123 "), Some([0x11, 0x22, 0x33]));
    assert_eq!(parse_hex_color("#12345"), None);
    assert_eq!(parse_hex_color("#gg0000"), None);
    assert_eq!(parse_hex_color("#ééé"), None);
}

#[test]
fn wrapping_keeps_words_whole() {
    assert_eq!(wrap("alpha beta gamma", 10.5), ["alpha beta", "gamma"]);
    assert_eq!(wrap("alpha beta gamma", 16.0), ["alpha beta gamma"]);
    assert_eq!(wrap("alpha  beta", 20.0), ["alpha beta"]);
}

#[test]
fn wrapping_splits_oversized_words() {
    assert_eq!(wrap("abcdefghijkl", 5.5), ["abcde", "fghij", "kl"]);
    assert_eq!(wrap("ab abcdefgh", 5.5), ["ab", "abcde", "fgh"]);
}

#[test]
fn wrapping_honours_newlines() {
    assert_eq!(wrap("a\n\nb", 50.0), ["a", "", "b"]);
    assert_eq!(wrap("a\r\nb\n", 50.0), ["a", "b"]);
    assert_eq!(wrap("", 50.0), [""]);
}

#[test]
fn language_lookup() {
    let nl = Language::from_code("nl-BE").expect("dutch");
    assert_eq!(nl.code(), "nl");
    assert_eq!(nl.get(Label::Date), "Datum");
    assert_eq!(nl.page_of(2, 5), "Pagina 2 van 5");

    assert!(Language::from_code("xx").is_none());
    assert_eq!(Language::from_code("DE").map(|l| l.code().to_string()), Some("de".into()));

    let en = Language::default();
    assert_eq!(en.code(), "en");
    assert_eq!(en.page_of(1, 3), "Page 1 of 3");
    assert_eq!(en.get(Label::To), "Billing to");
}

#[test]
fn labels_can_be_overridden() {
    let mut lang = Language::english();
    lang.set(Label::To, "Invoice to");
    lang.set(Label::Page, "Sheet");
    assert_eq!(lang.get(Label::To), "Invoice to");
    assert_eq!(lang.page_of(4, 4), "Sheet 4 of 4");
    assert_eq!(lang.get(Label::From), "Our information");
}

#[test]
fn label_keys_round_trip() {
    for label in Label::ALL {
        assert_eq!(Label::from_key(label.key()), Some(label));
    }
    assert_eq!(Label::from_key("nonsense"), None);
}
