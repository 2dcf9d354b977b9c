use crate::canvas::{Font, TextMeasure};

/// Break `text` into lines no wider than `max_width`.
/// Explicit `\n` always breaks; words are kept whole unless a single word is
/// wider than the line, in which case it is split between characters. A
/// trailing newline does not produce an extra empty line. Always returns at
/// least one (possibly empty) line.
pub fn wrap_text(text: &str, max_width: f32, font: Font, measure: &dyn TextMeasure) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.strip_suffix('\n').unwrap_or(&text);
    let space_w = measure.string_width(" ", font);

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let word_w = measure.string_width(word, font);
            let proposed = if current.is_empty() {
                word_w
            } else {
                current_w + space_w + word_w
            };
            if proposed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = proposed;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }
            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
                continue;
            }
            // Oversized word: fill lines character by character.
            for ch in word.chars() {
                let mut buf = [0u8; 4];
                let ch_w = measure.string_width(ch.encode_utf8(&mut buf), font);
                if !current.is_empty() && current_w + ch_w > max_width {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(ch);
                current_w += ch_w;
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
