use crate::font::Font;
use crate::units::Pt;
use crate::Result;

/// Calculate the width of a given string of text given the font and font size.
/// Font metrics are in 1000-unit glyph space, so the width scales linearly with `size`.
pub fn width_of_text(text: &str, font: &Font, size: Pt) -> Result<Pt> {
    Ok(Pt(font.width(text)? * size.0 / 1000.0))
}

/// Wraps `text` into lines no wider than `max_width`.
///
/// Words are separated by single spaces and packed greedily: a word joins the
/// current line if the line, the separating space and the word still fit.
/// Otherwise the line is emitted and the word starts a new one. A word that is
/// wider than `max_width` on its own is placed alone on a line, never split.
///
/// Trailing spaces are ignored. Repeated spaces elsewhere yield empty words,
/// which keep their separating space like any other word.
///
/// The last line is always emitted, so empty input yields a single empty line.
/// Fails if the font has no glyph for some character of `text`.
pub fn fit_to_width(text: &str, max_width: Pt, font: &Font, font_size: Pt) -> Result<Vec<String>> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_has_words = false;

    let mut words: Vec<&str> = text.split(' ').collect();
    while words.len() > 1 && words.last() == Some(&"") {
        words.pop();
    }

    for word in words {
        if !line_has_words {
            // the first word always fits, but must still be measurable
            width_of_text(word, font, font_size)?;
            line.push_str(word);
            line_has_words = true;
            continue;
        }

        let candidate = format!("{line} {word}");
        if width_of_text(&candidate, font, font_size)? <= max_width {
            line = candidate;
        } else {
            width_of_text(word, font, font_size)?;
            lines.push(std::mem::replace(&mut line, word.to_string()));
        }
    }

    lines.push(line);
    Ok(lines)
}
