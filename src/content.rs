//! Turns buffered page contents into PDF content stream operators.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{LineLayout, PageContents, SpanFont, SpanLayout};
use crate::Result;
use id_arena::Arena;
use std::io::Write;

pub(crate) fn render_contents(contents: &[PageContents], fonts: &Arena<Font>) -> Result<Vec<u8>> {
    let mut content: Vec<u8> = Vec::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(spans) => render_text_spans(&mut content, spans, fonts)?,
            PageContents::Line(line) => render_line(&mut content, line)?,
        }
    }

    Ok(content)
}

fn render_text_spans(
    content: &mut Vec<u8>,
    spans: &[SpanLayout],
    fonts: &Arena<Font>,
) -> Result<()> {
    let Some(first) = spans.first() else {
        return Ok(());
    };

    writeln!(content, "q")?;

    let mut current_font: SpanFont = first.font;
    let mut current_colour: Colour = first.colour;
    writeln!(
        content,
        "/F{} {} Tf",
        current_font.id.index(),
        current_font.size
    )?;
    current_colour.write_fill(content)?;

    for span in spans.iter() {
        if span.font != current_font {
            current_font = span.font;
            writeln!(
                content,
                "/F{} {} Tf",
                current_font.id.index(),
                current_font.size
            )?;
        }
        if span.colour != current_colour {
            current_colour = span.colour;
            current_colour.write_fill(content)?;
        }

        writeln!(content, "BT")?;
        writeln!(content, "{} {} Td", span.coords.0, span.coords.1)?;
        fonts[current_font.id].encode(&span.text, content)?;
        writeln!(content, " Tj")?;
        writeln!(content, "ET")?;
    }

    writeln!(content, "Q")?;
    Ok(())
}

fn render_line(content: &mut Vec<u8>, line: &LineLayout) -> Result<()> {
    writeln!(content, "q")?;
    line.colour.write_stroke(content)?;
    writeln!(content, "{} w", line.width)?;
    writeln!(content, "{} {} m", line.from.0, line.from.1)?;
    writeln!(content, "{} {} l", line.to.0, line.to.1)?;
    writeln!(content, "S")?;
    writeln!(content, "Q")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::BuiltinFont;
    use crate::units::Pt;

    #[test]
    fn groups_text_under_one_graphics_state() {
        let mut fonts = Arena::new();
        let courier = fonts.alloc(Font::builtin(BuiltinFont::Courier));
        let span = |text: &str, y: f32| SpanLayout {
            text: text.to_string(),
            font: SpanFont {
                id: courier,
                size: Pt(12.0),
            },
            colour: colours::BLACK,
            coords: (Pt(50.0), Pt(y)),
        };
        let contents = vec![PageContents::Text(vec![span("one", 700.0), span("two", 688.0)])];

        let rendered = String::from_utf8(render_contents(&contents, &fonts).unwrap()).unwrap();
        assert_eq!(
            rendered,
            "q\n/F0 12 Tf\n0 g\nBT\n50 700 Td\n(one) Tj\nET\nBT\n50 688 Td\n(two) Tj\nET\nQ\n"
        );
    }

    #[test]
    fn strokes_lines() {
        let line = LineLayout {
            from: (Pt(0.0), Pt(10.0)),
            to: (Pt(100.0), Pt(10.0)),
            width: Pt(0.1),
            colour: colours::BLACK,
        };
        let rendered =
            String::from_utf8(render_contents(&[PageContents::Line(line)], &Arena::new()).unwrap())
                .unwrap();
        assert_eq!(rendered, "q\n0 G\n0.1 w\n0 10 m\n100 10 l\nS\nQ\n");
    }
}
