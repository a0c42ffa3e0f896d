use crate::page::{LineLayout, Page, PageContents, SpanLayout};

/// The drawable side of a page: draw commands are buffered here and only land
/// on the [Page] once the surface is flushed.
///
/// Flushing drains the buffer, so flushing twice never duplicates content.
#[derive(Debug, Default)]
pub struct Surface {
    pending: Vec<PageContents>,
}

impl Surface {
    pub fn open() -> Surface {
        Surface::default()
    }

    pub fn draw_text(&mut self, span: SpanLayout) {
        match self.pending.last_mut() {
            Some(PageContents::Text(spans)) => spans.push(span),
            _ => self.pending.push(PageContents::Text(vec![span])),
        }
    }

    pub fn draw_line(&mut self, line: LineLayout) {
        self.pending.push(PageContents::Line(line));
    }

    /// Whether there is anything waiting to be flushed
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move everything drawn so far onto `page`
    pub fn flush_into(&mut self, page: &mut Page) {
        for content in self.pending.drain(..) {
            match content {
                PageContents::Text(spans) => spans.into_iter().for_each(|span| page.add_span(span)),
                PageContents::Line(line) => page.add_line(line),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::pagesize::LETTER;
    use crate::units::Pt;

    fn line() -> LineLayout {
        LineLayout {
            from: (Pt(0.0), Pt(0.0)),
            to: (Pt(10.0), Pt(10.0)),
            width: Pt(0.1),
            colour: colours::BLACK,
        }
    }

    #[test]
    fn flushing_is_idempotent() {
        let mut page = Page::new(LETTER, None);
        let mut surface = Surface::open();
        surface.draw_line(line());
        assert!(!surface.is_empty());

        surface.flush_into(&mut page);
        surface.flush_into(&mut page);

        assert!(surface.is_empty());
        assert_eq!(page.contents, vec![PageContents::Line(line())]);
    }
}
