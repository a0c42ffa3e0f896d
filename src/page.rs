use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::{PagerError, Result};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Name, Pdf, Ref};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A run of text placed with its baseline starting at `coords`
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

/// A straight stroke between two points
#[derive(Clone, PartialEq, Debug)]
pub struct LineLayout {
    pub from: (Pt, Pt),
    pub to: (Pt, Pt),
    pub width: Pt,
    pub colour: Colour,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    Line(LineLayout),
}

/// A single physical page and everything drawn onto it
#[derive(Clone, Debug)]
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content is meant to live, i.e. within the margins
    pub content_box: Rect,
    /// Draw commands, in painting order
    pub contents: Vec<PageContents>,
}

impl Page {
    /// Create a blank page. Without margins the content box covers the whole page.
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let (width, height) = size;
        let margins = margins.unwrap_or_else(Margins::empty);
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
        }
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        match self.contents.last_mut() {
            Some(PageContents::Text(spans)) => spans.push(span),
            _ => self.contents.push(PageContents::Text(vec![span])),
        }
    }

    pub fn add_line(&mut self, line: LineLayout) {
        self.contents.push(PageContents::Line(line));
    }

    /// Iterate over every text span on the page, in painting order
    pub fn spans(&self) -> impl Iterator<Item = &SpanLayout> {
        self.contents.iter().flat_map(|content| {
            let spans: &[SpanLayout] = match content {
                PageContents::Text(spans) => spans,
                PageContents::Line(_) => &[],
            };
            spans
        })
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        font_refs: &[(Id<Font>, Ref)],
        fonts: &Arena<Font>,
        writer: &mut Pdf,
    ) -> Result<()> {
        let id = refs
            .get(RefType::Page(page_index))
            .ok_or(PagerError::PageMissing)?;
        let parent = refs
            .get(RefType::PageTree)
            .ok_or(PagerError::PageMissing)?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(parent);
        page.contents(content_id);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        let in_use = font_refs
            .iter()
            .filter(|(font_id, _)| self.spans().any(|span| span.font.id == *font_id));
        for (font_id, font_ref) in in_use {
            resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), *font_ref);
        }
        resource_fonts.finish();
        resources.finish();
        page.finish();

        let rendered = render_contents(&self.contents, fonts)?;
        writer.stream(content_id, rendered.as_slice());
        Ok(())
    }
}
