use crate::{
    font::Font,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    PagerError, Result,
};
use id_arena::{Arena, Id};
use pdf_writer::{Pdf, Ref};
use std::collections::HashSet;
use std::io::Write;

/// The shared output document that every pager's pages are moved into when a
/// [Controller](crate::Controller) is finalized.
#[derive(Default)]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// Take ownership of a whole page sequence, appending it in order
    pub fn append_pages<I: IntoIterator<Item = Page>>(&mut self, pages: I) {
        for page in pages {
            self.add_page(page);
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// The page at a 0-based position in the document
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.page_order.get(index).and_then(|&id| self.pages.get(id))
    }

    /// Render the entire document in memory, then write it out. Spans refer to
    /// `fonts` by arena id; only fonts some span uses are written.
    pub fn write<W: Write>(self, fonts: &Arena<Font>, mut w: W) -> Result<()> {
        let Document {
            info,
            pages,
            page_order,
        } = self;

        let mut refs = ObjectReferences::new();
        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        let page_refs: Vec<Ref> = (0..page_order.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs.iter().copied());

        let used: HashSet<Id<Font>> = page_order
            .iter()
            .filter_map(|id| pages.get(*id))
            .flat_map(|page| page.spans().map(|span| span.font.id))
            .collect();
        let font_refs: Vec<(Id<Font>, Ref)> = fonts
            .iter()
            .filter(|(id, _)| used.contains(id))
            .map(|(id, font)| (id, font.write(&mut refs, id, &mut writer)))
            .collect();

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(PagerError::PageMissing)?;
            page.write(&mut refs, page_index, &font_refs, fonts, &mut writer)?;
        }

        writer.catalog(catalog_id).pages(page_tree_id);

        w.write_all(writer.finish().as_slice())?;
        w.flush()?;
        Ok(())
    }
}
