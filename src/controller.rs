use crate::colour::{colours, Colour};
use crate::document::Document;
use crate::font::{BuiltinFont, Font, FontStyle};
use crate::info::Info;
use crate::layout::Margins;
use crate::pager::Pager;
use crate::pagesize::{self, PageSize};
use crate::units::Pt;
use crate::{PagerError, Result};
use id_arena::{Arena, Id};
use log::{debug, info, trace};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

/// Font size used whenever a pager has no size override
pub const STANDARD_FONT_SIZE: Pt = Pt(12.0);
/// Text colour used whenever a pager has no colour override
pub const STANDARD_TEXT_COLOUR: Colour = colours::BLACK;
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;
pub const UNDER_LINE_FACTOR: f32 = 1.1;
/// Subtracted from every line advance to tighten the leading
pub const UNDER_LINE_CORRECTION: Pt = Pt(3.0);

/// The four fonts of a family, as ids into the controller's font arena
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FontSet {
    pub regular: Id<Font>,
    pub bold: Id<Font>,
    pub italic: Id<Font>,
    pub bold_italic: Id<Font>,
}

impl FontSet {
    pub fn get(&self, style: FontStyle) -> Id<Font> {
        match style {
            FontStyle::Regular => self.regular,
            FontStyle::Bold => self.bold,
            FontStyle::Italic => self.italic,
            FontStyle::BoldItalic => self.bold_italic,
        }
    }

    fn set(&mut self, style: FontStyle, id: Id<Font>) {
        match style {
            FontStyle::Regular => self.regular = id,
            FontStyle::Bold => self.bold = id,
            FontStyle::Italic => self.italic = id,
            FontStyle::BoldItalic => self.bold_italic = id,
        }
    }
}

/// State every pager reads through its handle on the controller
pub(crate) struct Shared {
    pub(crate) margins: Margins,
    pub(crate) page_size: PageSize,
    pub(crate) fonts: Arena<Font>,
    pub(crate) font_set: FontSet,
}

impl Shared {
    pub(crate) fn font(&self, style: FontStyle) -> &Font {
        &self.fonts[self.font_set.get(style)]
    }
}

/// Identifies a pager registered with a [Controller]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PagerId(usize);

/// Owns the configuration shared by all pagers and assembles the final document.
///
/// Margins and page size are fixed at construction. Fonts can be swapped at any
/// time before [Controller::finalize], and every pager built against this
/// controller sees the new font for everything it measures or draws afterwards.
/// Pages are written out in the order their pagers were registered.
pub struct Controller {
    shared: Rc<RefCell<Shared>>,
    pagers: Vec<Pager>,
    info: Option<Info>,
}

impl Controller {
    /// A controller laying out US Letter pages with the built-in Courier family
    pub fn new(margins: Margins) -> Controller {
        Controller::with_page_size(margins, pagesize::LETTER)
    }

    pub fn with_page_size(margins: Margins, page_size: PageSize) -> Controller {
        let mut fonts = Arena::new();
        let mut builtin = |style| fonts.alloc(Font::builtin(BuiltinFont::for_style(style)));
        let font_set = FontSet {
            regular: builtin(FontStyle::Regular),
            bold: builtin(FontStyle::Bold),
            italic: builtin(FontStyle::Italic),
            bold_italic: builtin(FontStyle::BoldItalic),
        };

        Controller {
            shared: Rc::new(RefCell::new(Shared {
                margins,
                page_size,
                fonts,
                font_set,
            })),
            pagers: Vec::new(),
            info: None,
        }
    }

    pub(crate) fn shared(&self) -> &Rc<RefCell<Shared>> {
        &self.shared
    }

    pub fn margins(&self) -> Margins {
        self.shared.borrow().margins
    }

    pub fn page_size(&self) -> PageSize {
        self.shared.borrow().page_size
    }

    /// The font currently used for a style
    pub fn font(&self, style: FontStyle) -> Id<Font> {
        self.shared.borrow().font_set.get(style)
    }

    pub fn font_set(&self) -> FontSet {
        self.shared.borrow().font_set
    }

    /// Replace the font for `style` with a TTF / OTF file
    pub fn set_font<P: AsRef<Path>>(&mut self, style: FontStyle, path: P) -> Result<Id<Font>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PagerError::FontNotFound(path.to_path_buf()));
        }
        trace!("loading {style:?} font from {}", path.display());
        let bytes = std::fs::read(path)?;
        self.set_font_bytes(style, bytes)
    }

    /// Replace the font for `style` with an already-read TTF / OTF font
    pub fn set_font_bytes(&mut self, style: FontStyle, bytes: Vec<u8>) -> Result<Id<Font>> {
        let font = Font::load(bytes)?;
        Ok(self.install(style, font))
    }

    /// Replace the font for `style` with one of the built-in fonts
    pub fn set_builtin_font(&mut self, style: FontStyle, font: BuiltinFont) -> Id<Font> {
        self.install(style, Font::builtin(font))
    }

    /// Replace all four fonts at once, stopping at the first one that fails to load
    pub fn set_fonts<P: AsRef<Path>>(
        &mut self,
        regular: P,
        bold: P,
        italic: P,
        bold_italic: P,
    ) -> Result<()> {
        self.set_font(FontStyle::Regular, regular)?;
        self.set_font(FontStyle::Bold, bold)?;
        self.set_font(FontStyle::Italic, italic)?;
        self.set_font(FontStyle::BoldItalic, bold_italic)?;
        Ok(())
    }

    fn install(&mut self, style: FontStyle, font: Font) -> Id<Font> {
        let mut shared = self.shared.borrow_mut();
        debug!("using {} for {style:?} text", font.name());
        let id = shared.fonts.alloc(font);
        shared.font_set.set(style, id);
        id
    }

    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Build a new pager against this controller and register it
    pub fn new_pager(&mut self) -> PagerId {
        let pager = Pager::new(self);
        self.push(pager)
    }

    /// Register a pager. Its pages will follow those of every pager registered before it.
    pub fn register(&mut self, pager: Pager) -> Result<PagerId> {
        if !Rc::ptr_eq(pager.shared(), &self.shared) {
            return Err(PagerError::ForeignPager);
        }
        Ok(self.push(pager))
    }

    fn push(&mut self, pager: Pager) -> PagerId {
        let id = PagerId(self.pagers.len());
        debug!("registered pager #{} with {} page(s)", id.0, pager.page_count());
        self.pagers.push(pager);
        id
    }

    pub fn pager(&self, id: PagerId) -> Option<&Pager> {
        self.pagers.get(id.0)
    }

    pub fn pager_mut(&mut self, id: PagerId) -> Option<&mut Pager> {
        self.pagers.get_mut(id.0)
    }

    pub fn pager_count(&self) -> usize {
        self.pagers.len()
    }

    /// Write every registered pager's pages, in registration order, to a PDF at `path`.
    ///
    /// Consumes the controller: pagers and fonts are released whether or not writing
    /// succeeds. Fails with [PagerError::NoPagers] before touching the file system if
    /// nothing was registered. After a failure the file at `path` may be incomplete.
    pub fn finalize<P: AsRef<Path>>(self, path: P) -> Result<()> {
        if self.pagers.is_empty() {
            return Err(PagerError::NoPagers);
        }
        let path = path.as_ref();
        info!("writing document to {}", path.display());
        let file = File::create(path)?;
        self.finalize_to(BufWriter::new(file))
    }

    /// Like [Controller::finalize], but writes the PDF to an arbitrary writer
    pub fn finalize_to<W: Write>(self, w: W) -> Result<()> {
        let Controller {
            shared,
            pagers,
            info,
        } = self;
        if pagers.is_empty() {
            return Err(PagerError::NoPagers);
        }

        let mut document = Document::new();
        if let Some(info) = info {
            document.set_info(info);
        }
        for (index, pager) in pagers.into_iter().enumerate() {
            let pages = pager.into_pages();
            debug!("moving {} page(s) of pager #{index}", pages.len());
            document.append_pages(pages);
        }
        info!("writing {} page(s)", document.page_count());

        let shared = shared.borrow();
        document.write(&shared.fonts, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Controller {
        Controller::new(Margins::all(Pt(50.0)))
    }

    #[test]
    fn defaults_to_the_courier_family() {
        let controller = controller();
        let shared = controller.shared().borrow();
        assert_eq!(shared.font(FontStyle::Regular).name(), "Courier");
        assert_eq!(shared.font(FontStyle::Bold).name(), "Courier-Bold");
        assert_eq!(shared.font(FontStyle::Italic).name(), "Courier-Oblique");
        assert_eq!(shared.font(FontStyle::BoldItalic).name(), "Courier-BoldOblique");
        assert_eq!(shared.page_size, pagesize::LETTER);
    }

    #[test]
    fn finalizing_nothing_is_an_error_without_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        assert!(matches!(
            controller().finalize(&path),
            Err(PagerError::NoPagers)
        ));
        assert!(!path.exists());

        let mut out = Vec::new();
        assert!(matches!(
            controller().finalize_to(&mut out),
            Err(PagerError::NoPagers)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_font_files_are_reported() {
        let mut controller = controller();
        let before = controller.font(FontStyle::Bold);
        let result = controller.set_font(FontStyle::Bold, "/no/such/dir/font.ttf");
        assert!(matches!(result, Err(PagerError::FontNotFound(_))));
        assert_eq!(controller.font(FontStyle::Bold), before);
    }

    #[test]
    fn unparsable_font_files_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a font at all").unwrap();

        let mut controller = controller();
        let result = controller.set_font(FontStyle::Regular, file.path());
        assert!(matches!(result, Err(PagerError::FaceParsing(_))));
    }

    #[test]
    fn loaded_fonts_replace_their_style() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/DejaVuSansMono.ttf");
        let mut controller = controller();
        let before = controller.font_set();
        let id = controller.set_font(FontStyle::Regular, path).unwrap();

        assert_eq!(controller.font(FontStyle::Regular), id);
        assert_ne!(id, before.regular);
        assert_eq!(controller.font(FontStyle::Bold), before.bold);
        let shared = controller.shared().borrow();
        assert!(!shared.font(FontStyle::Regular).is_builtin());
        assert_eq!(shared.font(FontStyle::Regular).name(), "DejaVu Sans Mono");
    }

    #[test]
    fn swapping_a_font_only_touches_its_style() {
        let mut controller = controller();
        let before = controller.font_set();
        let id = controller.set_builtin_font(FontStyle::Italic, BuiltinFont::CourierBold);

        let after = controller.font_set();
        assert_eq!(after.italic, id);
        assert_ne!(after.italic, before.italic);
        assert_eq!(after.regular, before.regular);
        assert_eq!(after.bold, before.bold);
        assert_eq!(after.bold_italic, before.bold_italic);
    }

    #[test]
    fn pagers_from_other_controllers_are_rejected() {
        let other = controller();
        let stray = Pager::new(&other);

        let mut controller = controller();
        assert!(matches!(
            controller.register(stray),
            Err(PagerError::ForeignPager)
        ));
        let id = controller.register(Pager::new(&controller)).unwrap();
        assert_eq!(controller.pager_count(), 1);
        assert!(controller.pager(id).is_some());
    }
}
