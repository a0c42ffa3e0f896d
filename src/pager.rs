use crate::colour::Colour;
use crate::controller::{
    Controller, Shared, LINE_HEIGHT_FACTOR, STANDARD_FONT_SIZE, STANDARD_TEXT_COLOUR,
    UNDER_LINE_CORRECTION, UNDER_LINE_FACTOR,
};
use crate::font::{Font, FontStyle};
use crate::layout::{fit_to_width, width_of_text, Margins};
use crate::page::{LineLayout, Page, SpanFont, SpanLayout};
use crate::surface::Surface;
use crate::units::Pt;
use crate::Result;
use id_arena::Id;
use log::{debug, trace};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// Stroke width of [Pager::draw_line]
const LINE_STROKE: Pt = Pt(0.1);

/// The content-specific half of a pager: draws one payload onto a [Pager].
///
/// Implementations call [Pager::draw_text], [Pager::advance_line] and
/// [Pager::advance_page] (when [Pager::y_overflowed]) as they see fit. Closures
/// taking `(&mut Pager, T)` implement this trait too.
pub trait PrintContent<T> {
    fn print_content(&mut self, pager: &mut Pager, payload: T) -> Result<()>;
}

impl<T, F> PrintContent<T> for F
where
    F: FnMut(&mut Pager, T) -> Result<()>,
{
    fn print_content(&mut self, pager: &mut Pager, payload: T) -> Result<()> {
        self(pager, payload)
    }
}

/// Layout state of one logical section of a document.
///
/// A pager owns a private sequence of pages and a writing cursor `(x, y)` on
/// the last of them. `y` is a baseline measured from the bottom of the page and
/// starts just below the top margin; `x` starts at the left margin.
///
/// Nothing is clamped: the cursor happily moves past the margins. Check
/// [Pager::y_overflowed] / [Pager::x_overflowed] before drawing, or use
/// [Pager::ensure_room] which starts a new page when the current one is full.
///
/// Fonts, margins and page size are read through the [Controller] the pager
/// was built against, so font changes on the controller apply immediately.
pub struct Pager {
    shared: Rc<RefCell<Shared>>,
    pages: Vec<Page>,
    surface: Surface,
    x: Pt,
    y: Pt,
    font_size: Option<Pt>,
    colour: Option<Colour>,
}

impl Pager {
    /// A pager with a single blank page and the cursor at the top left margin
    pub fn new(controller: &Controller) -> Pager {
        let shared = Rc::clone(controller.shared());
        let (margins, page_size) = {
            let shared = shared.borrow();
            (shared.margins, shared.page_size)
        };

        Pager {
            pages: vec![Page::new(page_size, Some(margins))],
            surface: Surface::open(),
            x: margins.left,
            y: page_size.1 - margins.top,
            shared,
            font_size: None,
            colour: None,
        }
    }

    pub(crate) fn shared(&self) -> &Rc<RefCell<Shared>> {
        &self.shared
    }

    fn state(&self) -> Ref<'_, Shared> {
        self.shared.borrow()
    }

    fn current_page(&self) -> &Page {
        // there is always at least one page, see Pager::new
        &self.pages[self.pages.len() - 1]
    }

    /// Flush everything drawn on the current surface onto the current page
    pub fn flush(&mut self) {
        let last = self.pages.len() - 1;
        self.surface.flush_into(&mut self.pages[last]);
    }

    /// Flush the surface and start drawing on a fresh page, moving `y` back up
    /// below the top margin. `x` is left alone, see [Pager::advance_line].
    pub fn advance_page(&mut self) {
        self.flush();
        let (margins, page_size) = {
            let shared = self.state();
            (shared.margins, shared.page_size)
        };
        self.pages.push(Page::new(page_size, Some(margins)));
        self.surface = Surface::open();
        self.y = self.page_height() - margins.top;
        debug!("advanced to page {}", self.pages.len());
    }

    /// Move the cursor to the start of the next line
    pub fn advance_line(&mut self) {
        self.advance_line_with_gap(Pt(0.0));
    }

    /// Move the cursor to the start of the next line plus an extra `gap`.
    /// Line pitch always follows the standard font size, whatever size is set.
    pub fn advance_line_with_gap(&mut self, gap: Pt) {
        self.x = self.margin_left();
        self.y -= self.line_height() + gap - UNDER_LINE_CORRECTION;
    }

    /// Move the cursor down by `margin_bottom`, usually right after
    /// [Pager::advance_line] to space out paragraphs
    pub fn finish_line(&mut self, margin_bottom: Pt) {
        self.y -= margin_bottom;
    }

    /// Draw `text` with its baseline starting at `(x, y)`. The cursor does not move.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: Pt,
        y: Pt,
        style: FontStyle,
        size: Pt,
        colour: Colour,
    ) -> Result<()> {
        let id = {
            let shared = self.state();
            // rejects text the font cannot encode before it reaches the page
            shared.font(style).width(text)?;
            shared.font_set.get(style)
        };
        trace!("text at ({x}, {y}): {text:?}");
        self.surface.draw_text(SpanLayout {
            text: text.to_string(),
            font: SpanFont { id, size },
            colour,
            coords: (x, y),
        });
        Ok(())
    }

    /// Draw a thin straight line. The cursor does not move.
    pub fn draw_line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) {
        self.surface.draw_line(LineLayout {
            from: (x1, y1),
            to: (x2, y2),
            width: LINE_STROKE,
            colour: STANDARD_TEXT_COLOUR,
        });
    }

    /// Draw the number of pages this pager has so far, centered on the page
    /// just below the bottom margin
    pub fn draw_page_number(&mut self) -> Result<()> {
        let number = self.page_count().to_string();
        let width = self.measure(&number, FontStyle::Regular)?;
        let x = self.absolute_width() / 2.0 - width / 2.0;
        let y = self.margin_bottom() - self.line_height();
        let (size, colour) = (self.font_size(), self.colour());
        self.draw_text(&number, x, y, FontStyle::Regular, size, colour)
    }

    /// Whether another standard line, plus `extra_height`, would cross the bottom margin
    pub fn y_overflowed(&self, extra_height: Pt) -> bool {
        self.y - self.margin_bottom() - self.line_height() - extra_height < Pt(0.0)
    }

    /// Whether text of `string_width` drawn at the cursor would reach into the
    /// right margin, with `extra_margin` of additional room kept free
    pub fn x_overflowed(&self, string_width: Pt, extra_margin: Pt) -> bool {
        self.x + string_width + self.margin_right() + extra_margin >= self.page_width()
    }

    /// Start a new page if [Pager::y_overflowed]; returns whether it did
    pub fn ensure_room(&mut self, extra_height: Pt) -> bool {
        if self.y_overflowed(extra_height) {
            self.advance_page();
            true
        } else {
            false
        }
    }

    /// Width of `text` in the given style at the current font size
    pub fn measure(&self, text: &str, style: FontStyle) -> Result<Pt> {
        let shared = self.state();
        width_of_text(text, shared.font(style), self.font_size())
    }

    /// Wrap `text` to the page width and print it line by line from the left
    /// margin, starting new pages as they fill up. Leaves the cursor at the
    /// start of the line after the text.
    pub fn print_wrapped(&mut self, text: &str, style: FontStyle) -> Result<()> {
        let size = self.font_size();
        let lines = {
            let shared = self.state();
            fit_to_width(text, self.page_width(), shared.font(style), size)?
        };
        let colour = self.colour();
        self.x = self.margin_left();
        for line in lines {
            self.ensure_room(Pt(0.0));
            let (x, y) = (self.x, self.y);
            self.draw_text(&line, x, y, style, size, colour)?;
            self.advance_line();
        }
        Ok(())
    }

    /// Hand `payload` to `content` to be drawn onto this pager
    pub fn print<T, C>(&mut self, content: &mut C, payload: T) -> Result<()>
    where
        C: PrintContent<T> + ?Sized,
    {
        content.print_content(self, payload)
    }

    /// Line pitch at the standard font size
    pub fn line_height(&self) -> Pt {
        self.line_height_for(STANDARD_FONT_SIZE)
    }

    /// Line pitch for text of the given size
    pub fn line_height_for(&self, size: Pt) -> Pt {
        let bbox_height = self.state().font(FontStyle::Regular).bounding_box_height();
        size * (bbox_height / 1000.0 * LINE_HEIGHT_FACTOR)
    }

    /// How far an underline sits below the baseline at the current font size
    pub fn under_line_difference(&self) -> Pt {
        let bbox_height = self.state().font(FontStyle::Regular).bounding_box_height();
        self.font_size() * (bbox_height / 1000.0 * UNDER_LINE_FACTOR) - self.line_height()
    }

    /// Width between the left and right margins
    pub fn page_width(&self) -> Pt {
        self.absolute_width() - self.margins().horizontal()
    }

    /// Width of the physical page, ignoring margins
    pub fn absolute_width(&self) -> Pt {
        self.current_page().width()
    }

    /// Height of the physical page; margins are not subtracted
    pub fn page_height(&self) -> Pt {
        self.current_page().height()
    }

    pub fn page_center(&self) -> Pt {
        self.page_width() / 2.0
    }

    pub fn margins(&self) -> Margins {
        self.state().margins
    }

    pub fn margin_top(&self) -> Pt {
        self.margins().top
    }

    pub fn margin_left(&self) -> Pt {
        self.margins().left
    }

    pub fn margin_right(&self) -> Pt {
        self.margins().right
    }

    pub fn margin_bottom(&self) -> Pt {
        self.margins().bottom
    }

    /// The font the controller currently uses for `style`
    pub fn font(&self, style: FontStyle) -> Id<Font> {
        self.state().font_set.get(style)
    }

    /// The size override, or the standard size when there is none
    pub fn font_size(&self) -> Pt {
        self.font_size.unwrap_or(STANDARD_FONT_SIZE)
    }

    /// Override the font size; `None` restores the standard size
    pub fn set_font_size(&mut self, size: Option<Pt>) {
        self.font_size = size;
    }

    /// The colour override, or black when there is none
    pub fn colour(&self) -> Colour {
        self.colour.unwrap_or(STANDARD_TEXT_COLOUR)
    }

    /// Override the text colour; `None` restores black
    pub fn set_colour(&mut self, colour: Option<Colour>) {
        self.colour = colour;
    }

    pub fn x(&self) -> Pt {
        self.x
    }

    pub fn y(&self) -> Pt {
        self.y
    }

    pub fn set_x(&mut self, x: Pt) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: Pt) {
        self.y = y;
    }

    /// Number of pages in this pager's own sequence
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The pages so far. Content still on the surface only shows up after [Pager::flush].
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Flush the surface and give up the pages, in order
    pub(crate) fn into_pages(mut self) -> Vec<Page> {
        self.flush();
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours;
    use crate::font::BuiltinFont;
    use crate::pagesize::LETTER;
    use crate::{PagerError, PageContents};

    // Courier's bounding box is 1055 units high: 1.055 * 12 * 1.2
    const COURIER_LINE_HEIGHT: f32 = 15.192;

    fn close(a: Pt, b: f32) -> bool {
        (a.0 - b).abs() < 1e-3
    }

    fn controller() -> Controller {
        Controller::new(Margins::all(Pt(50.0)))
    }

    #[test]
    fn starts_at_the_top_left_margin() {
        let controller = controller();
        let pager = Pager::new(&controller);
        assert_eq!(pager.page_count(), 1);
        assert_eq!(pager.x(), Pt(50.0));
        assert_eq!(pager.y(), LETTER.1 - Pt(50.0));
    }

    #[test]
    fn page_dimensions_subtract_margins_from_the_width_only() {
        let pager = Pager::new(&controller());
        assert_eq!(pager.absolute_width(), Pt(612.0));
        assert_eq!(pager.page_width(), Pt(512.0));
        assert_eq!(pager.page_height(), Pt(792.0));
        assert_eq!(pager.page_center(), Pt(256.0));
    }

    #[test]
    fn advancing_a_page_resets_y_and_adds_one_page() {
        let mut pager = Pager::new(&controller());
        pager.set_x(Pt(123.0));
        pager.set_y(Pt(80.0));
        pager.advance_page();

        assert_eq!(pager.page_count(), 2);
        assert_eq!(pager.y(), pager.page_height() - pager.margin_top());
        assert_eq!(pager.x(), Pt(123.0));
    }

    #[test]
    fn advancing_a_line_uses_the_standard_pitch() {
        let mut pager = Pager::new(&controller());
        assert!(close(pager.line_height(), COURIER_LINE_HEIGHT));

        pager.set_font_size(Some(Pt(30.0)));
        pager.set_x(Pt(300.0));
        let start = pager.y();
        pager.advance_line();
        assert_eq!(pager.x(), Pt(50.0));
        assert!(close(start - pager.y(), COURIER_LINE_HEIGHT - 3.0));

        let start = pager.y();
        pager.advance_line_with_gap(Pt(4.0));
        pager.finish_line(Pt(6.0));
        assert!(close(start - pager.y(), COURIER_LINE_HEIGHT - 3.0 + 4.0 + 6.0));
    }

    #[test]
    fn y_overflow_tracks_the_bottom_margin() {
        let mut pager = Pager::new(&controller());
        let limit = 50.0 + COURIER_LINE_HEIGHT;

        pager.set_y(Pt(limit + 1.0));
        assert!(!pager.y_overflowed(Pt(0.0)));
        assert!(pager.y_overflowed(Pt(2.0)));

        pager.set_y(Pt(limit - 0.5));
        assert!(pager.y_overflowed(Pt(0.0)));
        for y in [limit - 1.0, 20.0, 0.0, -40.0] {
            pager.set_y(Pt(y));
            assert!(pager.y_overflowed(Pt(0.0)));
        }
    }

    #[test]
    fn x_overflow_counts_the_right_margin_against_the_page_width() {
        let mut pager = Pager::new(&controller());
        // page_width() is 512 with 50pt margins on US Letter
        assert!(!pager.x_overflowed(Pt(0.0), Pt(0.0)));
        assert!(!pager.x_overflowed(Pt(400.0), Pt(0.0)));
        assert!(pager.x_overflowed(Pt(412.0), Pt(0.0)));
        assert!(pager.x_overflowed(Pt(402.0), Pt(10.0)));

        pager.set_x(Pt(100.0));
        assert!(pager.x_overflowed(Pt(400.0), Pt(0.0)));
    }

    #[test]
    fn measures_at_the_current_font_size() {
        let mut pager = Pager::new(&controller());
        assert_eq!(pager.measure("abcd", FontStyle::Regular).unwrap(), Pt(28.8));
        pager.set_font_size(Some(Pt(10.0)));
        assert_eq!(pager.measure("abcd", FontStyle::Bold).unwrap(), Pt(24.0));
        pager.set_font_size(None);
        assert_eq!(pager.font_size(), STANDARD_FONT_SIZE);
    }

    #[test]
    fn overrides_fall_back_to_the_standard_values() {
        let mut pager = Pager::new(&controller());
        assert_eq!(pager.colour(), colours::BLACK);
        pager.set_colour(Some(colours::RED));
        assert_eq!(pager.colour(), colours::RED);
        pager.set_colour(None);
        assert_eq!(pager.colour(), STANDARD_TEXT_COLOUR);
    }

    #[test]
    fn drawing_buffers_until_flushed() {
        let mut pager = Pager::new(&controller());
        let (x, y) = (pager.x(), pager.y());
        pager
            .draw_text("hi", x, y, FontStyle::Bold, Pt(12.0), colours::BLUE)
            .unwrap();
        pager.draw_line(Pt(0.0), Pt(0.0), Pt(10.0), Pt(0.0));
        assert_eq!((pager.x(), pager.y()), (x, y));
        assert!(pager.pages()[0].contents.is_empty());

        pager.flush();
        let page = &pager.pages()[0];
        assert_eq!(page.contents.len(), 2);
        let span = page.spans().next().unwrap();
        assert_eq!(span.text, "hi");
        assert_eq!(span.font.id, pager.font(FontStyle::Bold));
        assert_eq!(span.colour, colours::BLUE);
        assert!(matches!(&page.contents[1], PageContents::Line(line) if line.width == Pt(0.1)));
    }

    #[test]
    fn unencodable_text_is_rejected() {
        let mut pager = Pager::new(&controller());
        let result = pager.draw_text(
            "漢",
            Pt(0.0),
            Pt(0.0),
            FontStyle::Regular,
            Pt(12.0),
            colours::BLACK,
        );
        assert!(matches!(result, Err(PagerError::MissingGlyph { .. })));
        pager.flush();
        assert!(pager.pages()[0].contents.is_empty());
    }

    #[test]
    fn content_drawn_before_a_page_break_stays_on_its_page() {
        let mut pager = Pager::new(&controller());
        pager.draw_line(Pt(0.0), Pt(0.0), Pt(1.0), Pt(1.0));
        pager.advance_page();
        pager.draw_line(Pt(0.0), Pt(0.0), Pt(2.0), Pt(2.0));
        pager.flush();

        let pages = pager.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].contents.len(), 1);
        assert_eq!(pages[1].contents.len(), 1);
    }

    #[test]
    fn page_numbers_are_centered_below_the_bottom_margin() {
        let mut pager = Pager::new(&controller());
        pager.advance_page();
        pager.advance_page();
        pager.draw_page_number().unwrap();
        pager.flush();

        let span = pager.pages()[2].spans().next().unwrap();
        assert_eq!(span.text, "3");
        // one Courier glyph at 12pt is 7.2pt wide
        assert!(close(span.coords.0, 306.0 - 3.6));
        assert!(close(span.coords.1, 50.0 - COURIER_LINE_HEIGHT));
    }

    #[test]
    fn font_changes_on_the_controller_reach_existing_pagers() {
        let mut controller = controller();
        let id = controller.new_pager();
        let before = controller.pager(id).unwrap().line_height();

        let pager = controller.pager_mut(id).unwrap();
        pager
            .draw_text("old", Pt(0.0), Pt(0.0), FontStyle::Regular, Pt(12.0), colours::BLACK)
            .unwrap();
        let old_font = pager.font(FontStyle::Regular);

        let new_font = controller.set_builtin_font(FontStyle::Regular, BuiltinFont::CourierBold);
        let pager = controller.pager_mut(id).unwrap();
        assert_eq!(pager.font(FontStyle::Regular), new_font);
        // Courier-Bold has a slightly shorter bounding box
        assert!(pager.line_height() < before);

        pager
            .draw_text("new", Pt(0.0), Pt(0.0), FontStyle::Regular, Pt(12.0), colours::BLACK)
            .unwrap();
        pager.flush();
        let fonts: Vec<_> = pager.pages()[0].spans().map(|s| s.font.id).collect();
        assert_eq!(fonts, vec![old_font, new_font]);
    }

    #[test]
    fn wrapped_text_flows_onto_new_pages() {
        let mut pager = Pager::new(&controller());
        let paragraph = vec!["word"; 2000].join(" ");
        pager.print_wrapped(&paragraph, FontStyle::Regular).unwrap();
        pager.flush();

        assert!(pager.page_count() > 1);
        let printed: Vec<&str> = pager
            .pages()
            .iter()
            .flat_map(|page| page.spans())
            .map(|span| span.text.as_str())
            .collect();
        assert_eq!(printed.join(" "), paragraph);
        for page in pager.pages() {
            for span in page.spans() {
                assert!(span.coords.1 >= Pt(50.0));
                assert!(span.coords.0 == Pt(50.0));
            }
        }
        assert_eq!(pager.x(), Pt(50.0));
    }

    #[test]
    fn prints_payloads_through_content_printers() {
        struct Listing;

        impl PrintContent<Vec<String>> for Listing {
            fn print_content(&mut self, pager: &mut Pager, items: Vec<String>) -> Result<()> {
                for item in &items {
                    pager.ensure_room(Pt(0.0));
                    let (x, y) = (pager.x(), pager.y());
                    let (size, colour) = (pager.font_size(), pager.colour());
                    pager.draw_text(item, x, y, FontStyle::Regular, size, colour)?;
                    pager.advance_line();
                }
                Ok(())
            }
        }

        let mut pager = Pager::new(&controller());
        let items = ["one", "two", "three"].map(String::from).to_vec();
        pager.print(&mut Listing, items).unwrap();

        let mut headings = |pager: &mut Pager, title: &str| -> Result<()> {
            let (x, y) = (pager.x(), pager.y());
            pager.draw_text(title, x, y, FontStyle::Bold, Pt(16.0), colours::BLACK)?;
            pager.advance_line_with_gap(Pt(4.0));
            Ok(())
        };
        pager.print(&mut headings, "Summary").unwrap();
        pager.flush();

        let texts: Vec<&str> = pager.pages()[0].spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "Summary"]);
    }
}
