//! Builds a three-section report: a cover page, a wrapped body and a table.
//!
//! Run with `RUST_LOG=debug` to watch pages being added.

use pdf_pager::layout::{column_starts, Margins};
use pdf_pager::{colours, Controller, FontStyle, Info, Pager, PrintContent, Pt, Result};

struct Cover;

impl<'a> PrintContent<(&'a str, &'a str)> for Cover {
    fn print_content(
        &mut self,
        pager: &mut Pager,
        (title, subtitle): (&'a str, &'a str),
    ) -> Result<()> {
        pager.set_font_size(Some(Pt(24.0)));
        let width = pager.measure(title, FontStyle::Bold)?;
        let x = pager.absolute_width() / 2.0 - width / 2.0;
        let y = pager.page_height() / 2.0;
        let colour = pager.colour();
        pager.draw_text(title, x, y, FontStyle::Bold, Pt(24.0), colour)?;

        pager.set_font_size(None);
        let width = pager.measure(subtitle, FontStyle::Italic)?;
        let x = pager.absolute_width() / 2.0 - width / 2.0;
        let y = y - pager.line_height_for(Pt(24.0));
        let size = pager.font_size();
        pager.draw_text(subtitle, x, y, FontStyle::Italic, size, colours::GREY)
    }
}

struct Row {
    item: &'static str,
    quantity: u32,
    price: f32,
}

struct Table;

impl<'a> PrintContent<&'a [Row]> for Table {
    fn print_content(&mut self, pager: &mut Pager, rows: &'a [Row]) -> Result<()> {
        let columns = column_starts(pager.page_width(), pager.margin_left(), 3);
        let print_row = |pager: &mut Pager, cells: [String; 3], style: FontStyle| {
            if pager.y_overflowed(Pt(0.0)) {
                pager.draw_page_number()?;
                pager.advance_page();
            }
            let (y, size, colour) = (pager.y(), pager.font_size(), pager.colour());
            for (cell, &x) in cells.iter().zip(&columns) {
                pager.draw_text(cell, x, y, style, size, colour)?;
            }
            pager.advance_line();
            Ok::<(), pdf_pager::PagerError>(())
        };

        print_row(
            pager,
            ["Item".into(), "Quantity".into(), "Price".into()],
            FontStyle::Bold,
        )?;
        let (left, right) = (pager.margin_left(), pager.absolute_width() - pager.margin_right());
        let rule = pager.y() + pager.line_height() / 2.0;
        pager.draw_line(left, rule, right, rule);

        for row in rows {
            print_row(
                pager,
                [
                    row.item.to_string(),
                    row.quantity.to_string(),
                    format!("{:.2}", row.price),
                ],
                FontStyle::Regular,
            )?;
        }
        pager.draw_page_number()
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut controller = Controller::new(Margins::all(Pt(56.0)));
    let mut info = Info::new();
    info.title("Quarterly Report").author("pdf-pager");
    controller.set_info(info);

    let mut cover = Pager::new(&controller);
    cover.print(&mut Cover, ("Quarterly Report", "generated with pdf-pager"))?;
    controller.register(cover)?;

    let body = controller.new_pager();
    let pager = controller
        .pager_mut(body)
        .expect("pager was just registered");
    for paragraph in 0..6 {
        pager.print_wrapped(&lipsum::lipsum(120 + paragraph * 40), FontStyle::Regular)?;
        pager.finish_line(Pt(8.0));
    }
    pager.draw_page_number()?;

    let rows: Vec<Row> = (1..=80)
        .map(|i| Row {
            item: if i % 2 == 0 { "Widget" } else { "Gadget" },
            quantity: i * 3,
            price: i as f32 * 1.25,
        })
        .collect();
    let mut table = Pager::new(&controller);
    table.set_colour(Some(colours::BLUE));
    table.print(&mut Table, rows.as_slice())?;
    controller.register(table)?;

    controller.finalize("report.pdf")
}
