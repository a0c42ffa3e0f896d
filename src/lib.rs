//! Lay out text and lines on fixed-size PDF pages without computing glyph
//! widths or page breaks by hand.
//!
//! A [Controller] holds the configuration every section of a document shares:
//! margins, page size and a family of four fonts. Each section is authored on
//! its own [Pager], which owns a private sequence of pages and a writing
//! cursor, and reports when the cursor runs out of room. Finalizing the
//! controller concatenates every pager's pages, in registration order, into a
//! single PDF.
//!
//! ```
//! use pdf_pager::{Controller, FontStyle, Pager, layout::Margins, Pt};
//!
//! let mut controller = Controller::new(Margins::all(Pt(50.0)));
//! let mut pager = Pager::new(&controller);
//! pager.print_wrapped("Quarterly report", FontStyle::Bold).unwrap();
//! pager.draw_page_number().unwrap();
//! controller.register(pager).unwrap();
//!
//! let mut pdf = Vec::new();
//! controller.finalize_to(&mut pdf).unwrap();
//! assert!(pdf.starts_with(b"%PDF"));
//! ```

mod colour;
pub use colour::*;

mod content;

mod controller;
pub use controller::*;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

/// Utility functions and structures to lay out text on pages
pub mod layout;

mod page;
pub use page::*;

mod pager;
pub use pager::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod surface;
pub use surface::*;

mod units;
pub use units::*;

/// Re-export pdf-writer, whose types show up in font and page serialization
pub use pdf_writer;
