//! Layout utilities for positioning content on pages.
//!
//! - [`Margins`](crate::layout::Margins) describe the printable area shared by every pager
//! - [`fit_to_width`](crate::layout::fit_to_width) greedily wraps words into lines no wider than a target
//! - [`column_starts`](crate::layout::column_starts) splits a width into equal columns
//!
//! # Example
//!
//! ```
//! use pdf_pager::layout::fit_to_width;
//! use pdf_pager::{BuiltinFont, Font, Pt};
//!
//! let font = Font::builtin(BuiltinFont::Courier);
//! // Courier glyphs are 6pt wide at 10pt
//! let lines = fit_to_width("hello world", Pt(40.0), &font, Pt(10.0)).unwrap();
//! assert_eq!(lines, vec!["hello", "world"]);
//! ```

mod columns;
mod fit;
mod margins;

pub use columns::*;
pub use fit::*;
pub use margins::*;
