use std::path::PathBuf;
use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum PagerError {
    #[error(transparent)]
    /// An I/O error occurred while reading a font or writing the document
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error("font file not found: {}", .0.display())]
    /// The font path given to the controller does not exist
    FontNotFound(PathBuf),

    #[error("there are no pagers to be written")]
    /// [Controller::finalize](crate::Controller::finalize) was called before any pager was registered
    NoPagers,

    #[error("the font has no glyph for {ch:?}")]
    /// Text could not be measured or encoded because the font lacks a glyph
    MissingGlyph { ch: char },

    #[error("the pager was created by a different controller")]
    /// A pager may only be registered with the controller it was built against
    ForeignPager,

    #[error("a page referenced by the document is missing")]
    /// A page referenced by the page order no longer exists
    PageMissing,
}

/// Shorthand for results carrying a [PagerError]
pub type Result<T> = std::result::Result<T, PagerError>;
