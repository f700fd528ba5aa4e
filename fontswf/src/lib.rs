//! Transcode TrueType outlines into an SWF font definition.
//!
//! [`convert_font`] takes a TrueType font and a reference SWF container and
//! returns a copy of the container in which one DefineFont3 tag, and its
//! DefineFontAlignZones companion, describe the new font instead. Every other
//! tag is copied through unchanged.
//!
//! Outlines are read with [`skrifa::raw`]; the bit-level SWF records come from
//! [`swf_codec`].

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod convert;
pub mod define_font;
pub mod edges;
pub mod glyph;
pub mod inspect;
pub mod metrics;
pub mod outline;

pub use convert::convert_font;

use skrifa::raw::ReadError;
use swf_codec::ContainerError;
use thiserror::Error;

/// Tab, line feed and carriage return.
pub const DEFAULT_CONTROL_CHARS: [u32; 3] = [0x09, 0x0A, 0x0D];

/// 1024 pixels of 20 twips.
pub const DEFAULT_EM_SQUARE: f64 = 20480.0;

pub const DEFAULT_FONT_NAME: &str = "Noto Sans CJK TC Regular";

pub const DEFAULT_LANGUAGE_CODE: u8 = 5;

/// Options for [`convert_font`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertOptions {
    /// The FontID of the DefineFont3 tag to replace.
    ///
    /// If `None`, the first DefineFont3 tag in the reference is replaced.
    pub font_id: Option<u16>,
    /// If `None`, the name stored in the replaced tag is kept.
    pub font_name: Option<String>,
    /// If `None`, the language code of the replaced tag is kept.
    pub language_code: Option<u8>,
    /// The size of the em square in twips.
    pub em_square: f64,
    /// Code points that are always written as blank, zero width glyphs.
    pub control_chars: Vec<u32>,
    /// The CSMTableHint of the DefineFontAlignZones tag.
    pub csm_hint: u8,
    /// Glyphs converted between progress reports.
    pub checkpoint_interval: usize,
    /// Convert the glyphs of each checkpoint batch on the rayon pool.
    pub parallel: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            font_id: None,
            font_name: None,
            language_code: None,
            em_square: DEFAULT_EM_SQUARE,
            control_chars: DEFAULT_CONTROL_CHARS.to_vec(),
            csm_hint: 1,
            checkpoint_interval: 1000,
            parallel: true,
        }
    }
}

/// Receives human readable status lines during a conversion.
pub trait Progress {
    fn report(&mut self, message: &str);
}

impl<F: FnMut(&str)> Progress for F {
    fn report(&mut self, message: &str) {
        self(message)
    }
}

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported font format: {0}")]
    UnsupportedFontFormat(String),

    #[error("font has no usable character map")]
    MissingCharacterMap,

    #[error("malformed reference container: {0}")]
    MalformedContainer(#[from] ContainerError),

    #[error("reference container has no matching DefineFont3 tag")]
    MissingFontDefinition,

    #[error("font data of {0} bytes does not fit a DefineFont3 tag")]
    FontTooLarge(usize),

    #[error("em square of {0} twips is not a usable size")]
    InvalidEmSquare(f64),
}

/// Errors that fail a single glyph.
///
/// A failed glyph is written as a blank, zero width glyph and the conversion
/// continues.
#[derive(Clone, Debug, Error)]
pub enum GlyphError {
    #[error("error reading glyph data: {0}")]
    Read(#[from] ReadError),

    #[error("invalid contour data")]
    InvalidContour,

    #[error("outline has more than {} points", outline::MAX_POINTS)]
    InsufficientMemory,

    #[error("coordinates out of range")]
    CoordinateOverflow,
}

/// The largest magnitude of a coordinate or distance in twips.
///
/// Absolute moves and RECT fields are at most 31 bits wide, and keeping
/// values in this range lets sums and differences of two of them stay in
/// `i32`.
pub const MAX_TWIPS: i32 = (1 << 30) - 1;

/// Round half to even, or `None` if the result does not fit an `i32`.
pub(crate) fn round_half_even(value: f64) -> Option<i32> {
    let rounded = value.round_ties_even();
    (rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64).then_some(rounded as i32)
}

/// Round a scaled distance to whole twips.
pub(crate) fn to_twips(value: f64) -> Result<i32, GlyphError> {
    round_half_even(value)
        .filter(|twips| twips.abs() <= MAX_TWIPS)
        .ok_or(GlyphError::CoordinateOverflow)
}
