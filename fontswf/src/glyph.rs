//! The per-glyph pipeline: outline, edges, shape record.

use skrifa::raw::types::GlyphId;
use swf_codec::{encode_shape, Rect, EMPTY_SHAPE};

use crate::{
    edges::outline_to_edges,
    metrics::{Advances, FontMetrics},
    outline::OutlineReader,
    GlyphError,
};

/// Everything a DefineFont3 tag stores about one glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord {
    pub shape: Vec<u8>,
    /// The code point, before truncation to the 16-bit code table.
    pub code: u32,
    /// Advance in twips, before clamping.
    pub advance: i32,
    pub bounds: Rect,
}

impl GlyphRecord {
    /// A blank, zero width glyph.
    pub fn empty(code: u32) -> Self {
        GlyphRecord {
            shape: EMPTY_SHAPE.to_vec(),
            code,
            advance: 0,
            bounds: Rect::ZERO,
        }
    }
}

/// Converts mapped glyphs of one font.
///
/// Holds only shared references, so one converter serves every worker.
pub struct GlyphConverter<'a> {
    outlines: OutlineReader<'a>,
    advances: &'a Advances,
    metrics: &'a FontMetrics,
}

impl<'a> GlyphConverter<'a> {
    pub fn new(
        outlines: OutlineReader<'a>,
        advances: &'a Advances,
        metrics: &'a FontMetrics,
    ) -> Self {
        GlyphConverter {
            outlines,
            advances,
            metrics,
        }
    }

    /// Convert the glyph `gid`, mapped from `code`.
    pub fn convert(&self, code: u32, gid: GlyphId) -> Result<GlyphRecord, GlyphError> {
        let scale = self.metrics.scale;
        let shape = match self.outlines.outline(gid)? {
            Some(outline) => encode_shape(&outline_to_edges(&outline, scale)?),
            None => EMPTY_SHAPE.to_vec(),
        };
        let advance = self.metrics.scale_x(self.advances.get(gid))?;
        Ok(GlyphRecord {
            shape,
            code,
            advance,
            bounds: Rect::new(0, advance, -self.metrics.ascent, -self.metrics.descent),
        })
    }
}
