//! Assembly of DefineFont3 and DefineFontAlignZones payloads.
//!
//! A DefineFont3 payload stores its glyphs as parallel tables: shape offsets,
//! shapes, codes, advances and bounds, all in code point order. [`FontTable`]
//! keeps those tables in step as glyphs are pushed, copying each shape into
//! a single blob so per-glyph buffers can be released as the conversion goes.

use swf_codec::Rect;

use crate::{
    glyph::GlyphRecord, metrics::FontMetrics, ConvertError, DEFAULT_FONT_NAME,
    DEFAULT_LANGUAGE_CODE,
};

/// HasLayout | WideOffsets | WideCodes.
pub const DEFINE_FONT3_FLAGS: u8 = 0x8C;

/// Bytes written per glyph in a DefineFontAlignZones payload.
pub const ALIGN_ZONE_RECORD_LEN: usize = 10;

const ZONE_MASK_XY: u8 = 0x03;

/// The FontID, language and name of a DefineFont3 tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontIdentity {
    pub font_id: u16,
    pub language_code: u8,
    pub name: String,
}

impl FontIdentity {
    /// Read the identity fields at the start of a DefineFont3 payload.
    pub fn from_define_font3(payload: &[u8]) -> Option<Self> {
        let font_id = u16::from_le_bytes([*payload.first()?, *payload.get(1)?]);
        let language_code = *payload.get(3)?;
        let name_len = *payload.get(4)? as usize;
        let name = payload.get(5..5 + name_len)?;
        Some(FontIdentity {
            font_id,
            language_code,
            name: String::from_utf8_lossy(name).into_owned(),
        })
    }

    /// The identity of `font_id` when the replaced tag cannot be read.
    pub fn fallback(font_id: u16) -> Self {
        FontIdentity {
            font_id,
            language_code: DEFAULT_LANGUAGE_CODE,
            name: DEFAULT_FONT_NAME.to_owned(),
        }
    }

    /// The name as stored: at most 255 bytes, cut at a character boundary.
    fn name_bytes(&self) -> &[u8] {
        let mut end = self.name.len().min(u8::MAX as usize);
        while !self.name.is_char_boundary(end) {
            end -= 1;
        }
        if end < self.name.len() {
            log::warn!("font name truncated to {end} bytes");
        }
        &self.name.as_bytes()[..end]
    }
}

/// The glyph tables of a DefineFont3 tag under construction.
#[derive(Clone, Debug, Default)]
pub struct FontTable {
    shapes: Vec<u8>,
    /// Start of each shape within `shapes`.
    shape_starts: Vec<usize>,
    codes: Vec<u16>,
    advances: Vec<i16>,
    bounds: Vec<Rect>,
}

impl FontTable {
    pub fn with_capacity(num_glyphs: usize) -> Self {
        FontTable {
            shapes: Vec::new(),
            shape_starts: Vec::with_capacity(num_glyphs),
            codes: Vec::with_capacity(num_glyphs),
            advances: Vec::with_capacity(num_glyphs),
            bounds: Vec::with_capacity(num_glyphs),
        }
    }

    /// Append a glyph. Glyphs must be pushed in ascending code point order.
    pub fn push(&mut self, record: GlyphRecord) {
        self.shape_starts.push(self.shapes.len());
        self.shapes.extend_from_slice(&record.shape);
        self.codes.push(record.code.min(0xFFFF) as u16);
        self.advances.push(clamp_i16(record.advance));
        self.bounds.push(record.bounds);
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Serialize as a DefineFont3 payload.
    pub fn define_font3(
        &self,
        identity: &FontIdentity,
        metrics: &FontMetrics,
    ) -> Result<Vec<u8>, ConvertError> {
        let num_glyphs = self.len();
        let num_glyphs_u16 =
            u16::try_from(num_glyphs).map_err(|_| ConvertError::FontTooLarge(num_glyphs))?;
        // the offset table, the code table offset, then the shapes
        let shapes_start = 4 * (num_glyphs + 1);
        let code_table_offset = shapes_start + self.shapes.len();
        let code_table_offset = u32::try_from(code_table_offset)
            .map_err(|_| ConvertError::FontTooLarge(code_table_offset))?;

        let name = identity.name_bytes();
        let mut out =
            Vec::with_capacity(7 + name.len() + code_table_offset as usize + num_glyphs * 8 + 8);
        out.extend_from_slice(&identity.font_id.to_le_bytes());
        out.push(DEFINE_FONT3_FLAGS);
        out.push(identity.language_code);
        out.push(name.len() as u8);
        out.extend_from_slice(name);
        out.extend_from_slice(&num_glyphs_u16.to_le_bytes());
        for start in &self.shape_starts {
            // bounded by the code table offset
            let offset = (shapes_start + start) as u32;
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&code_table_offset.to_le_bytes());
        out.extend_from_slice(&self.shapes);
        for code in &self.codes {
            out.extend_from_slice(&code.to_le_bytes());
        }
        for value in [metrics.ascent, metrics.descent, metrics.leading] {
            out.extend_from_slice(&clamp_i16(value.saturating_abs()).to_le_bytes());
        }
        for advance in &self.advances {
            out.extend_from_slice(&advance.to_le_bytes());
        }
        for bounds in &self.bounds {
            out.extend(bounds.to_bytes());
        }
        // KerningCount
        out.extend_from_slice(&0u16.to_le_bytes());
        Ok(out)
    }

    /// Serialize a DefineFontAlignZones payload with one blank record per
    /// glyph.
    pub fn align_zones(&self, font_id: u16, csm_hint: u8) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + self.len() * ALIGN_ZONE_RECORD_LEN);
        out.extend_from_slice(&font_id.to_le_bytes());
        out.push((csm_hint & 0x03) << 6);
        for _ in 0..self.len() {
            out.push(2);
            // two zones of zero FLOAT16 coordinate and range
            out.extend_from_slice(&[0; 8]);
            out.push(ZONE_MASK_XY);
        }
        out
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(-(i16::MAX as i32), i16::MAX as i32) as i16
}
