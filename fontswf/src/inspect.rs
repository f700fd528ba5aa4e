//! Decoding DefineFont3 payloads and listing container tags.
//!
//! This is the reading side of [`crate::define_font`]: it accepts any
//! DefineFont3 payload, narrow or wide offsets, with or without layout.

use std::fmt::Write;

use binary_reader::{BinaryReader, Endian};
use swf_codec::{BitReader, Container, Rect, Shape, ShapeError, TagCode};
use thiserror::Error;

const HAS_LAYOUT: u8 = 0x80;
const WIDE_OFFSETS: u8 = 0x08;
const WIDE_CODES: u8 = 0x04;

/// Errors from [`DefineFont3Summary::parse`].
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("payload ends early")]
    Truncated,
    #[error("offset of glyph {0} is outside the shape data")]
    BadOffset(usize),
    #[error("shape of glyph {index}: {source}")]
    Shape { index: usize, source: ShapeError },
}

impl From<std::io::Error> for InspectError {
    fn from(_: std::io::Error) -> Self {
        InspectError::Truncated
    }
}

/// Layout metrics of a DefineFont3 tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    pub ascent: i16,
    pub descent: i16,
    pub leading: i16,
    pub advances: Vec<i16>,
    pub bounds: Vec<Rect>,
    pub kerning_count: u16,
}

/// The decoded contents of a DefineFont3 payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefineFont3Summary {
    pub font_id: u16,
    pub flags: u8,
    pub language_code: u8,
    pub name: String,
    /// Relative to the start of the offset table.
    pub offsets: Vec<u32>,
    pub code_table_offset: u32,
    pub shapes: Vec<Shape>,
    pub codes: Vec<u16>,
    pub layout: Option<Layout>,
}

impl DefineFont3Summary {
    pub fn parse(payload: &[u8]) -> Result<Self, InspectError> {
        let mut reader = BinaryReader::from_u8(payload);
        reader.endian = Endian::Little;
        let font_id = reader.read_u16()?;
        let flags = reader.read_u8()?;
        let language_code = reader.read_u8()?;
        let name_len = reader.read_u8()? as usize;
        let name = String::from_utf8_lossy(reader.read_bytes(name_len)?).into_owned();
        let num_glyphs = reader.read_u16()? as usize;

        let table_start = reader.pos;
        let wide_offsets = flags & WIDE_OFFSETS != 0;
        let read_offset = |reader: &mut BinaryReader| -> Result<u32, InspectError> {
            Ok(if wide_offsets {
                reader.read_u32()?
            } else {
                reader.read_u16()? as u32
            })
        };
        let offsets = (0..num_glyphs)
            .map(|_| read_offset(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;
        // fonts without glyphs may omit the code table offset
        let code_table_offset = if num_glyphs == 0 && reader.pos == reader.length {
            0
        } else {
            read_offset(&mut reader)?
        };

        let code_table_start = table_start + code_table_offset as usize;
        let mut shapes = Vec::with_capacity(num_glyphs);
        for (index, offset) in offsets.iter().enumerate() {
            let start = table_start + *offset as usize;
            let data = payload
                .get(start..code_table_start)
                .ok_or(InspectError::BadOffset(index))?;
            let (shape, _) =
                Shape::decode(data).map_err(|source| InspectError::Shape { index, source })?;
            shapes.push(shape);
        }

        reader.jmp(code_table_start);
        let codes = (0..num_glyphs)
            .map(|_| {
                Ok(if flags & WIDE_CODES != 0 {
                    reader.read_u16()?
                } else {
                    reader.read_u8()? as u16
                })
            })
            .collect::<Result<Vec<_>, InspectError>>()?;

        let layout = if flags & HAS_LAYOUT != 0 {
            Some(read_layout(&mut reader, payload, num_glyphs)?)
        } else {
            None
        };

        Ok(DefineFont3Summary {
            font_id,
            flags,
            language_code,
            name,
            offsets,
            code_table_offset,
            shapes,
            codes,
            layout,
        })
    }

    pub fn num_glyphs(&self) -> usize {
        self.codes.len()
    }
}

fn read_layout(
    reader: &mut BinaryReader,
    payload: &[u8],
    num_glyphs: usize,
) -> Result<Layout, InspectError> {
    let ascent = reader.read_i16()?;
    let descent = reader.read_i16()?;
    let leading = reader.read_i16()?;
    let advances = (0..num_glyphs)
        .map(|_| reader.read_i16())
        .collect::<Result<Vec<_>, _>>()?;

    let rest = payload.get(reader.pos..).ok_or(InspectError::Truncated)?;
    let mut bits = BitReader::new(rest);
    let mut bounds = Vec::with_capacity(num_glyphs);
    for _ in 0..num_glyphs {
        bounds.push(Rect::read_bits(&mut bits).map_err(|_| InspectError::Truncated)?);
        bits.align();
    }
    reader.jmp(reader.pos + bits.byte_position());
    let kerning_count = reader.read_u16()?;
    Ok(Layout {
        ascent,
        descent,
        leading,
        advances,
        bounds,
        kerning_count,
    })
}

/// One line per tag, with a summary of each DefineFont3 tag.
pub fn describe_container(container: &Container) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} v{}, {} bytes, {} frames at {}.{:02} fps",
        String::from_utf8_lossy(&container.compression.signature()),
        container.version,
        container.file_length,
        container.frame_count,
        container.frame_rate >> 8,
        (container.frame_rate & 0xFF) * 100 / 256,
    );
    for tag in &container.tags {
        let _ = writeln!(out, "{:>8} {}", tag.data.len(), tag.code);
        if tag.code != TagCode::DEFINE_FONT3 {
            continue;
        }
        match DefineFont3Summary::parse(&tag.data) {
            Ok(font) => describe_font(&mut out, &font),
            Err(e) => {
                let _ = writeln!(out, "         unreadable: {e}");
            }
        }
    }
    out
}

fn describe_font(out: &mut String, font: &DefineFont3Summary) {
    let drawn = font.shapes.iter().filter(|shape| !shape.is_empty()).count();
    let _ = writeln!(
        out,
        "         font {} '{}', flags {:#04x}, language {}, {} glyphs ({drawn} drawn)",
        font.font_id,
        font.name.escape_debug(),
        font.flags,
        font.language_code,
        font.num_glyphs(),
    );
    if let (Some(first), Some(last)) = (font.codes.first(), font.codes.last()) {
        let _ = writeln!(out, "         codes U+{first:04X}..U+{last:04X}");
    }
    if let Some(layout) = &font.layout {
        let _ = writeln!(
            out,
            "         ascent {}, descent {}, leading {}, {} kerning pairs",
            layout.ascent, layout.descent, layout.leading, layout.kerning_count
        );
    }
}
