//! Reference containers.
//!
//! All multi-byte fields are little endian.

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

pub const REFERENCE_FONT_ID: u16 = 1;
pub const REFERENCE_FONT_NAME: &str = "Ref Sans";
pub const REFERENCE_LANGUAGE_CODE: u8 = 5;
pub const REFERENCE_TAG_COUNT: usize = 7;

/// The payload of ShowFrame and End tags.
pub const NO_DATA: &[u8] = &[];

/// Byte offset of the first tag in [`REFERENCE_SWF`].
pub const REFERENCE_HEADER_LEN: usize = 8 + 13;

/// An uncompressed container holding a one glyph font.
#[rustfmt::skip]
pub static REFERENCE_SWF: &[u8] = &[
    b'F', b'W', b'S',       // signature
    0x0A,                   // version 10
    0x6E, 0x00, 0x00, 0x00, // file length 110
    0x78, 0x00, 0x05, 0x5F, // frame RECT, 15 bit values: 0, 11000, 0, 8000
    0x00, 0x00, 0x0F, 0xA0,
    0x00,
    0x00, 0x18,             // frame rate 24.0
    0x01, 0x00,             // frame count 1

    0x44, 0x11,             // FileAttributes, length 4
    0x08, 0x00, 0x00, 0x00, // UseNetwork

    0x7F, 0x02,             // SetBackgroundColor, long header
    0x03, 0x00, 0x00, 0x00, // length 3
    0xFF, 0xFF, 0xFF,       // white

    0xE7, 0x12,             // DefineFont3, length 39
    0x01, 0x00,             // FontID 1
    0x8C,                   // HasLayout | WideOffsets | WideCodes
    0x05,                   // LanguageCode
    0x08,                   // FontNameLen
    b'R', b'e', b'f', b' ', b'S', b'a', b'n', b's',
    0x01, 0x00,             // NumGlyphs
    0x08, 0x00, 0x00, 0x00, // OffsetTable[0]
    0x0A, 0x00, 0x00, 0x00, // CodeTableOffset
    0x00, 0x00,             // glyph 0: empty shape
    0x41, 0x00,             // CodeTable[0] 'A'
    0x84, 0x03,             // FontAscent 900
    0xC8, 0x00,             // FontDescent 200
    0x00, 0x00,             // FontLeading 0
    0xE8, 0x03,             // FontAdvanceTable[0] 1000
    0x08, 0x00,             // FontBoundsTable[0]: zero RECT
    0x00, 0x00,             // KerningCount

    0x4D, 0x12,             // DefineFontAlignZones, length 13
    0x01, 0x00,             // FontID 1
    0x40,                   // CSMTableHint thin
    0x02,                   // NumZoneData
    0x00, 0x00, 0x00, 0x00, // zone 0
    0x00, 0x00, 0x00, 0x00, // zone 1
    0x03,                   // ZoneMaskX | ZoneMaskY

    0x0C, 0x16,             // DefineFontName, length 12
    0x01, 0x00,             // FontID 1
    b'R', b'e', b'f', b' ', b'S', b'a', b'n', b's', 0x00,
    0x00,                   // empty copyright

    0x40, 0x00,             // ShowFrame
    0x00, 0x00,             // End
];

/// [`REFERENCE_SWF`] with its body zlib compressed.
pub fn compressed_reference() -> Vec<u8> {
    compress(REFERENCE_SWF)
}

/// Compress the body of an uncompressed container.
pub fn compress(swf: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&swf[8..])
        .expect("writing to a Vec cannot fail");
    let mut out = b"CWS".to_vec();
    out.extend_from_slice(&swf[3..8]);
    out.extend(encoder.finish().expect("writing to a Vec cannot fail"));
    out
}

/// A container with the [`REFERENCE_SWF`] header and the given tags.
///
/// Tags are framed with the shortest header that fits; an End tag is not
/// added automatically.
pub fn build(tags: &[(u16, &[u8])]) -> Vec<u8> {
    let mut body = REFERENCE_SWF[8..REFERENCE_HEADER_LEN].to_vec();
    for (code, data) in tags {
        if data.len() < 0x3F {
            body.extend_from_slice(&((code << 6) | data.len() as u16).to_le_bytes());
        } else {
            body.extend_from_slice(&((code << 6) | 0x3F).to_le_bytes());
            body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
        body.extend_from_slice(data);
    }
    let mut out = b"FWS".to_vec();
    out.push(REFERENCE_SWF[3]);
    out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
    out.extend(body);
    out
}

/// A DefineFont3 payload declaring `name` with a single empty glyph for 'A'.
pub fn define_font3(font_id: u16, name: &str) -> Vec<u8> {
    let mut data = font_id.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x8C, REFERENCE_LANGUAGE_CODE, name.len() as u8]);
    data.extend_from_slice(name.as_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&10u32.to_le_bytes());
    data.extend_from_slice(&[0x00, 0x00]);
    data.extend_from_slice(&0x41u16.to_le_bytes());
    for value in [900i16, 200, 0, 1000] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&[0x08, 0x00, 0x00, 0x00]);
    data
}

/// A DefineFontAlignZones payload for a one glyph font.
pub fn align_zones(font_id: u16) -> Vec<u8> {
    let mut data = font_id.to_le_bytes().to_vec();
    data.push(0x40);
    data.push(2);
    data.extend_from_slice(&[0; 8]);
    data.push(0x03);
    data
}

/// Two fonts, the reference font last, each followed by its align zones.
pub fn two_font_swf() -> Vec<u8> {
    let other_font = define_font3(2, "Other");
    let other_zones = align_zones(2);
    let font = define_font3(REFERENCE_FONT_ID, REFERENCE_FONT_NAME);
    let zones = align_zones(REFERENCE_FONT_ID);
    build(&[
        (75, other_font.as_slice()),
        (73, other_zones.as_slice()),
        (75, font.as_slice()),
        (73, zones.as_slice()),
        (1, NO_DATA),
        (0, NO_DATA),
    ])
}

/// A container with no font at all.
pub fn fontless_swf() -> Vec<u8> {
    let black: &[u8] = &[0, 0, 0];
    build(&[(9, black), (1, NO_DATA), (0, NO_DATA)])
}
