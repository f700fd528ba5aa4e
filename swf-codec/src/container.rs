//! The SWF container: file header and tag stream.

use std::io::Read;

use binary_reader::{BinaryReader, Endian};

use crate::bits::BitReader;
use crate::rect::Rect;

/// Signature, version byte and file length.
const PREAMBLE_LEN: usize = 8;

/// A short tag header length of this value means a UI32 length follows.
const LONG_LENGTH_MARKER: u16 = 0x3F;

/// A tag type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagCode(pub u16);

impl TagCode {
    pub const END: TagCode = TagCode(0);
    pub const SHOW_FRAME: TagCode = TagCode(1);
    pub const SET_BACKGROUND_COLOR: TagCode = TagCode(9);
    pub const FILE_ATTRIBUTES: TagCode = TagCode(69);
    pub const DEFINE_FONT_ALIGN_ZONES: TagCode = TagCode(73);
    pub const CSM_TEXT_SETTINGS: TagCode = TagCode(74);
    pub const DEFINE_FONT3: TagCode = TagCode(75);
    pub const DEFINE_FONT_NAME: TagCode = TagCode(88);

    /// A human readable name for the codes this crate knows about.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            TagCode::END => "End",
            TagCode::SHOW_FRAME => "ShowFrame",
            TagCode::SET_BACKGROUND_COLOR => "SetBackgroundColor",
            TagCode::FILE_ATTRIBUTES => "FileAttributes",
            TagCode::DEFINE_FONT_ALIGN_ZONES => "DefineFontAlignZones",
            TagCode::CSM_TEXT_SETTINGS => "CSMTextSettings",
            TagCode::DEFINE_FONT3 => "DefineFont3",
            TagCode::DEFINE_FONT_NAME => "DefineFontName",
            _ => return None,
        })
    }
}

impl std::fmt::Display for TagCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "Unknown ({})", self.0),
        }
    }
}

/// Errors that can occur when parsing or writing a container.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container data ended unexpectedly")]
    Truncated,
    #[error("unknown container signature {0:?}")]
    UnknownSignature([u8; 3]),
    #[error("failed to decompress container body: {0}")]
    Decompress(std::io::Error),
    #[error("tag stream has no End tag")]
    MissingEndTag,
    #[error("tag payload of {0} bytes does not fit a UI32 length")]
    TagTooLarge(usize),
}

/// Whether the body after the preamble is zlib compressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Zlib,
}

impl Compression {
    fn from_signature(signature: [u8; 3]) -> Result<Self, ContainerError> {
        match &signature {
            b"FWS" => Ok(Compression::None),
            b"CWS" => Ok(Compression::Zlib),
            _ => Err(ContainerError::UnknownSignature(signature)),
        }
    }

    pub fn signature(self) -> [u8; 3] {
        match self {
            Compression::None => *b"FWS",
            Compression::Zlib => *b"CWS",
        }
    }
}

/// One record of the tag stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub code: TagCode,
    pub data: Vec<u8>,
    /// The header used the UI32 length form.
    ///
    /// Writers may use the long form for short payloads, so this is kept to
    /// re-emit untouched tags exactly as they were read.
    pub long_header: bool,
}

impl Tag {
    /// A tag framed with the shortest header that fits its payload.
    pub fn new(code: TagCode, data: Vec<u8>) -> Self {
        let long_header = data.len() >= LONG_LENGTH_MARKER as usize;
        Tag {
            code,
            data,
            long_header,
        }
    }

    /// The encoded size including the header.
    pub fn encoded_len(&self) -> usize {
        let long = self.long_header || self.data.len() >= LONG_LENGTH_MARKER as usize;
        let header = if long { 6 } else { 2 };
        header + self.data.len()
    }

    /// Append the header and payload to `out`.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<(), ContainerError> {
        let code = self.code.0 << 6;
        if self.long_header || self.data.len() >= LONG_LENGTH_MARKER as usize {
            let len = u32::try_from(self.data.len())
                .map_err(|_| ContainerError::TagTooLarge(self.data.len()))?;
            out.extend_from_slice(&(code | LONG_LENGTH_MARKER).to_le_bytes());
            out.extend_from_slice(&len.to_le_bytes());
        } else {
            out.extend_from_slice(&(code | self.data.len() as u16).to_le_bytes());
        }
        out.extend_from_slice(&self.data);
        Ok(())
    }
}

/// A parsed container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub compression: Compression,
    pub version: u8,
    /// The length field of the original preamble.
    pub file_length: u32,
    pub frame_rect: Rect,
    /// Frames per second as an 8.8 fixed point value.
    pub frame_rate: u16,
    pub frame_count: u16,
    /// The raw frame RECT, frame rate and frame count.
    header: Vec<u8>,
    /// All tags, the End tag last.
    pub tags: Vec<Tag>,
}

impl Container {
    /// Parse a container, decompressing it first if needed.
    ///
    /// Parsing stops at the first End tag; any trailing bytes are ignored.
    pub fn parse(data: &[u8]) -> Result<Self, ContainerError> {
        if data.len() < PREAMBLE_LEN {
            return Err(ContainerError::Truncated);
        }
        let signature = [data[0], data[1], data[2]];
        let compression = Compression::from_signature(signature)?;
        let version = data[3];
        let file_length = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

        let decompressed;
        let body = match compression {
            Compression::None => &data[PREAMBLE_LEN..],
            Compression::Zlib => {
                let mut buf = Vec::new();
                flate2::read::ZlibDecoder::new(&data[PREAMBLE_LEN..])
                    .read_to_end(&mut buf)
                    .map_err(ContainerError::Decompress)?;
                decompressed = buf;
                &decompressed[..]
            }
        };
        log::debug!(
            "{} container v{version}, {} body bytes",
            String::from_utf8_lossy(&signature),
            body.len()
        );

        let first = *body.first().ok_or(ContainerError::Truncated)?;
        let rect_len = Rect::encoded_len(first);
        let frame_rect = body
            .get(..rect_len)
            .ok_or(ContainerError::Truncated)
            .and_then(|bytes| {
                Rect::read_bits(&mut BitReader::new(bytes)).map_err(|_| ContainerError::Truncated)
            })?;

        let mut reader = BinaryReader::from_u8(body);
        reader.endian = Endian::Little;
        reader.jmp(rect_len);
        let frame_rate = reader.read_u16().map_err(|_| ContainerError::Truncated)?;
        let frame_count = reader.read_u16().map_err(|_| ContainerError::Truncated)?;
        let header = body[..reader.pos].to_vec();

        let tags = read_tags(&mut reader)?;
        Ok(Container {
            compression,
            version,
            file_length,
            frame_rect,
            frame_rate,
            frame_count,
            header,
            tags,
        })
    }

    /// The frame RECT, frame rate and frame count exactly as read.
    pub fn header_bytes(&self) -> &[u8] {
        &self.header
    }

    /// Tags with the given code, in stream order.
    pub fn tags_with_code(&self, code: TagCode) -> impl Iterator<Item = &Tag> + '_ {
        self.tags.iter().filter(move |tag| tag.code == code)
    }

    /// Serialize as an uncompressed container.
    ///
    /// The version byte and header are kept; the file length is recomputed.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContainerError> {
        self.rebuild(|_| None)
    }

    /// Serialize as an uncompressed container, substituting payloads.
    ///
    /// `replace` is called for each tag in order; when it returns a payload
    /// that payload is written in place of the original, framed with the
    /// shortest header that fits. Other tags are copied unchanged.
    pub fn rebuild(
        &self,
        mut replace: impl FnMut(&Tag) -> Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ContainerError> {
        let mut body = self.header.clone();
        for tag in &self.tags {
            match replace(tag) {
                Some(data) => {
                    log::debug!(
                        "replacing {} payload ({} -> {} bytes)",
                        tag.code,
                        tag.data.len(),
                        data.len()
                    );
                    Tag::new(tag.code, data).write(&mut body)?
                }
                None => tag.write(&mut body)?,
            }
        }

        let total = PREAMBLE_LEN + body.len();
        let file_length = u32::try_from(total).map_err(|_| ContainerError::TagTooLarge(total))?;
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&Compression::None.signature());
        out.push(self.version);
        out.extend_from_slice(&file_length.to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }
}

fn read_tags(reader: &mut BinaryReader) -> Result<Vec<Tag>, ContainerError> {
    let mut tags = Vec::new();
    while reader.pos < reader.length {
        let code_and_len = reader.read_u16().map_err(|_| ContainerError::Truncated)?;
        let code = TagCode(code_and_len >> 6);
        let short_len = code_and_len & LONG_LENGTH_MARKER;
        let long_header = short_len == LONG_LENGTH_MARKER;
        let len = if long_header {
            reader.read_u32().map_err(|_| ContainerError::Truncated)? as usize
        } else {
            short_len as usize
        };
        let data = reader
            .read_bytes(len)
            .map_err(|_| ContainerError::Truncated)?
            .to_vec();
        tags.push(Tag {
            code,
            data,
            long_header,
        });
        if code == TagCode::END {
            return Ok(tags);
        }
    }
    Err(ContainerError::MissingEndTag)
}
