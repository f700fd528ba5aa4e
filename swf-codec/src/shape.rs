//! Glyph shape records.
//!
//! A glyph in a DefineFont3 tag is a SHAPE: a 4-bit fill index width, a 4-bit
//! line index width, then a stream of style-change and edge records closed by
//! an end record. Glyphs have exactly one fill style and no line styles.

use crate::bits::{signed_bits, BitReadError, BitReader, BitWriter};

/// Edge deltas are stored with at least this many bits.
pub const MIN_EDGE_BITS: u32 = 2;

/// The widest delta the 4-bit `NumBits - 2` field can describe.
pub const MAX_EDGE_BITS: u32 = 17;

const FILL_BITS_WIDTH: u32 = 4;
const LINE_BITS_WIDTH: u32 = 4;
const MOVE_BITS_WIDTH: u32 = 5;
const EDGE_BITS_WIDTH: u32 = 4;
const END_SHAPE_BITS: u32 = 6;

/// The encoding of a shape with no contours.
///
/// Zero fill bits, zero line bits and the 6-bit end record, padded to two
/// bytes. Used for blank glyphs and for any glyph that failed to convert.
pub const EMPTY_SHAPE: [u8; 2] = [0x00, 0x00];

/// A drawing command in twips.
///
/// Only `MoveTo` is absolute. Line deltas are relative to the pen; for a
/// curve the control delta is relative to the pen and the anchor delta is
/// relative to the control point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    MoveTo {
        x: i32,
        y: i32,
    },
    LineTo {
        dx: i32,
        dy: i32,
    },
    QuadTo {
        control_dx: i32,
        control_dy: i32,
        anchor_dx: i32,
        anchor_dy: i32,
    },
}

impl Edge {
    /// The position of the pen after applying this edge at `pen`.
    pub fn end_point(&self, pen: (i32, i32)) -> (i32, i32) {
        match *self {
            Edge::MoveTo { x, y } => (x, y),
            Edge::LineTo { dx, dy } => (pen.0 + dx, pen.1 + dy),
            Edge::QuadTo {
                control_dx,
                control_dy,
                anchor_dx,
                anchor_dy,
            } => (
                pen.0 + control_dx + anchor_dx,
                pen.1 + control_dy + anchor_dy,
            ),
        }
    }
}

/// A straight or curved edge record with its field width resolved.
///
/// Lines with one zero delta use the compact axis-aligned forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRecord {
    Line {
        n_bits: u32,
        dx: i32,
        dy: i32,
    },
    Vertical {
        n_bits: u32,
        dy: i32,
    },
    Horizontal {
        n_bits: u32,
        dx: i32,
    },
    Curve {
        n_bits: u32,
        control_dx: i32,
        control_dy: i32,
        anchor_dx: i32,
        anchor_dy: i32,
    },
}

impl EdgeRecord {
    /// The record for a straight edge, or `None` for a zero length line,
    /// which is never written.
    pub fn line(dx: i32, dy: i32) -> Option<Self> {
        let n_bits = edge_bits(&[dx, dy]);
        match (dx, dy) {
            (0, 0) => None,
            (0, dy) => Some(EdgeRecord::Vertical { n_bits, dy }),
            (dx, 0) => Some(EdgeRecord::Horizontal { n_bits, dx }),
            (dx, dy) => Some(EdgeRecord::Line { n_bits, dx, dy }),
        }
    }

    pub fn curve(control_dx: i32, control_dy: i32, anchor_dx: i32, anchor_dy: i32) -> Self {
        EdgeRecord::Curve {
            n_bits: edge_bits(&[control_dx, control_dy, anchor_dx, anchor_dy]),
            control_dx,
            control_dy,
            anchor_dx,
            anchor_dy,
        }
    }

    /// The record for a drawing edge; `None` for moves and empty lines.
    pub fn from_edge(edge: &Edge) -> Option<Self> {
        match *edge {
            Edge::MoveTo { .. } => None,
            Edge::LineTo { dx, dy } => Self::line(dx, dy),
            Edge::QuadTo {
                control_dx,
                control_dy,
                anchor_dx,
                anchor_dy,
            } => Some(Self::curve(control_dx, control_dy, anchor_dx, anchor_dy)),
        }
    }

    pub fn n_bits(&self) -> u32 {
        match *self {
            EdgeRecord::Line { n_bits, .. }
            | EdgeRecord::Vertical { n_bits, .. }
            | EdgeRecord::Horizontal { n_bits, .. }
            | EdgeRecord::Curve { n_bits, .. } => n_bits,
        }
    }

    pub fn write(&self, writer: &mut BitWriter) {
        let n_bits = self.n_bits();
        writer.write_bit(true);
        match *self {
            EdgeRecord::Curve {
                control_dx,
                control_dy,
                anchor_dx,
                anchor_dy,
                ..
            } => {
                writer.write_bit(false);
                writer.write_unsigned(n_bits - 2, EDGE_BITS_WIDTH);
                for value in [control_dx, control_dy, anchor_dx, anchor_dy] {
                    writer.write_signed(value, n_bits);
                }
            }
            EdgeRecord::Line { dx, dy, .. } => {
                writer.write_bit(true);
                writer.write_unsigned(n_bits - 2, EDGE_BITS_WIDTH);
                writer.write_bit(true);
                writer.write_signed(dx, n_bits);
                writer.write_signed(dy, n_bits);
            }
            EdgeRecord::Vertical { dy, .. } => {
                writer.write_bit(true);
                writer.write_unsigned(n_bits - 2, EDGE_BITS_WIDTH);
                writer.write_bit(false);
                writer.write_bit(true);
                writer.write_signed(dy, n_bits);
            }
            EdgeRecord::Horizontal { dx, .. } => {
                writer.write_bit(true);
                writer.write_unsigned(n_bits - 2, EDGE_BITS_WIDTH);
                writer.write_bit(false);
                writer.write_bit(false);
                writer.write_signed(dx, n_bits);
            }
        }
    }
}

/// The shared width for a set of deltas, clamped to what the format allows.
///
/// Deltas that need more than [`MAX_EDGE_BITS`] are not rejected; they are
/// truncated when written.
fn edge_bits(values: &[i32]) -> u32 {
    let needed = values
        .iter()
        .copied()
        .map(signed_bits)
        .max()
        .unwrap_or(0)
        .max(MIN_EDGE_BITS);
    if needed > MAX_EDGE_BITS {
        log::debug!("edge deltas {values:?} need {needed} bits, truncating to {MAX_EDGE_BITS}");
    }
    needed.min(MAX_EDGE_BITS)
}

/// Serialize contours into a glyph SHAPE.
///
/// Each contour must start with a [`Edge::MoveTo`]; contours that don't are
/// skipped. The first move also selects fill style 1 for the left fill; later
/// moves leave the style state alone. If no contour is written the result is
/// [`EMPTY_SHAPE`].
pub fn encode_shape(contours: &[Vec<Edge>]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    writer.write_unsigned(1, FILL_BITS_WIDTH);
    writer.write_unsigned(0, LINE_BITS_WIDTH);

    let mut wrote_contour = false;
    for contour in contours {
        let Some((Edge::MoveTo { x, y }, edges)) = contour.split_first() else {
            continue;
        };
        write_move(&mut writer, *x, *y, !wrote_contour);
        wrote_contour = true;
        for edge in edges {
            match *edge {
                Edge::MoveTo { x, y } => write_move(&mut writer, x, y, false),
                _ => {
                    if let Some(record) = EdgeRecord::from_edge(edge) {
                        record.write(&mut writer);
                    }
                }
            }
        }
    }

    if !wrote_contour {
        return EMPTY_SHAPE.to_vec();
    }
    writer.write_unsigned(0, END_SHAPE_BITS);
    writer.finish()
}

fn write_move(writer: &mut BitWriter, x: i32, y: i32, select_fill: bool) {
    // TypeFlag, StateNewStyles, StateLineStyle, StateFillStyle1
    writer.write_unsigned(0, 4);
    writer.write_bit(select_fill);
    // StateMoveTo
    writer.write_bit(true);
    let n_bits = signed_bits(x).max(signed_bits(y)).max(1);
    writer.write_unsigned(n_bits, MOVE_BITS_WIDTH);
    writer.write_signed(x, n_bits);
    writer.write_signed(y, n_bits);
    if select_fill {
        writer.write_unsigned(1, 1);
    }
}

/// Errors that can occur when decoding a SHAPE.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("shape data ended early: {0}")]
    Truncated(#[from] BitReadError),
    #[error("style change declares new styles, which glyph shapes never do")]
    UnexpectedNewStyles,
    #[error("edge record before the first move")]
    EdgeBeforeMove,
}

/// A decoded glyph SHAPE.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    pub fill_bits: u32,
    pub line_bits: u32,
    /// Each contour starts with its [`Edge::MoveTo`].
    pub contours: Vec<Vec<Edge>>,
    /// The last fill style 0 selected by a style change, if any.
    pub fill_style0: Option<u32>,
}

impl Shape {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Decode a SHAPE from the start of `data`.
    ///
    /// Returns the shape and the number of bytes it occupied.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), ShapeError> {
        let mut reader = BitReader::new(data);
        let fill_bits = reader.read_unsigned(FILL_BITS_WIDTH)?;
        let line_bits = reader.read_unsigned(LINE_BITS_WIDTH)?;
        let mut shape = Shape {
            fill_bits,
            line_bits,
            ..Default::default()
        };

        loop {
            let is_edge = reader.read_bit()?;
            if !is_edge {
                let flags = reader.read_unsigned(END_SHAPE_BITS - 1)?;
                if flags == 0 {
                    break;
                }
                let [new_styles, line_style, fill_style1, fill_style0, move_to] =
                    [0x10, 0x08, 0x04, 0x02, 0x01].map(|mask| flags & mask != 0);
                if new_styles {
                    return Err(ShapeError::UnexpectedNewStyles);
                }
                if move_to {
                    let n_bits = reader.read_unsigned(MOVE_BITS_WIDTH)?;
                    let x = reader.read_signed(n_bits)?;
                    let y = reader.read_signed(n_bits)?;
                    shape.contours.push(vec![Edge::MoveTo { x, y }]);
                }
                if fill_style0 {
                    shape.fill_style0 = Some(reader.read_unsigned(fill_bits)?);
                }
                if fill_style1 {
                    reader.read_unsigned(fill_bits)?;
                }
                if line_style {
                    reader.read_unsigned(line_bits)?;
                }
                continue;
            }

            let is_straight = reader.read_bit()?;
            let n_bits = reader.read_unsigned(EDGE_BITS_WIDTH)? + 2;
            let edge = if is_straight {
                if reader.read_bit()? {
                    Edge::LineTo {
                        dx: reader.read_signed(n_bits)?,
                        dy: reader.read_signed(n_bits)?,
                    }
                } else if reader.read_bit()? {
                    Edge::LineTo {
                        dx: 0,
                        dy: reader.read_signed(n_bits)?,
                    }
                } else {
                    Edge::LineTo {
                        dx: reader.read_signed(n_bits)?,
                        dy: 0,
                    }
                }
            } else {
                Edge::QuadTo {
                    control_dx: reader.read_signed(n_bits)?,
                    control_dy: reader.read_signed(n_bits)?,
                    anchor_dx: reader.read_signed(n_bits)?,
                    anchor_dy: reader.read_signed(n_bits)?,
                }
            };
            shape
                .contours
                .last_mut()
                .ok_or(ShapeError::EdgeBeforeMove)?
                .push(edge);
        }
        reader.align();
        Ok((shape, reader.byte_position()))
    }
}
