//! Reading and writing the binary records of SWF files.
//!
//! This crate covers the pieces needed to transplant font definitions between
//! containers: MSB-first [bit fields](bits), variable width [rectangles](rect),
//! glyph [shape records](shape) and the [tag stream](container) itself. It has
//! no knowledge of fonts; see the `fontswf` crate for that.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod bits;
pub mod container;
pub mod rect;
pub mod shape;

pub use bits::{signed_bits, BitReadError, BitReader, BitWriter};
pub use container::{Compression, Container, ContainerError, Tag, TagCode};
pub use rect::Rect;
pub use shape::{encode_shape, Edge, EdgeRecord, Shape, ShapeError, EMPTY_SHAPE};
