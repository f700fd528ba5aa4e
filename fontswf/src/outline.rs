//! Flattened glyph outlines from the `glyf` table.

use skrifa::raw::{
    tables::{
        glyf::{Anchor, CompositeGlyph, Glyf, Glyph, SimpleGlyph, Transform},
        loca::Loca,
    },
    types::{GlyphId, Point},
    FontRef, ReadError, TableProvider,
};

use crate::{round_half_even, GlyphError};

/// Composites nested deeper than this resolve to no geometry.
pub const COMPOSITE_RECURSION_LIMIT: usize = 10;

/// The most points a single flattened glyph may have.
pub const MAX_POINTS: usize = u16::MAX as usize;

/// Glyph geometry in font units, with composites resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outline {
    pub points: Vec<Point<i32>>,
    pub on_curve: Vec<bool>,
    /// Index of the last point of each contour.
    pub contour_ends: Vec<usize>,
}

/// A view of one contour of an [`Outline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contour<'a> {
    pub points: &'a [Point<i32>],
    pub on_curve: &'a [bool],
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the contours.
    ///
    /// Contour ends are validated when an outline is read, so every end is
    /// in bounds and greater than the previous one.
    pub fn contours(&self) -> impl Iterator<Item = Contour<'_>> + '_ {
        let mut start = 0;
        self.contour_ends.iter().map(move |&end| {
            let range = start..end + 1;
            start = end + 1;
            Contour {
                points: &self.points[range.clone()],
                on_curve: &self.on_curve[range],
            }
        })
    }

    fn from_simple(glyph: &SimpleGlyph) -> Result<Self, GlyphError> {
        let num_points = glyph.num_points();
        if num_points > MAX_POINTS {
            return Err(GlyphError::InsufficientMemory);
        }
        let mut contour_ends = Vec::with_capacity(glyph.end_pts_of_contours().len());
        let mut next_start = 0;
        for end in glyph.end_pts_of_contours() {
            let end = end.get() as usize;
            if end < next_start {
                return Err(GlyphError::InvalidContour);
            }
            contour_ends.push(end);
            next_start = end + 1;
        }
        let mut points = Vec::with_capacity(num_points);
        let mut on_curve = Vec::with_capacity(num_points);
        for point in glyph.points() {
            points.push(Point::new(point.x as i32, point.y as i32));
            on_curve.push(point.on_curve);
        }
        // the point iterator stops early on truncated data
        if points.len() != num_points {
            return Err(GlyphError::InvalidContour);
        }
        Ok(Outline {
            points,
            on_curve,
            contour_ends,
        })
    }

    /// Append `other`, shifting its contour ends past our points.
    fn append(&mut self, other: Outline) -> Result<(), GlyphError> {
        if self.points.len() + other.points.len() > MAX_POINTS {
            return Err(GlyphError::InsufficientMemory);
        }
        let offset = self.points.len();
        self.contour_ends
            .extend(other.contour_ends.into_iter().map(|end| end + offset));
        self.points.extend(other.points);
        self.on_curve.extend(other.on_curve);
        Ok(())
    }
}

/// Reads outlines from the `glyf` and `loca` tables of a font.
#[derive(Clone)]
pub struct OutlineReader<'a> {
    loca: Loca<'a>,
    glyf: Glyf<'a>,
}

impl<'a> OutlineReader<'a> {
    pub fn new(font: &FontRef<'a>) -> Result<Self, ReadError> {
        Ok(OutlineReader {
            loca: font.loca(None)?,
            glyf: font.glyf()?,
        })
    }

    /// The number of glyphs described by `loca`.
    pub fn glyph_count(&self) -> usize {
        self.loca.len()
    }

    pub fn contains(&self, gid: GlyphId) -> bool {
        (gid.to_u32() as usize) < self.glyph_count()
    }

    /// Read the flattened outline of `gid`.
    ///
    /// Returns `None` for glyphs without geometry: empty glyphs, glyphs with
    /// zero contours, and composites that resolve to nothing.
    pub fn outline(&self, gid: GlyphId) -> Result<Option<Outline>, GlyphError> {
        self.load_glyph(gid, 0)
    }

    fn load_glyph(&self, gid: GlyphId, depth: usize) -> Result<Option<Outline>, GlyphError> {
        if depth > COMPOSITE_RECURSION_LIMIT {
            log::debug!("glyph {gid} exceeds composite nesting limit");
            return Ok(None);
        }
        let outline = match self.loca.get_glyf(gid, &self.glyf)? {
            None => return Ok(None),
            Some(Glyph::Simple(simple)) => Outline::from_simple(&simple)?,
            Some(Glyph::Composite(composite)) => self.load_composite(&composite, depth)?,
        };
        Ok((!outline.is_empty()).then_some(outline))
    }

    fn load_composite(
        &self,
        composite: &CompositeGlyph,
        depth: usize,
    ) -> Result<Outline, GlyphError> {
        let mut outline = Outline::default();
        for component in composite.components() {
            let gid = GlyphId::from(component.glyph);
            if !self.contains(gid) {
                log::debug!("skipping component referencing missing glyph {gid}");
                continue;
            }
            let Some(mut child) = self.load_glyph(gid, depth + 1)? else {
                continue;
            };
            apply_transform(&mut child.points, &component.transform)?;
            let (dx, dy) = match component.anchor {
                Anchor::Offset { x, y } => (x as i32, y as i32),
                Anchor::Point { base, component } => {
                    let base = outline.points.get(base as usize);
                    let component = child.points.get(component as usize);
                    match (base, component) {
                        (Some(base), Some(component)) => (
                            checked(base.x.checked_sub(component.x))?,
                            checked(base.y.checked_sub(component.y))?,
                        ),
                        _ => {
                            log::debug!("ignoring out of range anchor points");
                            (0, 0)
                        }
                    }
                }
            };
            if dx != 0 || dy != 0 {
                for point in child.points.iter_mut() {
                    *point = Point::new(
                        checked(point.x.checked_add(dx))?,
                        checked(point.y.checked_add(dy))?,
                    );
                }
            }
            outline.append(child)?;
        }
        Ok(outline)
    }
}

fn checked(value: Option<i32>) -> Result<i32, GlyphError> {
    value.ok_or(GlyphError::CoordinateOverflow)
}

fn apply_transform(points: &mut [Point<i32>], transform: &Transform) -> Result<(), GlyphError> {
    let xx = transform.xx.to_f32() as f64;
    let yx = transform.yx.to_f32() as f64;
    let xy = transform.xy.to_f32() as f64;
    let yy = transform.yy.to_f32() as f64;
    if (xx, yx, xy, yy) == (1.0, 0.0, 0.0, 1.0) {
        return Ok(());
    }
    for point in points {
        let (x, y) = (point.x as f64, point.y as f64);
        *point = Point::new(
            checked(round_half_even(x * xx + y * xy))?,
            checked(round_half_even(x * yx + y * yy))?,
        );
    }
    Ok(())
}
