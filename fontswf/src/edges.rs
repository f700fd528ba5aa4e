//! Quadratic contours to SWF edges.
//!
//! TrueType contours are closed loops of on-curve and off-curve points where
//! two consecutive off-curve points imply an on-curve point halfway between
//! them. SWF shapes are a pen walk of straight and quadratic edges, so each
//! contour becomes a move to its first on-curve point followed by one edge
//! per segment.
//!
//! The SWF y axis points down; y coordinates are negated while scaling.

use skrifa::raw::types::Point;
use swf_codec::Edge;

use crate::{
    outline::{Contour, Outline},
    to_twips, GlyphError,
};

/// Convert every contour of `outline` into edges in twips.
///
/// Contours with fewer than two points produce nothing and are left out.
/// Fails if a scaled coordinate does not fit an SWF shape.
pub fn outline_to_edges(outline: &Outline, scale: f64) -> Result<Vec<Vec<Edge>>, GlyphError> {
    let mut contours = Vec::with_capacity(outline.contour_ends.len());
    for contour in outline.contours() {
        let edges = contour_to_edges(contour, scale)?;
        if !edges.is_empty() {
            contours.push(edges);
        }
    }
    Ok(contours)
}

/// Convert one contour into a [`Edge::MoveTo`] followed by drawing edges.
///
/// The walk starts at the first on-curve point. A contour made only of
/// off-curve points starts halfway between its last and first points. If the
/// pen does not end where it started, a closing line is added.
pub fn contour_to_edges(contour: Contour, scale: f64) -> Result<Vec<Edge>, GlyphError> {
    let Contour { points, on_curve } = contour;
    let n = points.len();
    if n < 2 {
        return Ok(Vec::new());
    }
    let scale_point = |point: Point<i32>| -> Result<Point<i32>, GlyphError> {
        Ok(Point::new(
            to_twips(point.x as f64 * scale)?,
            to_twips(-(point.y as f64) * scale)?,
        ))
    };

    let first_on = on_curve.iter().position(|on| *on);
    let start = match first_on {
        Some(index) => scale_point(points[index])?,
        None => {
            let (first, last) = (points[0], points[n - 1]);
            Point::new(
                to_twips((first.x as f64 + last.x as f64) / 2.0 * scale)?,
                to_twips(-(first.y as f64 + last.y as f64) / 2.0 * scale)?,
            )
        }
    };

    let mut pen = Pen::new(start, n + 2);
    let mut steps = 0;
    while steps < n {
        let index = match first_on {
            Some(first) => (first + 1 + steps) % n,
            None => steps,
        };
        let point = scale_point(points[index])?;
        if on_curve[index] {
            pen.line_to(point);
            steps += 1;
            continue;
        }
        let next_index = (index + 1) % n;
        let next = scale_point(points[next_index])?;
        if on_curve[next_index] {
            pen.quad_to(point, next);
            steps += 2;
        } else {
            // both points are within MAX_TWIPS, so the sums fit
            let mid = Point::new(
                (point.x + next.x).div_euclid(2),
                (point.y + next.y).div_euclid(2),
            );
            pen.quad_to(point, mid);
            steps += 1;
        }
    }
    Ok(pen.close())
}

/// Accumulates edges relative to the current pen position.
///
/// Every point is within [`MAX_TWIPS`](crate::MAX_TWIPS) of the origin, so the
/// differences between them fit an `i32`.
struct Pen {
    start: Point<i32>,
    current: Point<i32>,
    edges: Vec<Edge>,
}

impl Pen {
    fn new(start: Point<i32>, capacity: usize) -> Self {
        let mut edges = Vec::with_capacity(capacity);
        edges.push(Edge::MoveTo {
            x: start.x,
            y: start.y,
        });
        Pen {
            start,
            current: start,
            edges,
        }
    }

    fn line_to(&mut self, to: Point<i32>) {
        self.edges.push(Edge::LineTo {
            dx: to.x - self.current.x,
            dy: to.y - self.current.y,
        });
        self.current = to;
    }

    fn quad_to(&mut self, control: Point<i32>, anchor: Point<i32>) {
        self.edges.push(Edge::QuadTo {
            control_dx: control.x - self.current.x,
            control_dy: control.y - self.current.y,
            anchor_dx: anchor.x - control.x,
            anchor_dy: anchor.y - control.y,
        });
        self.current = anchor;
    }

    fn close(mut self) -> Vec<Edge> {
        if self.current != self.start {
            self.line_to(self.start);
        }
        self.edges
    }
}
