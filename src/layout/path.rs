//! Rounded rectangles as four edges and four quarter-circle Bezier arcs.

use crate::style::Paint;
use crate::surface::{DrawingSurface, PathSegment};

/// Control-point distance for a quarter circle of radius 1.
pub const KAPPA: f64 = 0.5522847498;

/// Radius actually used for a `w` x `h` box: never more than half the
/// shorter side, never negative.
pub fn effective_radius(w: f64, h: f64, radius: f64) -> f64 {
    radius.min(w.min(h) / 2.0).max(0.0)
}

/// Draw a rounded rectangle with its top-left corner at (`x`, `y`).
///
/// The outline runs clockwise from the start of the top edge. Returns the
/// radius used.
pub fn rounded_rect(
    surface: &mut dyn DrawingSurface,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    radius: f64,
    paint: Paint,
) -> f64 {
    let r = effective_radius(w, h, radius);
    let k = r * KAPPA;
    let t = surface.transform();
    let p = |px: f64, py: f64| t.point(px, py);

    let mut segments = Vec::with_capacity(9);
    let (sx, sy) = p(x + r, y);
    segments.push(PathSegment::MoveTo(sx, sy));

    let line = |px: f64, py: f64, out: &mut Vec<PathSegment>| {
        let (lx, ly) = p(px, py);
        out.push(PathSegment::LineTo(lx, ly));
    };
    let arc = |c1: (f64, f64), c2: (f64, f64), end: (f64, f64)| {
        let (x1, y1) = p(c1.0, c1.1);
        let (x2, y2) = p(c2.0, c2.1);
        let (x3, y3) = p(end.0, end.1);
        PathSegment::CurveTo(x1, y1, x2, y2, x3, y3)
    };

    line(x + w - r, y, &mut segments);
    segments.push(arc((x + w - r + k, y), (x + w, y + r - k), (x + w, y + r)));
    line(x + w, y + h - r, &mut segments);
    segments.push(arc((x + w, y + h - r + k), (x + w - r + k, y + h), (x + w - r, y + h)));
    line(x + r, y + h, &mut segments);
    segments.push(arc((x + r - k, y + h), (x, y + h - r + k), (x, y + h - r)));
    line(x, y + r, &mut segments);
    segments.push(arc((x, y + r - k), (x + r - k, y), (x + r, y)));

    for segment in segments {
        surface.path_segment(segment);
    }
    surface.close_path(paint);
    r
}
