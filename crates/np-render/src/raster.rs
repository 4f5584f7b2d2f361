//! Ink rasterizer: strokes → RGBA coverage on a transparent layer.
//!
//! Each segment is stamped independently with analytic coverage (distance
//! from the pixel center to the segment). Coverage is merged into the layer
//! with `max`, so the result depends only on the set of segments drawn,
//! never on how many times or in which order they were drawn.

use image::{Rgba, RgbaImage};
use kurbo::{Point as KPoint, Vec2};
use np_core::geometry::{Point, SurfaceSize};
use np_core::model::{InkLayer, InkStyle, StrokeCap};

fn kp(p: Point) -> KPoint {
    KPoint::new(p.x, p.y)
}

/// A fully transparent layer.
pub fn blank_layer(size: SurfaceSize) -> RgbaImage {
    RgbaImage::new(size.width, size.height)
}

/// Rasterize a whole ink layer from scratch.
pub fn render_ink(ink: &InkLayer, size: SurfaceSize) -> RgbaImage {
    let mut layer = blank_layer(size);
    for stroke in ink.strokes() {
        paint_points(&mut layer, stroke.points(), 0, ink.style());
    }
    layer
}

/// Paint the part of a polyline starting at point index `from`.
///
/// `from == 0` also stamps the starting dot; segments are drawn for every
/// pair `(k - 1, k)` with `k >= max(from, 1)`.
pub fn paint_points(layer: &mut RgbaImage, points: &[Point], from: usize, style: &InkStyle) {
    if from == 0 {
        if let Some(&p) = points.first() {
            stamp_dot(layer, p, style);
        }
    }
    for k in from.max(1)..points.len() {
        stamp_segment(layer, points[k - 1], points[k], style);
    }
}

/// Round-cap dot. Butt and square caps leave an isolated point blank.
pub fn stamp_dot(layer: &mut RgbaImage, p: Point, style: &InkStyle) {
    if style.cap != StrokeCap::Round || !usable(style) {
        return;
    }
    let r = style.width as f64 / 2.0;
    let c = kp(p);
    stamp(layer, c, c, r, style, |px| {
        let d = (px - c).hypot();
        coverage(r - d)
    });
}

/// One straight segment with the style's cap.
pub fn stamp_segment(layer: &mut RgbaImage, a: Point, b: Point, style: &InkStyle) {
    if !usable(style) || !a.is_finite() || !b.is_finite() {
        return;
    }
    let r = style.width as f64 / 2.0;
    let (mut a, mut b) = (kp(a), kp(b));
    let dir = b - a;
    let len = dir.hypot();

    if len < 1e-9 {
        // Zero-length segment: only a round cap leaves a mark.
        stamp_dot(layer, Point::new(a.x, a.y), style);
        return;
    }
    let unit = dir / len;

    match style.cap {
        StrokeCap::Round => {
            stamp(layer, a, b, r, style, |px| {
                let t = ((px - a).dot(dir) / (len * len)).clamp(0.0, 1.0);
                let nearest = a + dir * t;
                coverage(r - (px - nearest).hypot())
            });
        }
        StrokeCap::Butt | StrokeCap::Square => {
            if style.cap == StrokeCap::Square {
                a -= unit * r;
                b += unit * r;
            }
            let len = (b - a).hypot();
            let normal = Vec2::new(-unit.y, unit.x);
            stamp(layer, a, b, r, style, |px| {
                let rel = px - a;
                let along = rel.dot(unit);
                let across = rel.dot(normal).abs();
                let inside = along.min(len - along);
                coverage(r - across) * coverage(inside)
            });
        }
    }
}

fn usable(style: &InkStyle) -> bool {
    style.width.is_finite() && style.width > 0.0 && style.color.a > 0.0
}

/// Box filter approximation: fully covered half a pixel inside the edge.
fn coverage(signed_distance_inside: f64) -> f64 {
    (signed_distance_inside + 0.5).clamp(0.0, 1.0)
}

/// Visit every pixel near the segment `a..b` (padded by `r`) and merge the
/// coverage returned by `cover` for its center.
fn stamp(
    layer: &mut RgbaImage,
    a: KPoint,
    b: KPoint,
    r: f64,
    style: &InkStyle,
    cover: impl Fn(KPoint) -> f64,
) {
    let (w, h) = layer.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let pad = r + 1.0;
    let x0 = (a.x.min(b.x) - pad).floor().max(0.0);
    let y0 = (a.y.min(b.y) - pad).floor().max(0.0);
    let x1 = (a.x.max(b.x) + pad).ceil().min(w as f64 - 1.0);
    let y1 = (a.y.max(b.y) + pad).ceil().min(h as f64 - 1.0);
    if x0 > x1 || y0 > y1 {
        return;
    }

    let [cr, cg, cb, ca] = style.color.to_rgba8();
    for y in y0 as u32..=y1 as u32 {
        for x in x0 as u32..=x1 as u32 {
            let cov = cover(KPoint::new(x as f64 + 0.5, y as f64 + 0.5));
            if cov <= 0.0 {
                continue;
            }
            let alpha = (cov * ca as f64).round() as u8;
            let px = layer.get_pixel_mut(x, y);
            if alpha > px.0[3] {
                *px = Rgba([cr, cg, cb, alpha]);
            }
        }
    }
}
