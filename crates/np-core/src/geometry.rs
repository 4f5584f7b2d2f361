//! Coordinate spaces.
//!
//! Pointer events arrive in *input-surface* pixels (the on-screen widget),
//! while ink is stored and rendered in *document-surface* pixels (the
//! rasterized page). `CoordinateMap` converts between the two with a
//! per-axis ratio of `document / input`.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};

/// A 2-D position. No timestamp, no pressure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `400x300`).
    pub fn parse(s: &str) -> Option<Self> {
        let (w, h) = s.trim().split_once(['x', 'X'])?;
        Some(Self::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
    }
}

impl std::fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Maps input-surface coordinates into document-surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMap {
    input: SurfaceSize,
    document: SurfaceSize,
    sx: f64,
    sy: f64,
}

impl CoordinateMap {
    pub fn new(input: SurfaceSize, document: SurfaceSize) -> Result<Self, CaptureError> {
        if input.is_empty() {
            return Err(CaptureError::EmptyInputSurface {
                width: input.width,
                height: input.height,
            });
        }
        Ok(Self {
            input,
            document,
            sx: document.width as f64 / input.width as f64,
            sy: document.height as f64 / input.height as f64,
        })
    }

    /// Identity map for input captured directly on the document surface.
    pub fn identity(document: SurfaceSize) -> Result<Self, CaptureError> {
        Self::new(document, document)
    }

    pub fn input(&self) -> SurfaceSize {
        self.input
    }

    pub fn document(&self) -> SurfaceSize {
        self.document
    }

    /// Per-axis scale factors `(document / input)`.
    pub fn scale(&self) -> (f64, f64) {
        (self.sx, self.sy)
    }

    pub fn to_document(&self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }

    /// Inverse of [`to_document`](Self::to_document). Degenerate when the
    /// document surface has zero area; callers never capture onto one.
    pub fn to_input(&self, p: Point) -> Point {
        Point::new(p.x / self.sx, p.y / self.sy)
    }

    /// Check that an input-space point is usable.
    pub fn validate(&self, p: Point) -> Result<Point, CaptureError> {
        if !p.is_finite() {
            return Err(CaptureError::NonFinite { x: p.x, y: p.y });
        }
        let (w, h) = (self.input.width as f64, self.input.height as f64);
        if p.x < 0.0 || p.y < 0.0 || p.x > w || p.y > h {
            return Err(CaptureError::OutOfBounds {
                x: p.x,
                y: p.y,
                width: self.input.width,
                height: self.input.height,
            });
        }
        Ok(p)
    }

    /// Validate then rescale.
    pub fn map(&self, p: Point) -> Result<Point, CaptureError> {
        self.validate(p).map(|p| self.to_document(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_2x() -> CoordinateMap {
        CoordinateMap::new(SurfaceSize::new(400, 300), SurfaceSize::new(800, 600)).unwrap()
    }

    #[test]
    fn scales_into_document_space() {
        let map = map_2x();
        assert_eq!(map.scale(), (2.0, 2.0));
        assert_eq!(map.to_document(Point::new(10.0, 50.0)), Point::new(20.0, 100.0));
    }

    #[test]
    fn round_trip_within_tolerance() {
        let map = CoordinateMap::new(SurfaceSize::new(333, 777), SurfaceSize::new(595, 842)).unwrap();
        let samples = [
            Point::new(0.0, 0.0),
            Point::new(0.1, 776.9),
            Point::new(123.456, 654.321),
            Point::new(333.0, 777.0),
            Point::new(1.0 / 3.0, 2.0 / 7.0),
        ];
        for p in samples {
            let back = map.to_input(map.to_document(p));
            assert!((back.x - p.x).abs() < 1e-9, "x drifted: {p:?} -> {back:?}");
            assert!((back.y - p.y).abs() < 1e-9, "y drifted: {p:?} -> {back:?}");
        }
    }

    #[test]
    fn rejects_empty_input_surface() {
        let err = CoordinateMap::new(SurfaceSize::new(0, 300), SurfaceSize::new(800, 600)).unwrap_err();
        assert!(matches!(err, CaptureError::EmptyInputSurface { width: 0, height: 300 }));
    }

    #[test]
    fn validate_flags_bad_points() {
        let map = map_2x();
        assert!(matches!(
            map.validate(Point::new(f64::NAN, 1.0)),
            Err(CaptureError::NonFinite { .. })
        ));
        assert!(matches!(
            map.validate(Point::new(401.0, 1.0)),
            Err(CaptureError::OutOfBounds { .. })
        ));
        assert!(matches!(
            map.validate(Point::new(-0.5, 1.0)),
            Err(CaptureError::OutOfBounds { .. })
        ));
        // Edges are inclusive.
        assert!(map.validate(Point::new(400.0, 300.0)).is_ok());
    }

    #[test]
    fn parse_surface_size() {
        assert_eq!(SurfaceSize::parse("400x300"), Some(SurfaceSize::new(400, 300)));
        assert_eq!(SurfaceSize::parse(" 10 X 20 "), Some(SurfaceSize::new(10, 20)));
        assert_eq!(SurfaceSize::parse("400"), None);
        assert_eq!(SurfaceSize::new(0, 5).to_string(), "0x5");
        assert!(SurfaceSize::new(0, 5).is_empty());
    }
}
