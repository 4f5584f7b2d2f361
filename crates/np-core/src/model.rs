//! Ink data model for a signing session.
//!
//! A session collects freehand strokes into an `InkLayer`. Every point is
//! stored in document-surface pixel space; conversion from the capture
//! surface happens before a point reaches this module (see `geometry`).

use crate::geometry::Point;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channel = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
        };
        let short = |c: u8| -> Option<f32> { Some((hex_val(c)? * 17) as f32 / 255.0) };

        match bytes.len() {
            3 => Some(Self::rgba(short(bytes[0])?, short(bytes[1])?, short(bytes[2])?, 1.0)),
            4 => Some(Self::rgba(
                short(bytes[0])?,
                short(bytes[1])?,
                short(bytes[2])?,
                short(bytes[3])?,
            )),
            6 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                channel(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}")))
    }
}

// ─── Ink style ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeCap {
    Butt,
    Round,
    Square,
}

/// Fixed rendering parameters shared by every stroke of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    /// Line width in document pixels.
    pub width: f32,
    pub color: Color,
    pub cap: StrokeCap,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            width: 2.0,
            color: Color::BLACK,
            cap: StrokeCap::Round,
        }
    }
}

// ─── Strokes ─────────────────────────────────────────────────────────────

pub type StrokePoints = SmallVec<[Point; 32]>;

/// One finished pen-down-to-pen-up path. Immutable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    points: StrokePoints,
}

impl Stroke {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A stroke still under the pointer. Grows point by point until `finish`.
#[derive(Debug, Clone, Default)]
pub struct StrokeBuilder {
    points: StrokePoints,
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn finish(self) -> Stroke {
        Stroke {
            points: self.points,
        }
    }
}

// ─── Ink layer ───────────────────────────────────────────────────────────

/// All finished strokes of one signing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InkLayer {
    style: InkStyle,
    strokes: Vec<Stroke>,
}

impl InkLayer {
    pub fn new(style: InkStyle) -> Self {
        Self {
            style,
            strokes: Vec::new(),
        }
    }

    pub fn style(&self) -> &InkStyle {
        &self.style
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Append a finished stroke. Empty strokes carry no ink and are dropped.
    pub fn push(&mut self, stroke: Stroke) {
        if stroke.is_empty() {
            log::trace!("dropping empty stroke");
            return;
        }
        self.strokes.push(stroke);
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
