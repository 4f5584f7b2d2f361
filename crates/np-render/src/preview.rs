//! Incremental ink preview.
//!
//! The preview is called after every pointer sample with the full stroke
//! set. It remembers how far it has drawn (`cursor`) and only stamps
//! segments past that point, so the cost per call is proportional to the
//! new input. Because the rasterizer merges with `max`, the incremental
//! result is byte-identical to drawing everything from scratch.

use crate::raster::{blank_layer, paint_points};
use image::RgbaImage;
use np_core::geometry::{Point, SurfaceSize};
use np_core::model::{InkStyle, Stroke};

/// Position in the concatenated stroke sequence (`committed ++ [open]`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cursor {
    /// Strokes drawn completely; all of them are committed.
    strokes_done: usize,
    /// Points already drawn of the stroke at index `strokes_done`.
    partial: usize,
}

/// Live preview layer.
///
/// Successive `render` calls are expected to extend the previous stroke
/// set. When they do not (strokes removed, or the last drawn point moved),
/// the layer is wiped and redrawn.
pub struct InkPreview {
    style: InkStyle,
    layer: RgbaImage,
    cursor: Cursor,
    /// Last point painted, used to detect a swapped stroke set.
    last: Option<Point>,
}

impl InkPreview {
    /// Transparent preview the size of the document surface.
    pub fn new(size: SurfaceSize, style: InkStyle) -> Self {
        Self {
            style,
            layer: blank_layer(size),
            cursor: Cursor::default(),
            last: None,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        let (width, height) = self.layer.dimensions();
        SurfaceSize::new(width, height)
    }

    pub fn layer(&self) -> &RgbaImage {
        &self.layer
    }

    /// Bring the preview up to date with `committed` strokes plus the
    /// stroke still under the pointer.
    pub fn render(&mut self, committed: &[Stroke], open: Option<&[Point]>) -> &RgbaImage {
        if !self.is_prefix_of(committed, open) {
            log::debug!("stroke set no longer extends the preview, redrawing");
            self.clear();
        }

        let total = committed.len() + usize::from(open.is_some());
        for i in self.cursor.strokes_done..total {
            let (points, finished) = match committed.get(i) {
                Some(stroke) => (stroke.points(), true),
                None => (open.unwrap_or_default(), false),
            };
            let from = if i == self.cursor.strokes_done {
                self.cursor.partial
            } else {
                0
            };
            paint_points(&mut self.layer, points, from, &self.style);
            if let Some(&p) = points.last() {
                self.last = Some(p);
            }

            self.cursor = if finished {
                Cursor {
                    strokes_done: i + 1,
                    partial: 0,
                }
            } else {
                Cursor {
                    strokes_done: i,
                    partial: points.len(),
                }
            };
        }
        log::trace!("preview cursor at {:?}", self.cursor);
        &self.layer
    }

    /// Blank the layer and forget everything drawn. Idempotent.
    pub fn clear(&mut self) {
        for px in self.layer.pixels_mut() {
            px.0 = [0; 4];
        }
        self.cursor = Cursor::default();
        self.last = None;
    }

    /// Fully transparent?
    pub fn is_blank(&self) -> bool {
        self.layer.pixels().all(|px| px.0[3] == 0)
    }

    /// Whether what is already drawn is still part of the stroke set: the
    /// drawn counts fit and the last drawn point is where it was.
    fn is_prefix_of(&self, committed: &[Stroke], open: Option<&[Point]>) -> bool {
        let Cursor {
            strokes_done,
            partial,
        } = self.cursor;
        if committed.len() < strokes_done {
            return false;
        }
        let expected = if partial == 0 {
            strokes_done
                .checked_sub(1)
                .and_then(|i| committed[i].points().last().copied())
        } else {
            let current = match committed.get(strokes_done) {
                Some(stroke) => Some(stroke.points()),
                None => open,
            };
            match current {
                Some(points) if points.len() >= partial => Some(points[partial - 1]),
                _ => return false,
            }
        };
        expected == self.last
    }
}
