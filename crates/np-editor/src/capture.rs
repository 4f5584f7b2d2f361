//! Stroke capture: pointer events → ink in document space.
//!
//! Every accepted sample is validated against the input surface and
//! rescaled by the `CoordinateMap` before it is stored, so the `InkLayer`
//! never sees input-surface coordinates.

use crate::input::InputEvent;
use np_core::error::CaptureError;
use np_core::geometry::{CoordinateMap, Point};
use np_core::model::{InkLayer, InkStyle, StrokeBuilder};

/// What an event did to the ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new stroke was opened.
    Started,
    /// A point was appended to the open stroke.
    Extended,
    /// The open stroke was committed to the layer.
    Finished,
    /// Nothing to do (e.g. move with no pointer down).
    Ignored,
}

pub struct StrokeCapture {
    map: CoordinateMap,
    layer: InkLayer,
    open: Option<StrokeBuilder>,
}

impl StrokeCapture {
    pub fn new(map: CoordinateMap, style: InkStyle) -> Self {
        Self {
            map,
            layer: InkLayer::new(style),
            open: None,
        }
    }

    pub fn map(&self) -> &CoordinateMap {
        &self.map
    }

    /// Committed strokes.
    pub fn layer(&self) -> &InkLayer {
        &self.layer
    }

    /// Points of the stroke under the pointer, in document space.
    pub fn open_points(&self) -> Option<&[Point]> {
        self.open.as_ref().map(StrokeBuilder::points)
    }

    pub fn is_drawing(&self) -> bool {
        self.open.is_some()
    }

    /// Apply one event.
    ///
    /// A sample that fails validation is dropped and reported as `Err`; the
    /// capture state stays as it was apart from a pointer-down still
    /// opening its stroke.
    pub fn handle(&mut self, event: &InputEvent) -> Result<CaptureOutcome, CaptureError> {
        match *event {
            InputEvent::Down { x, y } => {
                if self.open.is_some() {
                    log::debug!("pointer-down with a stroke still open, committing it");
                    self.finish();
                }
                self.open = Some(StrokeBuilder::new());
                self.append(Point::new(x, y))?;
                Ok(CaptureOutcome::Started)
            }
            InputEvent::Move { x, y } => {
                if self.open.is_none() {
                    return Ok(CaptureOutcome::Ignored);
                }
                self.append(Point::new(x, y))?;
                Ok(CaptureOutcome::Extended)
            }
            InputEvent::Up { x, y } => {
                if self.open.is_none() {
                    return Ok(CaptureOutcome::Ignored);
                }
                let appended = self.append(Point::new(x, y));
                self.finish();
                appended.map(|_| CaptureOutcome::Finished)
            }
            InputEvent::Cancel => {
                if self.open.is_none() {
                    return Ok(CaptureOutcome::Ignored);
                }
                self.finish();
                Ok(CaptureOutcome::Finished)
            }
        }
    }

    /// Commit the open stroke, if any.
    pub fn finish(&mut self) {
        if let Some(open) = self.open.take() {
            log::trace!("stroke finished with {} points", open.len());
            self.layer.push(open.finish());
        }
    }

    /// Drop every stroke, open or committed. Idempotent.
    pub fn clear(&mut self) {
        self.open = None;
        self.layer.clear();
    }

    fn append(&mut self, p: Point) -> Result<(), CaptureError> {
        let mapped = self.map.map(p).inspect_err(|e| log::warn!("dropping pointer sample: {e}"))?;
        if let Some(open) = self.open.as_mut() {
            // Consecutive duplicates add no ink.
            if open.points().last() != Some(&mapped) {
                open.push(mapped);
            }
        }
        Ok(())
    }
}
