//! Signing session state machine.
//!
//! ```text
//! Idle ──pointer-down──▶ Capturing ──confirm──▶ Committed
//!   ▲                        │
//!   └──────clear/cancel──────┘
//! ```
//!
//! A session is built around an already-rendered `DocumentSurface`, so
//! capture can never start before the document exists. `Committed` is
//! terminal: the composite is kept so an upload can be retried without
//! signing again. A new signature needs a new session.

use crate::capture::{CaptureOutcome, StrokeCapture};
use crate::input::InputEvent;
use np_core::error::{CaptureError, EncodingError};
use np_core::geometry::{CoordinateMap, SurfaceSize};
use np_core::model::{InkLayer, InkStyle};
use np_render::{CompositeImage, DocumentSurface, InkPreview, RgbaImage};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Committed,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Confirm before any ink was captured
    #[error("nothing has been signed yet")]
    NothingToCommit,

    /// The session is terminal
    #[error("session already committed")]
    AlreadyCommitted,

    /// Input surface unusable
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Composite failed; the session is unchanged
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Everything needed to flatten a session, detached from it so it can run
/// on a worker thread.
#[derive(Debug, Clone)]
pub struct CompositeJob {
    surface: Arc<DocumentSurface>,
    ink: InkLayer,
}

impl CompositeJob {
    pub fn ink(&self) -> &InkLayer {
        &self.ink
    }

    pub fn run(self) -> Result<CompositeImage, EncodingError> {
        np_render::composite(&self.surface, &self.ink)
    }
}

pub struct SigningSession {
    surface: Arc<DocumentSurface>,
    capture: StrokeCapture,
    preview: InkPreview,
    state: SessionState,
    composite: Option<CompositeImage>,
}

impl SigningSession {
    /// Start a session over `surface`, with pointer input arriving in an
    /// `input`-sized widget.
    pub fn new(surface: DocumentSurface, input: SurfaceSize, style: InkStyle) -> Result<Self, SessionError> {
        let document = surface.size();
        let map = CoordinateMap::new(input, document)?;
        log::info!("signing session over {document} document, input {input}");
        Ok(Self {
            surface: Arc::new(surface),
            capture: StrokeCapture::new(map, style),
            preview: InkPreview::new(document, style),
            state: SessionState::Idle,
            composite: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn surface(&self) -> &DocumentSurface {
        &self.surface
    }

    /// Committed strokes, in document space.
    pub fn ink(&self) -> &InkLayer {
        self.capture.layer()
    }

    pub fn preview(&self) -> &RgbaImage {
        self.preview.layer()
    }

    /// The composite produced by confirm, once committed.
    pub fn composite(&self) -> Option<&CompositeImage> {
        self.composite.as_ref()
    }

    /// Feed one pointer event and refresh the preview.
    pub fn handle(&mut self, event: &InputEvent) -> Result<CaptureOutcome, CaptureError> {
        if self.state == SessionState::Committed {
            log::debug!("ignoring {event:?} on committed session");
            return Ok(CaptureOutcome::Ignored);
        }

        let result = self.capture.handle(event);
        if self.state == SessionState::Idle && matches!(event, InputEvent::Down { .. }) {
            log::info!("session: Idle -> Capturing");
            self.state = SessionState::Capturing;
        }
        self.refresh_preview();
        result
    }

    /// Draw whatever arrived since the last refresh.
    pub fn refresh_preview(&mut self) -> &RgbaImage {
        self.preview
            .render(self.capture.layer().strokes(), self.capture.open_points())
    }

    /// Discard all ink and blank the preview. Idempotent outside `Committed`.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Committed {
            return Err(SessionError::AlreadyCommitted);
        }
        self.capture.clear();
        self.preview.clear();
        if self.state == SessionState::Capturing {
            log::info!("session: Capturing -> Idle");
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Close any open stroke and snapshot the session for compositing.
    /// Fails with `NothingToCommit` unless at least one stroke holds ink.
    pub fn composite_job(&mut self) -> Result<CompositeJob, SessionError> {
        match self.state {
            SessionState::Idle => return Err(SessionError::NothingToCommit),
            SessionState::Committed => return Err(SessionError::AlreadyCommitted),
            SessionState::Capturing => {}
        }
        self.capture.finish();
        self.refresh_preview();
        // Every sample may have been rejected; a bare document is not signed.
        if self.capture.layer().is_empty() {
            return Err(SessionError::NothingToCommit);
        }
        Ok(CompositeJob {
            surface: Arc::clone(&self.surface),
            ink: self.capture.layer().clone(),
        })
    }

    /// Accept a composite built from [`composite_job`](Self::composite_job).
    pub fn commit(&mut self, image: CompositeImage) -> Result<&CompositeImage, SessionError> {
        match self.state {
            SessionState::Idle => return Err(SessionError::NothingToCommit),
            SessionState::Committed => return Err(SessionError::AlreadyCommitted),
            SessionState::Capturing => {}
        }
        let expected = self.surface.size();
        if image.size() != expected {
            return Err(EncodingError::SizeMismatch {
                width: expected.width,
                height: expected.height,
                ink_width: image.size().width,
                ink_height: image.size().height,
            }
            .into());
        }
        log::info!("session: Capturing -> Committed ({} bytes)", image.as_png().len());
        self.state = SessionState::Committed;
        Ok(self.composite.insert(image))
    }

    /// Composite on the current thread and commit.
    pub fn confirm(&mut self) -> Result<&CompositeImage, SessionError> {
        let image = self.composite_job()?.run()?;
        self.commit(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SigningSession {
        let surface = DocumentSurface::filled(SurfaceSize::new(80, 60), [255, 255, 255, 255]);
        SigningSession::new(surface, SurfaceSize::new(40, 30), InkStyle::default()).unwrap()
    }

    #[test]
    fn first_pointer_down_starts_capturing() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Idle);
        s.handle(&InputEvent::from_pointer_move(1.0, 1.0)).unwrap();
        assert_eq!(s.state(), SessionState::Idle);
        s.handle(&InputEvent::from_pointer_down(1.0, 1.0)).unwrap();
        assert_eq!(s.state(), SessionState::Capturing);
    }

    #[test]
    fn confirm_from_idle_is_rejected() {
        let mut s = session();
        assert_eq!(s.confirm().unwrap_err(), SessionError::NothingToCommit);
    }

    #[test]
    fn confirm_with_only_rejected_samples_is_rejected() {
        let mut s = session();
        assert!(s.handle(&InputEvent::from_pointer_down(900.0, 900.0)).is_err());
        assert!(s.handle(&InputEvent::from_pointer_up(950.0, 950.0)).is_err());
        assert_eq!(s.state(), SessionState::Capturing);
        assert!(s.ink().is_empty());

        assert_eq!(s.confirm().unwrap_err(), SessionError::NothingToCommit);
        assert_eq!(s.state(), SessionState::Capturing);
        assert!(s.composite().is_none());

        // A later valid stroke can still be confirmed.
        s.handle(&InputEvent::from_pointer_down(5.0, 5.0)).unwrap();
        s.handle(&InputEvent::from_pointer_up(20.0, 20.0)).unwrap();
        assert!(s.confirm().is_ok());
    }

    #[test]
    fn committed_is_terminal() {
        let mut s = session();
        s.handle(&InputEvent::from_pointer_down(5.0, 5.0)).unwrap();
        s.handle(&InputEvent::from_pointer_move(20.0, 20.0)).unwrap();
        let size = s.confirm().unwrap().size();
        assert_eq!(size, SurfaceSize::new(80, 60));
        assert_eq!(s.state(), SessionState::Committed);
        // The open stroke was closed by confirm.
        assert_eq!(s.ink().len(), 1);

        assert_eq!(
            s.handle(&InputEvent::from_pointer_down(1.0, 1.0)),
            Ok(CaptureOutcome::Ignored)
        );
        assert_eq!(s.clear(), Err(SessionError::AlreadyCommitted));
        assert_eq!(s.confirm().unwrap_err(), SessionError::AlreadyCommitted);
        assert!(s.composite().is_some());
    }

    #[test]
    fn commit_rejects_foreign_sized_image() {
        let mut s = session();
        s.handle(&InputEvent::from_pointer_down(5.0, 5.0)).unwrap();
        let other = DocumentSurface::filled(SurfaceSize::new(10, 10), [0, 0, 0, 255]);
        let foreign = np_render::composite(&other, &InkLayer::default()).unwrap();
        assert!(matches!(
            s.commit(foreign),
            Err(SessionError::Encoding(EncodingError::SizeMismatch { .. }))
        ));
        assert_eq!(s.state(), SessionState::Capturing);
    }

    #[test]
    fn empty_input_surface_cannot_start_a_session() {
        let surface = DocumentSurface::filled(SurfaceSize::new(80, 60), [255; 4]);
        let err = SigningSession::new(surface, SurfaceSize::new(0, 0), InkStyle::default())
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::Capture(CaptureError::EmptyInputSurface { .. })));
    }
}
