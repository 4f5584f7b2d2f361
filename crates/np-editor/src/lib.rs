pub mod capture;
pub mod input;
pub mod session;

pub use capture::{CaptureOutcome, StrokeCapture};
pub use input::InputEvent;
pub use session::{CompositeJob, SessionError, SessionState, SigningSession};
