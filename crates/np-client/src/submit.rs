//! Confirm → composite → upload.
//!
//! Compositing runs on the blocking pool so the caller's event loop stays
//! responsive. Once a session is committed its composite is kept, and a
//! failed upload can be retried without signing again.

use crate::error::SubmitError;
use crate::upload::UploadSink;
use np_core::error::UploadError;
use np_editor::{SessionState, SigningSession};

/// Flatten `session` (unless already committed) and upload the result.
pub async fn submit<S: UploadSink>(
    session: &mut SigningSession,
    sink: &S,
    filename: &str,
    record_id: &str,
) -> Result<(), SubmitError> {
    if session.state() != SessionState::Committed {
        let job = session.composite_job()?;
        let image = tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| SubmitError::Worker(e.to_string()))?
            .map_err(np_editor::SessionError::from)?;
        session.commit(image)?;
    }
    retry_upload(session, sink, filename, record_id).await
}

/// Re-send the stored composite of a committed session.
pub async fn retry_upload<S: UploadSink>(
    session: &SigningSession,
    sink: &S,
    filename: &str,
    record_id: &str,
) -> Result<(), SubmitError> {
    let image = session.composite().ok_or(UploadError::NothingToUpload)?;
    sink.upload(image.as_png(), filename, record_id)
        .await
        .inspect_err(|e| log::warn!("upload of {filename} failed: {e}"))?;
    Ok(())
}
