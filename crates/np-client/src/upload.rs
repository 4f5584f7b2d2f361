//! Upload sink seam.

use np_core::error::UploadError;
use std::future::Future;

/// Accepts the signed image. Failures are reported, never retried here.
pub trait UploadSink {
    fn upload(
        &self,
        image: &[u8],
        filename: &str,
        record_id: &str,
    ) -> impl Future<Output = Result<(), UploadError>> + Send;
}
