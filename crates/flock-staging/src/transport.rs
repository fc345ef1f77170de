//! Upload transport seam and the driver that feeds it (requires `async` feature).
//!
//! The queue never performs I/O. A [`Transport`] moves the bytes and
//! reports progress; [`upload_pending`] starts every pending file, runs the
//! uploads concurrently, and records how each one ended.

use crate::file::StagedFileView;
use crate::queue::Summary;
use crate::shared::{ProgressHandle, SharedQueue};
use futures::future::join_all;
use std::future::Future;
use tracing::{debug, info};

/// Moves one file to its destination.
///
/// Resolves to the remote URL on success, or a reason on failure.
pub trait Transport<H>: Send + Sync {
    fn upload(
        &self,
        file: StagedFileView,
        handle: H,
        progress: ProgressHandle<H>,
    ) -> impl Future<Output = Result<String, String>> + Send;
}

/// Uploads every pending, valid file through `transport`.
///
/// Files staged while the batch runs are left for the next call. Returns
/// the queue summary once every upload in the batch has finished.
pub async fn upload_pending<H, T>(queue: &SharedQueue<H>, transport: &T) -> Summary
where
    H: Clone,
    T: Transport<H>,
{
    let ids = queue.lock().pending_ids();
    info!(count = ids.len(), "Uploading pending files");

    let mut uploads = Vec::with_capacity(ids.len());
    for id in ids {
        let started = match queue.begin_upload(&id) {
            Ok(started) => started,
            Err(err) => {
                debug!(id = %id, error = %err, "Skipping file");
                continue;
            }
        };
        uploads.push(async move {
            let reporter = started.reporter;
            let file = reporter.file().clone();
            let progress = reporter.progress_handle();
            match transport.upload(file, started.handle, progress).await {
                Ok(url) => reporter.complete(Some(url)),
                Err(reason) => reporter.fail(reason),
            }
        });
    }

    join_all(uploads).await;
    let summary = queue.summary();
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Upload batch finished"
    );
    summary
}
