//! A queue shared between the caller and in-flight uploads.

use crate::error::Result;
use crate::file::{IncomingFile, StageOutcome, StagedFile, StagedFileView};
use crate::queue::{EventOutcome, StagingQueue, Summary};
use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, Weak};

/// Cloneable handle to a [`StagingQueue`] behind a mutex.
#[derive(Debug)]
pub struct SharedQueue<H> {
    inner: Arc<Mutex<StagingQueue<H>>>,
}

impl<H> Clone for SharedQueue<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> SharedQueue<H> {
    pub fn new(queue: StagingQueue<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(queue)),
        }
    }

    /// Locks the queue. Do not hold the guard across an await point.
    pub fn lock(&self) -> MutexGuard<'_, StagingQueue<H>> {
        self.inner.lock()
    }

    pub fn stage(&self, files: impl IntoIterator<Item = IncomingFile<H>>) -> StageOutcome<H> {
        self.inner.lock().stage(files)
    }

    pub fn remove(&self, id: &str) -> Option<StagedFile<H>> {
        self.inner.lock().remove(id)
    }

    pub fn summary(&self) -> Summary {
        self.inner.lock().summary()
    }

    pub fn views(&self) -> Vec<StagedFileView> {
        self.inner.lock().views()
    }

    /// Starts a pending file and returns a reporter bound to it.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`StagingQueue::start`].
    pub fn start(&self, id: &str) -> Result<UploadReporter<H>> {
        let view = self.inner.lock().start(id)?;
        Ok(UploadReporter {
            file: view,
            queue: Arc::downgrade(&self.inner),
        })
    }

    /// Starts a pending file and hands back a copy of its handle too.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`StagingQueue::start`].
    pub fn begin_upload(&self, id: &str) -> Result<StartedUpload<H>>
    where
        H: Clone,
    {
        let mut queue = self.inner.lock();
        let file = queue.start(id)?;
        // start succeeded, so the file is present
        let handle = queue
            .get(id)
            .map(|f| f.handle().clone())
            .ok_or_else(|| crate::error::StagingError::UnknownFile(id.to_string()))?;
        Ok(StartedUpload {
            handle,
            reporter: UploadReporter {
                file,
                queue: Arc::downgrade(&self.inner),
            },
        })
    }
}

/// An upload that has been started, with everything a transport needs.
#[derive(Debug)]
pub struct StartedUpload<H> {
    pub handle: H,
    pub reporter: UploadReporter<H>,
}

/// Reports events for one upload back to its queue.
///
/// The terminal methods consume the reporter, so each upload reports
/// success or failure at most once. If the queue has been dropped, or the
/// file removed, every report is ignored.
#[derive(Debug)]
pub struct UploadReporter<H> {
    file: StagedFileView,
    queue: Weak<Mutex<StagingQueue<H>>>,
}

impl<H> UploadReporter<H> {
    pub fn id(&self) -> &str {
        &self.file.id
    }

    /// The file as it was when the upload started.
    pub fn file(&self) -> &StagedFileView {
        &self.file
    }

    /// A cloneable progress-only handle for the transport.
    pub fn progress_handle(&self) -> ProgressHandle<H> {
        ProgressHandle {
            id: self.file.id.clone(),
            queue: Weak::clone(&self.queue),
        }
    }

    pub fn progress(&self, percent: u8) -> EventOutcome {
        self.with_queue(|q| q.progress(&self.file.id, percent))
    }

    pub fn complete(self, url: Option<String>) -> EventOutcome {
        self.with_queue(|q| q.complete(&self.file.id, url))
    }

    pub fn fail(self, reason: impl Into<String>) -> EventOutcome {
        self.with_queue(|q| q.fail(&self.file.id, reason))
    }

    fn with_queue(&self, f: impl FnOnce(&mut StagingQueue<H>) -> EventOutcome) -> EventOutcome {
        let Some(queue) = self.queue.upgrade() else {
            return EventOutcome::Ignored;
        };
        let mut guard = queue.lock();
        f(&mut guard)
    }
}

/// Progress-only reporter, safe to hand to transport callbacks.
#[derive(Debug)]
pub struct ProgressHandle<H> {
    id: String,
    queue: Weak<Mutex<StagingQueue<H>>>,
}

impl<H> Clone for ProgressHandle<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            queue: Weak::clone(&self.queue),
        }
    }
}

impl<H> ProgressHandle<H> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn report(&self, percent: u8) -> EventOutcome {
        let Some(queue) = self.queue.upgrade() else {
            return EventOutcome::Ignored;
        };
        let mut guard = queue.lock();
        guard.progress(&self.id, percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StagingConfig;
    use crate::file::Status;

    fn shared_with(names: &[&str]) -> (SharedQueue<String>, Vec<String>) {
        let shared = SharedQueue::new(StagingQueue::new(StagingConfig::default()));
        let files = names
            .iter()
            .map(|n| IncomingFile::new(format!("/tmp/{n}"), *n, 10, "text/plain"));
        let ids = shared.stage(files).accepted.into_iter().map(|v| v.id).collect();
        (shared, ids)
    }

    #[test]
    fn test_reporter_drives_queue() {
        let (shared, ids) = shared_with(&["a.txt"]);
        let reporter = shared.start(&ids[0]).expect("start");
        assert_eq!(reporter.file().status, Status::Uploading);

        let progress = reporter.progress_handle();
        assert!(progress.report(30).is_applied());
        assert_eq!(shared.lock().get(&ids[0]).expect("file").progress(), 30);

        assert!(reporter.complete(None).is_applied());
        assert_eq!(shared.lock().get(&ids[0]).expect("file").status(), Status::Success);
        assert_eq!(progress.report(10), EventOutcome::Ignored);
    }

    #[test]
    fn test_reporter_after_remove() {
        let (shared, ids) = shared_with(&["a.txt"]);
        let reporter = shared.start(&ids[0]).expect("start");
        shared.remove(&ids[0]);
        assert_eq!(reporter.progress(50), EventOutcome::Ignored);
        assert_eq!(reporter.fail("gone"), EventOutcome::Ignored);
        assert!(shared.views().is_empty());
    }

    #[test]
    fn test_reporter_outlives_queue() {
        let (shared, ids) = shared_with(&["a.txt"]);
        let reporter = shared.start(&ids[0]).expect("start");
        drop(shared);
        assert_eq!(reporter.complete(None), EventOutcome::Ignored);
    }

    #[test]
    fn test_begin_upload_clones_handle() {
        let (shared, ids) = shared_with(&["a.txt"]);
        let started = shared.begin_upload(&ids[0]).expect("begin");
        assert_eq!(started.handle, "/tmp/a.txt");
        assert_eq!(started.reporter.id(), ids[0]);
        assert!(shared.begin_upload(&ids[0]).is_err());
    }
}
