//! The staging queue.
//!
//! Files are validated when staged, then walk a small state machine driven
//! by the caller:
//!
//! ```text
//! pending --start--> uploading --complete--> success
//!                        |
//!                        +------fail-------> error
//! ```
//!
//! `remove` works from any state. Progress and terminal events for a file
//! that has been removed or already finished are ignored, so a transport
//! that reports late never resurrects anything.

use crate::config::StagingConfig;
use crate::error::{Result, StagingError};
use crate::file::{IncomingFile, RejectReason, Rejection, StageOutcome, StagedFile, StagedFileView, Status};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> String {
    format!("staged-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Whether a transport event changed the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event updated the file.
    Applied,
    /// The file is gone or not uploading.
    Ignored,
}

impl EventOutcome {
    /// True if the event changed the queue.
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Counts and aggregate progress over the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Files waiting to start.
    pub pending: usize,
    /// Files with an upload in flight.
    pub uploading: usize,
    /// Files that finished successfully.
    pub succeeded: usize,
    /// Files whose upload failed.
    pub failed: usize,
    /// Combined size of every staged file.
    pub total_bytes: u64,
    /// Size-weighted progress over all staged files, 0 to 100.
    pub progress: u8,
}

impl Summary {
    /// Number of files in the queue.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.uploading + self.succeeded + self.failed
    }

    /// True when nothing is pending or uploading.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending == 0 && self.uploading == 0
    }
}

/// Validated files waiting for, or going through, upload.
#[derive(Debug, Clone)]
pub struct StagingQueue<H> {
    config: StagingConfig,
    files: Vec<StagedFile<H>>,
}

impl<H> Default for StagingQueue<H> {
    fn default() -> Self {
        Self::new(StagingConfig::default())
    }
}

impl<H> StagingQueue<H> {
    /// Creates an empty queue with the given limits.
    #[must_use]
    pub fn new(config: StagingConfig) -> Self {
        Self {
            config,
            files: Vec::new(),
        }
    }

    pub fn config(&self) -> &StagingConfig {
        &self.config
    }

    /// Staged files in staging order.
    pub fn files(&self) -> &[StagedFile<H>] {
        &self.files
    }

    pub fn get(&self, id: &str) -> Option<&StagedFile<H>> {
        self.files.iter().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut StagedFile<H>> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Snapshots of every staged file.
    pub fn views(&self) -> Vec<StagedFileView> {
        self.files.iter().map(StagedFile::view).collect()
    }

    /// Ids of pending files that may start uploading.
    pub fn pending_ids(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.status == Status::Pending && f.validation_error.is_none())
            .map(|f| f.id.clone())
            .collect()
    }

    fn check(&self, file: &IncomingFile<H>) -> Option<RejectReason> {
        if let Some(max) = self.config.max_size {
            if file.size > max {
                return Some(RejectReason::SizeExceeded { size: file.size, max });
            }
        }
        if let Some(accept) = &self.config.accept {
            if !accept.matches(&file.name, &file.mime_type) {
                return Some(RejectReason::TypeMismatch {
                    mime_type: file.mime_type.clone(),
                    accept: accept.to_string(),
                });
            }
        }
        None
    }

    /// Validates and stages a batch of files.
    ///
    /// Each file is checked in order: size, type, the single-file rule, then
    /// the file count limit. Files that fail come back in
    /// [`StageOutcome::rejected`] with the first failing reason.
    pub fn stage(&mut self, files: impl IntoIterator<Item = IncomingFile<H>>) -> StageOutcome<H> {
        let mut outcome = StageOutcome::default();
        let mut room = self
            .config
            .max_files
            .map(|max| max.saturating_sub(self.files.len()));

        for file in files {
            let reason = if let Some(reason) = self.check(&file) {
                Some(reason)
            } else if !self.config.multiple && !self.files.is_empty() {
                Some(RejectReason::MultipleNotAllowed)
            } else if room == Some(0) {
                Some(RejectReason::MaxFilesExceeded {
                    max: self.config.max_files.unwrap_or_default(),
                })
            } else {
                None
            };

            if let Some(reason) = reason {
                debug!(
                    file = %file.name,
                    size = file.size,
                    reason = reason.label(),
                    "Rejected file"
                );
                outcome.rejected.push(Rejection { file, reason });
                continue;
            }

            if let Some(left) = room.as_mut() {
                *left -= 1;
            }
            let staged = StagedFile::from_incoming(next_id(), file);
            debug!(
                id = %staged.id,
                file = %staged.name,
                size = staged.size,
                "Staged file"
            );
            outcome.accepted.push(staged.view());
            self.files.push(staged);
        }
        outcome
    }

    /// Moves a pending file to uploading.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown, the file is not pending, or it
    /// carries a validation error.
    pub fn start(&mut self, id: &str) -> Result<StagedFileView> {
        let file = self
            .get_mut(id)
            .ok_or_else(|| StagingError::UnknownFile(id.to_string()))?;
        if file.status != Status::Pending {
            return Err(StagingError::InvalidTransition {
                id: id.to_string(),
                action: "start",
                status: file.status,
            });
        }
        if let Some(reason) = &file.validation_error {
            return Err(StagingError::Invalid {
                id: id.to_string(),
                reason: reason.clone(),
            });
        }
        file.status = Status::Uploading;
        file.progress = 0;
        debug!(id, "Upload started");
        Ok(file.view())
    }

    /// Records upload progress. Values above 100 are clamped.
    pub fn progress(&mut self, id: &str, percent: u8) -> EventOutcome {
        match self.get_mut(id) {
            Some(file) if file.status == Status::Uploading => {
                file.progress = percent.min(100);
                trace!(id, progress = file.progress, "Upload progress");
                EventOutcome::Applied
            }
            _ => self.ignored(id, "progress"),
        }
    }

    /// Marks an uploading file as succeeded.
    pub fn complete(&mut self, id: &str, url: Option<String>) -> EventOutcome {
        match self.get_mut(id) {
            Some(file) if file.status == Status::Uploading => {
                file.status = Status::Success;
                file.progress = 100;
                file.url = url;
                debug!(id, "Upload succeeded");
                EventOutcome::Applied
            }
            _ => self.ignored(id, "complete"),
        }
    }

    /// Marks an uploading file as failed.
    pub fn fail(&mut self, id: &str, reason: impl Into<String>) -> EventOutcome {
        let reason = reason.into();
        match self.get_mut(id) {
            Some(file) if file.status == Status::Uploading => {
                debug!(id, reason = %reason, "Upload failed");
                file.status = Status::Error;
                file.error = Some(reason);
                EventOutcome::Applied
            }
            _ => self.ignored(id, "fail"),
        }
    }

    fn ignored(&self, id: &str, event: &'static str) -> EventOutcome {
        let status = self.get(id).map(|f| f.status);
        debug!(
            id,
            event,
            status = ?status,
            "Ignored transport event"
        );
        EventOutcome::Ignored
    }

    /// Removes a file in any state, returning it.
    pub fn remove(&mut self, id: &str) -> Option<StagedFile<H>> {
        let pos = self.files.iter().position(|f| f.id == id)?;
        let file = self.files.remove(pos);
        debug!(id, status = %file.status, "Removed file");
        Some(file)
    }

    /// Flags a pending file as invalid, blocking its upload.
    ///
    /// This is for checks that only the caller can make, such as reading
    /// the file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the file is not pending.
    pub fn set_validation_error(&mut self, id: &str, message: impl Into<String>) -> Result<()> {
        let file = self.pending_mut(id, "flag")?;
        file.validation_error = Some(message.into());
        Ok(())
    }

    /// Clears a validation error set by [`set_validation_error`](Self::set_validation_error).
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the file is not pending.
    pub fn clear_validation_error(&mut self, id: &str) -> Result<()> {
        let file = self.pending_mut(id, "unflag")?;
        file.validation_error = None;
        Ok(())
    }

    fn pending_mut(&mut self, id: &str, action: &'static str) -> Result<&mut StagedFile<H>> {
        let file = self
            .get_mut(id)
            .ok_or_else(|| StagingError::UnknownFile(id.to_string()))?;
        if file.status != Status::Pending {
            return Err(StagingError::InvalidTransition {
                id: id.to_string(),
                action,
                status: file.status,
            });
        }
        Ok(file)
    }

    /// Removes and returns every succeeded file.
    pub fn take_succeeded(&mut self) -> Vec<StagedFile<H>> {
        let (done, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.status == Status::Success);
        self.files = rest;
        done
    }

    /// Drops every file in a terminal state and returns how many went.
    pub fn clear_finished(&mut self) -> usize {
        let before = self.files.len();
        self.files.retain(|f| !f.status.is_terminal());
        before - self.files.len()
    }

    /// Counts files by status and computes overall progress.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        let mut weighted: u128 = 0;
        let mut plain: u64 = 0;
        for file in &self.files {
            match file.status {
                Status::Pending => summary.pending += 1,
                Status::Uploading => summary.uploading += 1,
                Status::Success => summary.succeeded += 1,
                Status::Error => summary.failed += 1,
            }
            summary.total_bytes += file.size;
            weighted += u128::from(file.size) * u128::from(file.progress);
            plain += u64::from(file.progress);
        }
        summary.progress = if summary.total_bytes > 0 {
            (weighted / u128::from(summary.total_bytes)) as u8
        } else if self.files.is_empty() {
            0
        } else {
            // Zero-byte files only
            (plain / self.files.len() as u64) as u8
        };
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64, mime: &str) -> IncomingFile<&'static str> {
        IncomingFile::new("handle", name, size, mime)
    }

    fn queue(config: StagingConfig) -> StagingQueue<&'static str> {
        StagingQueue::new(config)
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let mut q = queue(StagingConfig::new().max_size(1000));
        let out = q.stage(vec![file("big.bin", 1001, ""), file("ok.bin", 1000, "")]);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.accepted[0].name, "ok.bin");
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].reason.label(), "size exceeded");
        assert_eq!(out.rejected[0].file.name, "big.bin");
    }

    #[test]
    fn test_single_file_mode() {
        let mut q = queue(StagingConfig::new().multiple(false));
        let out = q.stage(vec![file("a.pdf", 1, ""), file("b.pdf", 1, "")]);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::MultipleNotAllowed);

        // A second batch is rejected too while the first file is staged
        let out = q.stage(vec![file("c.pdf", 1, "")]);
        assert!(out.accepted.is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_type_check_before_multiple() {
        let mut q = queue(StagingConfig::new().multiple(false).accept(".pdf"));
        let out = q.stage(vec![file("a.docx", 1, ""), file("b.pdf", 1, "")]);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.accepted[0].name, "b.pdf");
        assert_eq!(out.rejected[0].reason.label(), "type mismatch");
    }

    #[test]
    fn test_max_files() {
        let mut q = queue(StagingConfig::new().max_files(2));
        q.stage(vec![file("a", 1, "")]);
        let out = q.stage(vec![file("b", 1, ""), file("c", 1, "")]);
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::MaxFilesExceeded { max: 2 });
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut q = queue(StagingConfig::default());
        let out = q.stage(vec![file("a", 1, ""), file("b", 1, "")]);
        assert_ne!(out.accepted[0].id, out.accepted[1].id);
        assert!(out.accepted[0].id.starts_with("staged-"));
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut q = queue(StagingConfig::default());
        let id = q.stage(vec![file("a", 10, "")]).accepted[0].id.clone();

        let view = q.start(&id).expect("start");
        assert_eq!(view.status, Status::Uploading);
        assert_eq!(q.progress(&id, 40), EventOutcome::Applied);
        assert_eq!(q.progress(&id, 250), EventOutcome::Applied);
        assert_eq!(q.get(&id).expect("file").progress(), 100);
        assert_eq!(
            q.complete(&id, Some("https://files.example/a".into())),
            EventOutcome::Applied
        );

        let staged = q.get(&id).expect("file");
        assert_eq!(staged.status(), Status::Success);
        assert_eq!(staged.url(), Some("https://files.example/a"));
    }

    #[test]
    fn test_failure_records_reason() {
        let mut q = queue(StagingConfig::default());
        let id = q.stage(vec![file("a", 10, "")]).accepted[0].id.clone();
        q.start(&id).expect("start");
        assert!(q.fail(&id, "connection reset").is_applied());
        let staged = q.get(&id).expect("file");
        assert_eq!(staged.status(), Status::Error);
        assert_eq!(staged.error(), Some("connection reset"));
    }

    #[test]
    fn test_events_after_terminal_are_ignored() {
        let mut q = queue(StagingConfig::default());
        let id = q.stage(vec![file("a", 10, "")]).accepted[0].id.clone();
        q.start(&id).expect("start");
        q.complete(&id, None);

        assert_eq!(q.progress(&id, 10), EventOutcome::Ignored);
        assert_eq!(q.fail(&id, "late"), EventOutcome::Ignored);
        assert_eq!(q.get(&id).expect("file").status(), Status::Success);
        assert_eq!(q.get(&id).expect("file").progress(), 100);
    }

    #[test]
    fn test_events_after_remove_are_ignored() {
        let mut q = queue(StagingConfig::default());
        let id = q.stage(vec![file("a", 10, "")]).accepted[0].id.clone();
        q.start(&id).expect("start");
        assert!(q.remove(&id).is_some());

        assert_eq!(q.progress(&id, 50), EventOutcome::Ignored);
        assert_eq!(q.complete(&id, None), EventOutcome::Ignored);
        assert!(q.get(&id).is_none());
        assert!(q.remove(&id).is_none());
    }

    #[test]
    fn test_progress_on_pending_is_ignored() {
        let mut q = queue(StagingConfig::default());
        let id = q.stage(vec![file("a", 10, "")]).accepted[0].id.clone();
        assert_eq!(q.progress(&id, 50), EventOutcome::Ignored);
        assert_eq!(q.complete(&id, None), EventOutcome::Ignored);
        assert_eq!(q.get(&id).expect("file").status(), Status::Pending);
    }

    #[test]
    fn test_start_errors() {
        let mut q = queue(StagingConfig::default());
        assert_eq!(
            q.start("staged-nope"),
            Err(StagingError::UnknownFile("staged-nope".into()))
        );

        let id = q.stage(vec![file("a", 10, "")]).accepted[0].id.clone();
        q.start(&id).expect("start");
        assert!(matches!(
            q.start(&id),
            Err(StagingError::InvalidTransition { action: "start", .. })
        ));
    }

    #[test]
    fn test_validation_error_blocks_start() {
        let mut q = queue(StagingConfig::default());
        let id = q.stage(vec![file("a.csv", 10, "text/csv")]).accepted[0].id.clone();
        q.set_validation_error(&id, "missing header row").expect("flag");
        assert!(q.pending_ids().is_empty());
        assert!(matches!(q.start(&id), Err(StagingError::Invalid { .. })));

        q.clear_validation_error(&id).expect("unflag");
        assert_eq!(q.pending_ids(), vec![id.clone()]);
        q.start(&id).expect("start");
        assert!(q.set_validation_error(&id, "too late").is_err());
    }

    #[test]
    fn test_take_succeeded_and_clear_finished() {
        let mut q = queue(StagingConfig::default());
        let ids: Vec<String> = q
            .stage(vec![file("a", 1, ""), file("b", 1, ""), file("c", 1, "")])
            .accepted
            .into_iter()
            .map(|v| v.id)
            .collect();
        for id in &ids[..2] {
            q.start(id).expect("start");
        }
        q.complete(&ids[0], None);
        q.fail(&ids[1], "boom");

        let done = q.take_succeeded();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id(), ids[0]);
        assert_eq!(q.len(), 2);

        assert_eq!(q.clear_finished(), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.files()[0].id(), ids[2]);
    }

    #[test]
    fn test_summary_weights_by_size() {
        let mut q = queue(StagingConfig::default());
        let ids: Vec<String> = q
            .stage(vec![file("small", 100, ""), file("large", 300, "")])
            .accepted
            .into_iter()
            .map(|v| v.id)
            .collect();
        q.start(&ids[0]).expect("start");
        q.complete(&ids[0], None);
        q.start(&ids[1]).expect("start");
        q.progress(&ids[1], 50);

        let summary = q.summary();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.uploading, 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.total_bytes, 400);
        // (100 * 100 + 300 * 50) / 400
        assert_eq!(summary.progress, 62);
        assert!(!summary.is_settled());
    }

    #[test]
    fn test_summary_empty_and_zero_bytes() {
        let mut q = queue(StagingConfig::default());
        assert_eq!(q.summary(), Summary::default());
        assert!(q.summary().is_settled());

        let id = q.stage(vec![file("empty", 0, "")]).accepted[0].id.clone();
        q.start(&id).expect("start");
        q.complete(&id, None);
        assert_eq!(q.summary().progress, 100);
    }
}
