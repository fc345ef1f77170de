//! Incoming and staged file records.

use serde::Serialize;
use std::fmt;

/// A file offered for staging, before validation.
///
/// `H` is whatever the caller uses to reach the file's bytes later: a path,
/// a buffer, a browser handle. The queue never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile<H> {
    /// Caller-owned reference to the bytes.
    pub handle: H,
    /// File name, used for extension matching.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, possibly empty if unknown.
    pub mime_type: String,
}

impl<H> IncomingFile<H> {
    /// Creates an incoming file record.
    pub fn new(handle: H, name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            handle,
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// Upload lifecycle of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Staged, not yet started.
    Pending,
    /// Handed to a transport.
    Uploading,
    /// Uploaded; the file has a URL.
    Success,
    /// The transport reported a failure.
    Error,
}

impl Status {
    /// Success and Error accept no further transport events.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A file that passed validation and sits in the queue.
#[derive(Debug, Clone)]
pub struct StagedFile<H> {
    pub(crate) id: String,
    pub(crate) handle: H,
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) mime_type: String,
    pub(crate) validation_error: Option<String>,
    pub(crate) status: Status,
    pub(crate) progress: u8,
    pub(crate) error: Option<String>,
    pub(crate) url: Option<String>,
}

impl<H> StagedFile<H> {
    pub(crate) fn from_incoming(id: String, file: IncomingFile<H>) -> Self {
        Self {
            id,
            handle: file.handle,
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            validation_error: None,
            status: Status::Pending,
            progress: 0,
            error: None,
            url: None,
        }
    }

    /// Queue-assigned id, `staged-<n>`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The caller's handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Consumes the record, returning the caller's handle.
    pub fn into_handle(self) -> H {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Caller-side validation failure. Blocks `start` while set.
    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Upload progress, 0 to 100.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Transport failure reason, set when the status is Error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Remote location, set on success if the transport returned one.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Snapshot without the handle, for display and events.
    pub fn view(&self) -> StagedFileView {
        StagedFileView {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            mime_type: self.mime_type.clone(),
            validation_error: self.validation_error.clone(),
            status: self.status,
            progress: self.progress,
            error: self.error.clone(),
            url: self.url.clone(),
        }
    }
}

/// Handle-free copy of a [`StagedFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFileView {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    /// Caller-side validation failure, if any.
    pub validation_error: Option<String>,
    pub status: Status,
    /// Upload progress, 0 to 100.
    pub progress: u8,
    /// Transport failure reason.
    pub error: Option<String>,
    /// Remote location after a successful upload.
    pub url: Option<String>,
}

/// Why a file was turned away at staging time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Larger than the configured maximum.
    SizeExceeded { size: u64, max: u64 },
    /// Neither the MIME type nor the extension is in the accept list.
    TypeMismatch { mime_type: String, accept: String },
    /// Single-file mode and a file is already staged.
    MultipleNotAllowed,
    /// The queue is at its file limit.
    MaxFilesExceeded { max: usize },
}

impl RejectReason {
    /// Short machine-friendly label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SizeExceeded { .. } => "size exceeded",
            Self::TypeMismatch { .. } => "type mismatch",
            Self::MultipleNotAllowed => "multiple not allowed",
            Self::MaxFilesExceeded { .. } => "max files exceeded",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeExceeded { size, max } => {
                write!(f, "size exceeded: {size} bytes is over the {max} byte limit")
            }
            Self::TypeMismatch { mime_type, accept } => {
                let shown = if mime_type.is_empty() { "unknown type" } else { mime_type };
                write!(f, "type mismatch: {shown} is not in {accept}")
            }
            Self::MultipleNotAllowed => f.write_str("multiple not allowed"),
            Self::MaxFilesExceeded { max } => write!(f, "max files exceeded: limit is {max}"),
        }
    }
}

/// A rejected file, returned to the caller with its handle intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection<H> {
    pub file: IncomingFile<H>,
    pub reason: RejectReason,
}

/// Result of one [`stage`](crate::queue::StagingQueue::stage) call.
#[derive(Debug, Clone)]
pub struct StageOutcome<H> {
    pub accepted: Vec<StagedFileView>,
    pub rejected: Vec<Rejection<H>>,
}

impl<H> Default for StageOutcome<H> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminal() {
        assert!(!Status::Pending.is_terminal());
        assert!(!Status::Uploading.is_terminal());
        assert!(Status::Success.is_terminal());
        assert!(Status::Error.is_terminal());
    }

    #[test]
    fn test_reason_labels_and_display() {
        let size = RejectReason::SizeExceeded { size: 1001, max: 1000 };
        assert_eq!(size.label(), "size exceeded");
        assert!(size.to_string().starts_with("size exceeded"));
        assert!(size.to_string().contains("1001"));

        assert_eq!(RejectReason::MultipleNotAllowed.to_string(), "multiple not allowed");

        let ty = RejectReason::TypeMismatch {
            mime_type: String::new(),
            accept: ".pdf".into(),
        };
        assert_eq!(ty.to_string(), "type mismatch: unknown type is not in .pdf");
    }

    #[test]
    fn test_view_drops_handle() {
        let file = StagedFile::from_incoming(
            "staged-1".into(),
            IncomingFile::new(vec![0u8; 4], "a.txt", 4, "text/plain"),
        );
        let view = file.view();
        assert_eq!(view.id, "staged-1");
        assert_eq!(view.status, Status::Pending);
        assert_eq!(file.into_handle().len(), 4);
    }

    #[test]
    fn test_view_serializes_status_lowercase() {
        let file = StagedFile::from_incoming("staged-9".into(), IncomingFile::new((), "a", 1, ""));
        let json = serde_json::to_value(file.view()).expect("serialize");
        assert_eq!(json["status"], "pending");
    }
}
