#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Flock Staging
//!
//! A queue for files on their way to storage: validated when staged,
//! uploaded by whatever transport the caller supplies, and tracked through
//! `pending`, `uploading`, `success` and `error`.
//!
//! - **accept** - `accept` pattern parsing and matching
//! - **config** - Size, type and count limits
//! - **file** - Incoming, staged and rejected file records
//! - **queue** - The staging queue and its state machine
//! - **shared** - A queue shared with in-flight uploads
//! - **transport** - Transport seam and upload driver (requires `async`)
//!
//! ## Example
//!
//! ```rust
//! use flock_staging::prelude::*;
//!
//! let config = StagingConfig::new().max_size(1000).accept(".pdf,.png");
//! let mut queue = StagingQueue::new(config);
//!
//! let outcome = queue.stage(vec![
//!     IncomingFile::new("a", "bulletin.pdf", 900, "application/pdf"),
//!     IncomingFile::new("b", "minutes.docx", 200, "application/msword"),
//! ]);
//! assert_eq!(outcome.accepted.len(), 1);
//! assert_eq!(outcome.rejected[0].reason.label(), "type mismatch");
//!
//! let id = outcome.accepted[0].id.clone();
//! queue.start(&id).unwrap();
//! queue.progress(&id, 60);
//! queue.complete(&id, None);
//! assert_eq!(queue.get(&id).unwrap().status(), Status::Success);
//! ```

pub mod accept;
pub mod config;
pub mod error;
pub mod file;
pub mod queue;
pub mod shared;
#[cfg(feature = "async")]
pub mod transport;

pub use error::{Result, StagingError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::accept::Accept;
    pub use crate::config::StagingConfig;
    pub use crate::error::StagingError;
    pub use crate::file::{
        IncomingFile, RejectReason, Rejection, StageOutcome, StagedFile, StagedFileView, Status,
    };
    pub use crate::queue::{EventOutcome, StagingQueue, Summary};
    pub use crate::shared::{ProgressHandle, SharedQueue, StartedUpload, UploadReporter};
    #[cfg(feature = "async")]
    pub use crate::transport::{Transport, upload_pending};
}
