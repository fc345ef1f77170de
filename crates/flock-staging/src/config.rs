//! Staging limits.

use crate::accept::Accept;
use serde::{Deserialize, Serialize};

/// Limits applied when files are staged.
///
/// Every limit is optional; the default accepts any number of files of any
/// size and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Largest accepted file, in bytes.
    pub max_size: Option<u64>,
    /// Allowed types. `None` or an empty list accepts everything.
    pub accept: Option<Accept>,
    /// Whether more than one file may be staged.
    pub multiple: bool,
    /// Most files the queue may hold at once.
    pub max_files: Option<usize>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            accept: None,
            multiple: true,
            max_files: None,
        }
    }
}

impl StagingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(Accept::from(accept.into()));
        self
    }

    #[must_use]
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }
}
