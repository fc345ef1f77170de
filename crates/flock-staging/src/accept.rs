//! `accept` patterns, as found on file inputs.
//!
//! An accept string is a comma-separated list of entries:
//!
//! - `image/*` matches any MIME type with the `image/` prefix
//! - `.pdf` matches file names ending in `.pdf`
//! - `application/pdf` matches that MIME type exactly
//! - `*` or `*/*` matches everything
//!
//! Matching ignores case.
//!
//! # Example
//!
//! ```rust
//! use flock_staging::accept::Accept;
//!
//! let accept = Accept::parse(".pdf, image/*");
//! assert!(accept.matches("bulletin.PDF", "application/pdf"));
//! assert!(accept.matches("photo.heic", "image/heic"));
//! assert!(!accept.matches("notes.docx", "application/msword"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Any,
    /// Lowercased prefix including the slash, e.g. `image/`.
    MimePrefix(String),
    /// Lowercased extension including the dot, e.g. `.pdf`.
    Extension(String),
    /// Lowercased full MIME type.
    Mime(String),
    /// Original text, kept for display.
    Raw(String),
}

/// A parsed accept list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Accept {
    entries: Vec<Entry>,
    source: Vec<String>,
}

impl Accept {
    /// Parses a comma-separated accept string. Blank entries are skipped.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let mut accept = Self::default();
        for raw in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let lower = raw.to_lowercase();
            let entry = if lower == "*" || lower == "*/*" {
                Entry::Any
            } else if let Some(prefix) = lower.strip_suffix("/*") {
                Entry::MimePrefix(format!("{prefix}/"))
            } else if lower.starts_with('.') {
                Entry::Extension(lower)
            } else if lower.contains('/') {
                Entry::Mime(lower)
            } else {
                Entry::Raw(lower)
            };
            accept.entries.push(entry);
            accept.source.push(raw.to_string());
        }
        accept
    }

    /// Returns true if no entries were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries as written.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.source
    }

    /// Tests a file name and MIME type against the list.
    ///
    /// An empty list accepts everything.
    #[must_use]
    pub fn matches(&self, name: &str, mime_type: &str) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        let name = name.to_lowercase();
        let mime = mime_type.trim().to_lowercase();
        self.entries.iter().any(|entry| match entry {
            Entry::Any => true,
            Entry::MimePrefix(prefix) => mime.starts_with(prefix.as_str()),
            Entry::Extension(ext) => name.ends_with(ext.as_str()),
            Entry::Mime(exact) => mime == *exact,
            // A bare word like "pdf" is neither a MIME type nor an extension
            Entry::Raw(_) => false,
        })
    }
}

impl FromStr for Accept {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for Accept {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Accept> for String {
    fn from(accept: Accept) -> Self {
        accept.to_string()
    }
}

impl fmt::Display for Accept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source.join(","))
    }
}
