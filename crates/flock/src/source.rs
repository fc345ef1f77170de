//! Where member rows come from.
//!
//! The table engine never fetches; commands take a [`MemberSource`] and
//! hand the loaded rows to the table.

use crate::member::{Member, MemberStatus};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors loading member rows.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A provider of member rows.
pub trait MemberSource {
    /// Loads every member.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be read or decoded.
    fn load(&self) -> Result<Vec<Member>, SourceError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Members stored as a JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemberSource for JsonFileSource {
    fn load(&self) -> Result<Vec<Member>, SourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let members: Vec<Member> =
            serde_json::from_str(&text).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), count = members.len(), "Loaded members");
        Ok(members)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A built-in directory for trying the CLI without data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSource;

impl MemberSource for SampleSource {
    fn load(&self) -> Result<Vec<Member>, SourceError> {
        Ok(sample_members())
    }

    fn describe(&self) -> String {
        "built-in sample".to_string()
    }
}

fn member(
    id: u32,
    name: (&str, &str),
    status: MemberStatus,
    group: Option<&str>,
    joined: (i32, u32, u32),
    giving_ytd: f64,
) -> Member {
    let (first, last) = name;
    let (y, m, d) = joined;
    Member {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.org", first.to_lowercase(), last.to_lowercase()),
        phone: (id % 3 != 0).then(|| format!("555-01{id:02}")),
        status,
        group: group.map(str::to_string),
        joined: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        giving_ytd,
    }
}

/// Twelve members spread over groups, statuses and join dates.
#[must_use]
pub fn sample_members() -> Vec<Member> {
    use MemberStatus::{Active, Inactive, Visitor};
    vec![
        member(1, ("Grace", "Okafor"), Active, Some("Choir"), (2015, 3, 8), 4200.0),
        member(2, ("Samuel", "Lindqvist"), Active, Some("Youth"), (2019, 9, 1), 1250.5),
        member(3, ("Hannah", "Reyes"), Visitor, None, (2024, 1, 14), 0.0),
        member(4, ("Daniel", "Mbeki"), Active, Some("Men's Fellowship"), (2012, 6, 24), 6100.0),
        member(5, ("Esther", "Kowalski"), Inactive, Some("Choir"), (2009, 11, 2), 0.0),
        member(6, ("Jonah", "Park"), Active, Some("Youth"), (2021, 4, 18), 310.25),
        member(7, ("Lydia", "Nakamura"), Active, Some("Hospitality"), (2017, 2, 5), 2890.0),
        member(8, ("Micah", "Osei"), Visitor, Some("Youth"), (2024, 2, 25), 50.0),
        member(9, ("Naomi", "Fischer"), Active, Some("Women's Bible Study"), (2011, 8, 30), 5325.75),
        member(10, ("Silas", "Moreau"), Inactive, None, (2014, 5, 11), 0.0),
        member(11, ("Priscilla", "Adeyemi"), Active, Some("Hospitality"), (2020, 10, 4), 1875.0),
        member(12, ("Tobias", "Grant"), Active, Some("Men's Fellowship"), (2018, 7, 22), 3020.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sample_source() {
        let members = SampleSource.load().expect("sample");
        assert_eq!(members.len(), 12);
        assert_eq!(members[0].email, "grace.okafor@example.org");
        assert_eq!(members[2].phone, None);
        assert_eq!(members[3].phone.as_deref(), Some("555-0104"));
    }

    #[test]
    fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string(&sample_members()[..2]).expect("serialize");
        file.write_all(json.as_bytes()).expect("write");

        let source = JsonFileSource::new(file.path());
        let members = source.load().expect("load");
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].first_name, "Samuel");
    }

    #[test]
    fn test_json_file_source_errors() {
        let missing = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(missing.load(), Err(SourceError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("write");
        let broken = JsonFileSource::new(file.path());
        let err = broken.load().expect_err("parse error");
        assert!(err.to_string().starts_with("failed to parse"));
    }
}
