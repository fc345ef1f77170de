//! Command-line interface for `flock`.
//!
//! # Examples
//!
//! ```bash
//! # First page of the built-in member sample
//! flock members
//!
//! # Active choir members, newest first, as CSV
//! flock members --filter status=active --filter group=choir --sort joined:desc --export choir.csv
//!
//! # Validate files against the configured limits, then copy them to a folder
//! flock stage bulletin.pdf logo.png --accept .pdf,.png --upload-to ./uploads
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flock_table::state::{ColumnFilter, ColumnSort, SortDirection};

/// Flock - member listings and upload staging for church admins.
#[derive(Parser, Debug, Clone)]
#[command(name = "flock", author, version, about)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, short = 'c', env = "FLOCK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more)
    ///
    /// Ignored when `RUST_LOG` is set
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List, search, sort and export members
    Members(MembersArgs),

    /// Validate files for upload and optionally upload them
    Stage(StageArgs),
}

/// Arguments for the members subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct MembersArgs {
    /// JSON file with an array of members (defaults to a built-in sample)
    #[arg(long, env = "FLOCK_MEMBERS")]
    pub source: Option<PathBuf>,

    /// Search text, matched against every column
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Restrict the search to one column
    #[arg(long, requires = "search")]
    pub search_column: Option<String>,

    /// Column filter as key=value (repeatable)
    #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
    pub filters: Vec<ColumnFilter>,

    /// Sort as key or key:asc / key:desc
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<ColumnSort>,

    /// Page to show, starting at 1
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Rows per page (must be one of the configured options)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show only these columns (comma-separated keys)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Hide these columns
    #[arg(long, value_delimiter = ',')]
    pub hide: Vec<String>,

    /// Show these columns, including ones hidden by default
    #[arg(long, value_delimiter = ',')]
    pub show: Vec<String>,

    /// Write every matching row (not just this page) to a CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print the page as JSON instead of a text table
    #[arg(long, conflicts_with = "export")]
    pub json: bool,

    /// Widest a text column may get before it is truncated
    #[arg(long)]
    pub max_width: Option<usize>,
}

/// Arguments for the stage subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct StageArgs {
    /// Files to stage
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Largest accepted file in bytes
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Accepted types, e.g. ".pdf,image/*"
    #[arg(long)]
    pub accept: Option<String>,

    /// Accept only one file
    #[arg(long)]
    pub single: bool,

    /// Most files to accept
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Copy accepted files into this directory
    #[arg(long)]
    pub upload_to: Option<PathBuf>,
}

/// Parses `key=value`. An empty value is allowed and clears the filter.
fn parse_filter(s: &str) -> Result<ColumnFilter, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing column key in '{s}'"));
    }
    Ok(ColumnFilter::new(key, value))
}

/// Parses `key`, `key:asc` or `key:desc`.
fn parse_sort(s: &str) -> Result<ColumnSort, String> {
    let (key, direction) = match s.split_once(':') {
        Some((key, dir)) => {
            let direction = SortDirection::parse(dir)
                .ok_or_else(|| format!("unknown sort direction '{dir}', use asc or desc"))?;
            (key, direction)
        }
        None => (s, SortDirection::Asc),
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing column key in '{s}'"));
    }
    Ok(ColumnSort::new(key, direction))
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Get log level based on verbosity.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Log level for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Only show warnings and errors
    Warn,
    /// Show info messages
    Info,
    /// Show debug messages
    Debug,
    /// Show all messages including trace
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(args: &[&str]) -> MembersArgs {
        let mut argv = vec!["flock", "members"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Members(args) => args,
            other => panic!("expected members, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_member_defaults() {
        let args = members(&[]);
        assert_eq!(args.page, 1);
        assert!(args.filters.is_empty());
        assert!(args.sort.is_none());
        assert!(!args.json);
    }

    #[test]
    fn cli_parses_filters_and_sort() {
        let args = members(&["-f", "status=active", "--filter", "group=", "--sort", "joined:desc"]);
        assert_eq!(
            args.filters,
            vec![ColumnFilter::new("status", "active"), ColumnFilter::new("group", "")]
        );
        assert_eq!(args.sort, Some(ColumnSort::new("joined", SortDirection::Desc)));

        let args = members(&["--sort", "name"]);
        assert_eq!(args.sort, Some(ColumnSort::new("name", SortDirection::Asc)));
    }

    #[test]
    fn cli_rejects_bad_filter_and_sort() {
        assert!(Cli::try_parse_from(["flock", "members", "--filter", "status"]).is_err());
        assert!(Cli::try_parse_from(["flock", "members", "--filter", "=x"]).is_err());
        assert!(Cli::try_parse_from(["flock", "members", "--sort", "name:sideways"]).is_err());
    }

    #[test]
    fn cli_parses_column_lists() {
        let args = members(&["--columns", "name,email", "--hide", "id", "--show", "phone"]);
        assert_eq!(args.columns, vec!["name", "email"]);
        assert_eq!(args.hide, vec!["id"]);
        assert_eq!(args.show, vec!["phone"]);
    }

    #[test]
    fn cli_search_column_requires_search() {
        assert!(Cli::try_parse_from(["flock", "members", "--search-column", "name"]).is_err());
    }

    #[test]
    fn cli_json_conflicts_with_export() {
        let result = Cli::try_parse_from(["flock", "members", "--json", "--export", "x.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_stage() {
        let cli = Cli::try_parse_from([
            "flock", "stage", "a.pdf", "b.png", "--accept", ".pdf", "--single", "--max-size", "1000",
        ])
        .unwrap();
        match cli.command {
            Command::Stage(args) => {
                assert_eq!(args.paths.len(), 2);
                assert_eq!(args.accept.as_deref(), Some(".pdf"));
                assert!(args.single);
                assert_eq!(args.max_size, Some(1000));
                assert!(args.upload_to.is_none());
            }
            other => panic!("expected stage, got {other:?}"),
        }
    }

    #[test]
    fn cli_stage_requires_paths() {
        assert!(Cli::try_parse_from(["flock", "stage"]).is_err());
    }

    #[test]
    fn cli_parses_verbose() {
        let cli = Cli::try_parse_from(["flock", "members"]).unwrap();
        assert_eq!(cli.log_level(), LogLevel::Warn);

        let cli = Cli::try_parse_from(["flock", "-vv", "members"]).unwrap();
        assert_eq!(cli.log_level(), LogLevel::Debug);

        let cli = Cli::try_parse_from(["flock", "members", "-vvv"]).unwrap();
        assert_eq!(cli.log_level(), LogLevel::Trace);
        assert_eq!(cli.log_level().as_directive(), "trace");
    }
}
