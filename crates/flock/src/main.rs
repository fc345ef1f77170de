#![forbid(unsafe_code)]

//! # Flock CLI
//!
//! ## Usage
//!
//! ```bash
//! flock members --search choir          # Search the member directory
//! flock members --export members.csv    # Export every matching member
//! flock stage *.pdf --accept .pdf       # Validate files for upload
//! ```

use flock::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    flock::logging::init(cli.log_level());
    flock::run(cli).await
}
