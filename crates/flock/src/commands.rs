//! Subcommand implementations.
//!
//! Commands write their report to the given writer so tests can capture it;
//! logs go to stderr through `tracing`.

use std::io::Write;

use anyhow::{Context, bail};
use flock_staging::prelude::*;
use flock_table::prelude::*;
use tracing::info;

use crate::cli::{MembersArgs, StageArgs};
use crate::config::Config;
use crate::export::CsvSink;
use crate::files::{CopyTransport, incoming_from_path};
use crate::member::{Member, member_columns};
use crate::render::render_page;
use crate::source::{JsonFileSource, MemberSource, SampleSource};

/// Lists members, or exports them.
///
/// # Errors
///
/// Returns an error for unreadable sources, unknown columns, page sizes
/// outside the configured options, or a failed export.
pub fn members(args: &MembersArgs, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let source: Box<dyn MemberSource> = match &args.source {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(SampleSource),
    };
    let rows = source
        .load()
        .with_context(|| format!("loading members from {}", source.describe()))?;

    let mut table = Table::configure(member_columns(), rows, config.table.clone())
        .context("configuring the member table")?;
    apply_members_args(&mut table, args)?;

    if let Some(path) = &args.export {
        let mut sink = CsvSink::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        table
            .export(&mut sink)
            .with_context(|| format!("exporting to {}", path.display()))?;
        info!(path = %path.display(), rows = sink.written(), "Exported members");
        writeln!(out, "exported {} members to {}", sink.written(), path.display())?;
    } else if args.json {
        let page: Vec<&Member> = table.rows();
        let json = serde_json::to_string_pretty(&page).context("encoding members")?;
        writeln!(out, "{json}")?;
    } else {
        let width = args.max_width.unwrap_or(config.display.max_width);
        writeln!(out, "{}", render_page(&table, width))?;
    }
    Ok(())
}

fn require_column(table: &Table<Member>, key: &str) -> anyhow::Result<()> {
    if table.column(key).is_none() {
        let known: Vec<&str> = table.columns().iter().map(Column::key).collect();
        bail!("unknown column '{key}' (expected one of: {})", known.join(", "));
    }
    Ok(())
}

/// Applies filters, search, sort, visibility and paging, in that order.
///
/// Column keys are checked up front so a typo is an error regardless of the
/// configured strictness.
fn apply_members_args(table: &mut Table<Member>, args: &MembersArgs) -> anyhow::Result<()> {
    for filter in &args.filters {
        require_column(table, &filter.key)?;
        table
            .set_column_filter(&filter.key, filter.value.clone())
            .with_context(|| format!("filtering on '{}'", filter.key))?;
    }

    if let Some(text) = &args.search {
        let mode = match &args.search_column {
            Some(key) => {
                require_column(table, key)?;
                SearchMode::Column(key.clone())
            }
            None => SearchMode::Global,
        };
        let binding = bind_search(table, mode).context("binding search")?;
        binding.apply(table, text).context("searching")?;
    }

    if let Some(sort) = &args.sort {
        require_column(table, &sort.key)?;
        table
            .set_sort(&sort.key, Some(sort.direction))
            .with_context(|| format!("sorting by '{}'", sort.key))?;
    }

    for key in args.columns.iter().chain(&args.hide).chain(&args.show) {
        require_column(table, key)?;
    }
    if !args.columns.is_empty() {
        let keys: Vec<String> = table.columns().iter().map(|c| c.key().to_string()).collect();
        for key in keys {
            let visible = args.columns.contains(&key);
            table.toggle_column(&key, visible)?;
        }
    }
    for key in &args.hide {
        table.toggle_column(key, false)?;
    }
    for key in &args.show {
        table.toggle_column(key, true)?;
    }

    if let Some(size) = args.page_size {
        table
            .set_page_size(size)
            .with_context(|| format!("setting page size {size}"))?;
    }
    table.set_page(args.page.saturating_sub(1));
    Ok(())
}

/// Validates files from disk and optionally copies them to a folder.
///
/// Rejections are reported, not treated as failures. The command fails only
/// if a file cannot be inspected or an upload fails.
///
/// # Errors
///
/// Returns an error if a path cannot be read, the destination cannot be
/// created, or any upload fails.
pub async fn stage(args: &StageArgs, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let queue = SharedQueue::new(StagingQueue::new(config.staging_for(args)));
    let incoming = args
        .paths
        .iter()
        .map(|p| incoming_from_path(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let outcome = queue.stage(incoming);
    for rejection in &outcome.rejected {
        writeln!(out, "rejected {}: {}", rejection.file.name, rejection.reason)?;
    }
    for view in &outcome.accepted {
        if view.size == 0 {
            queue.lock().set_validation_error(&view.id, "file is empty")?;
        }
    }
    for view in queue.views() {
        match &view.validation_error {
            Some(reason) => writeln!(out, "invalid {}: {reason}", view.name)?,
            None => writeln!(out, "staged {} ({} bytes, {})", view.name, view.size, view.mime_type)?,
        }
    }

    let Some(dest) = &args.upload_to else {
        let summary = queue.summary();
        writeln!(
            out,
            "{} staged, {} rejected",
            summary.total(),
            outcome.rejected.len()
        )?;
        return Ok(());
    };

    tokio::fs::create_dir_all(dest)
        .await
        .with_context(|| format!("creating {}", dest.display()))?;
    let summary = upload_pending(&queue, &CopyTransport::new(dest.clone())).await;

    for view in queue.views() {
        match view.status {
            Status::Success => writeln!(
                out,
                "uploaded {} -> {}",
                view.name,
                view.url.as_deref().unwrap_or("?")
            )?,
            Status::Error => writeln!(
                out,
                "failed {}: {}",
                view.name,
                view.error.as_deref().unwrap_or("unknown error")
            )?,
            Status::Pending | Status::Uploading => {}
        }
    }
    writeln!(
        out,
        "{} uploaded, {} failed, {} rejected",
        summary.succeeded,
        summary.failed,
        outcome.rejected.len()
    )?;
    if summary.failed > 0 {
        bail!("{} upload(s) failed", summary.failed);
    }
    Ok(())
}
