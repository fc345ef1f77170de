//! Files on disk as staging input, and a transport that copies them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use flock_staging::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 64 * 1024;

// Suffixes tried before giving up on a crowded destination.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Guesses a MIME type from the file extension.
#[must_use]
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Reads a file's metadata into a staging record whose handle is the path.
///
/// # Errors
///
/// Returns an error if the path cannot be inspected or is not a file.
pub fn incoming_from_path(path: &Path) -> anyhow::Result<IncomingFile<PathBuf>> {
    let meta = std::fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
    if !meta.is_file() {
        anyhow::bail!("{} is not a file", path.display());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(IncomingFile::new(path.to_path_buf(), name, meta.len(), guess_mime(path)))
}

/// Uploads by copying into a local directory.
///
/// Existing files are never overwritten: a name already taken in the
/// destination gets a numeric suffix (`report-1.pdf`, `report-2.pdf`, ...).
#[derive(Debug, Clone)]
pub struct CopyTransport {
    dest: PathBuf,
}

impl CopyTransport {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }
}

/// Name for the `n`th attempt at placing `name`: `report.pdf`, `report-1.pdf`, ...
fn candidate_name(name: &str, n: u32) -> String {
    if n == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().map_or_else(|| name.into(), |s| s.to_string_lossy());
    match path.extension() {
        Some(ext) => format!("{stem}-{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{n}"),
    }
}

/// Creates a file in `dir` under a name nobody else holds.
async fn create_unique(dir: &Path, name: &str) -> Result<(tokio::fs::File, PathBuf), String> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let target = dir.join(candidate_name(name, n));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => return Ok((file, target)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(format!("create {}: {e}", target.display())),
        }
    }
    Err(format!("no free name for {name} in {}", dir.display()))
}

fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.saturating_mul(100) / total).min(100) as u8
}

impl Transport<PathBuf> for CopyTransport {
    async fn upload(
        &self,
        file: StagedFileView,
        handle: PathBuf,
        progress: ProgressHandle<PathBuf>,
    ) -> Result<String, String> {
        let mut src = tokio::fs::File::open(&handle)
            .await
            .map_err(|e| format!("open {}: {e}", handle.display()))?;
        let (mut dst, target) = create_unique(&self.dest, &file.name).await?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut copied: u64 = 0;
        loop {
            let n = src
                .read(&mut buf)
                .await
                .map_err(|e| format!("read {}: {e}", handle.display()))?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n])
                .await
                .map_err(|e| format!("write {}: {e}", target.display()))?;
            copied += n as u64;
            progress.report(percent(copied, file.size));
        }
        dst.flush()
            .await
            .map_err(|e| format!("flush {}: {e}", target.display()))?;
        Ok(format!("file://{}", target.display()))
    }
}
