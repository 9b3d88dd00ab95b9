//! File replacement that never exposes a partially written file

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{ErrorCode, ErrorExt, PipelineError, Result};

/// Replace `path` with `contents`
///
/// The bytes go to a uniquely named temp file next to `path`, which is then
/// renamed over it. Until the rename the previous file is untouched; on any
/// failure the temp file is removed.
pub async fn write_atomic(path: &Path, contents: Vec<u8>) -> Result<()> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&target, &contents))
        .await
        .to_io_error(ErrorCode::IO_WRITE_FAILED, "Write task did not complete", path)?
}

fn write_atomic_blocking(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_failed = |e: std::io::Error| {
        PipelineError::io(ErrorCode::IO_WRITE_FAILED, "Failed to write file")
            .with_path(path)
            .with_source(e)
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    temp.write_all(contents).map_err(write_failed)?;
    temp.as_file().sync_all().map_err(write_failed)?;
    temp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
