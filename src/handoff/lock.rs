//! Exclusive lock over one run's hand-off document
//!
//! The lock is a sidecar file created with `create_new`, so it excludes
//! writers in other processes as well as other store instances in this one.
//! The holder's token is written into the file and checked before release.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::error::{ErrorCode, ErrorExt, PipelineError, Result};

/// How long `acquire` keeps retrying before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// A lock file older than this was left behind by a writer that died
const STALE_AFTER: Duration = Duration::from_secs(30);

/// Held lock; the file is removed on `release` or when dropped
#[derive(Debug)]
pub struct RunLock {
    lock_file: PathBuf,
    token: String,
    released: bool,
}

impl RunLock {
    /// Wait for the lock at `lock_file`, failing with a hand-off error after `timeout`
    pub async fn acquire(lock_file: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let lock_file = lock_file.into();
        let started = Instant::now();

        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_file)
                .await
            {
                Ok(mut file) => {
                    let token = Uuid::new_v4().to_string();
                    let lock = Self {
                        lock_file,
                        token,
                        released: false,
                    };
                    file.write_all(lock.token.as_bytes()).await.to_io_error(
                        ErrorCode::IO_WRITE_FAILED,
                        "Failed to write hand-off lock",
                        &lock.lock_file,
                    )?;
                    trace!("Acquired {}", lock.lock_file.display());
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&lock_file).await {
                        warn!("Breaking stale hand-off lock {}", lock_file.display());
                        remove_if_present(&lock_file).await?;
                        continue;
                    }
                    if started.elapsed() >= timeout {
                        return Err(PipelineError::handoff(
                            ErrorCode::HANDOFF_LOCK_TIMEOUT,
                            format!(
                                "{} still held after {:?}",
                                lock_file.display(),
                                timeout
                            ),
                            None,
                        ));
                    }
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(e) => {
                    return Err(e).to_io_error(
                        ErrorCode::IO_WRITE_FAILED,
                        "Failed to create hand-off lock",
                        &lock_file,
                    )
                }
            }
        }
    }

    /// Remove the lock file if it still carries this holder's token
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        match fs::read_to_string(&self.lock_file).await {
            Ok(token) if token == self.token => remove_if_present(&self.lock_file).await,
            Ok(_) => {
                warn!(
                    "{} was taken over by another writer",
                    self.lock_file.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).to_io_error(
                ErrorCode::IO_READ_FAILED,
                "Failed to read hand-off lock",
                &self.lock_file,
            ),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.lock_file) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", self.lock_file.display(), e);
            }
        }
    }
}

async fn is_stale(lock_file: &Path) -> bool {
    let Ok(metadata) = fs::metadata(lock_file).await else {
        return false;
    };
    metadata
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > STALE_AFTER)
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e).to_io_error(
            ErrorCode::IO_WRITE_FAILED,
            "Failed to remove hand-off lock",
            path,
        ),
        _ => Ok(()),
    }
}
