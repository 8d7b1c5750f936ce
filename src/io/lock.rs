use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_FILE: &str = ".close.lock";
const DEFAULT_WAIT: Duration = Duration::from_secs(5);
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock over a close workspace.
///
/// Every writer takes this before touching the CSV snapshots or the JSON
/// workspace files, so the TUI, the CLI, and any automation driving the
/// CLI cannot interleave partial writes. Readers do not lock; every write
/// lands via an atomic rename.
pub struct FileLock {
    // Held open for the lifetime of the guard; flock releases on close.
    _file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another closeboard process may be writing")]
    Busy { path: PathBuf },
    #[error("lock error: {0}")]
    Io(#[from] std::io::Error),
}

impl FileLock {
    /// Take the workspace write lock, waiting up to `wait` for a holder
    /// to release it.
    pub fn acquire(close_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = close_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Create {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + wait;
        while flock_exclusive(&file).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Busy { path });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
        Ok(FileLock { _file: file, path })
    }

    /// Take the workspace write lock with the standard five second wait.
    pub fn acquire_default(close_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(close_dir, DEFAULT_WAIT)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The kernel drops the flock with the handle; removing the file
        // just keeps the workspace directory tidy.
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn flock_exclusive(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;
    match unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } {
        0 => Ok(()),
        _ => Err(std::io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
fn flock_exclusive(_file: &File) -> std::io::Result<()> {
    // No advisory locking off Unix; single-user workspaces stay safe
    // through the atomic renames in workspace_io.
    Ok(())
}
