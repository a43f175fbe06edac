use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::debug;

/// How long a write command waits for another `dp` process
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory lock held across one load → change → save cycle.
///
/// Uses flock on `dayplan/.lock`, so two `dp` processes never interleave
/// their writes of the schedule snapshot. Released on drop.
pub struct PlannerLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path} within {waited:?}: another dp process may be writing")]
    Timeout { path: PathBuf, waited: Duration },
}

impl PlannerLock {
    /// Acquire the planner lock, polling until `timeout` runs out
    pub fn acquire(planner_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = planner_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let started = Instant::now();
        let mut pause = Duration::from_millis(5);
        while try_lock(&file).is_err() {
            if started.elapsed() >= timeout {
                return Err(LockError::Timeout {
                    path,
                    waited: timeout,
                });
            }
            std::thread::sleep(pause);
            pause = (pause * 2).min(Duration::from_millis(100));
        }
        debug!(
            "event=lock_acquired path={} waited_ms={}",
            path.display(),
            started.elapsed().as_millis()
        );
        Ok(PlannerLock { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PlannerLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Non-blocking exclusive flock
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
