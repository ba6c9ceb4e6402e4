use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

const LOCK_FILE_NAME: &str = "tagprep.lock";
const STALE_LOCK_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Directory-scoped lock serializing pipeline runs. At most one run may be
/// active per dataset directory; concurrent runs could corrupt the rename
/// sequence.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    pid: u32,
    timestamp: u64,
}

impl LockFile {
    /// Acquire the lock for a dataset directory. The lock file lives in
    /// `<dir>/.tagprep/` so it never shows up in the dataset scan.
    pub fn acquire(dataset_dir: &Path) -> Result<Self> {
        let lock_path = dataset_dir.join(".tagprep").join(LOCK_FILE_NAME);

        if lock_path.exists() {
            let mut content = String::new();
            File::open(&lock_path)
                .context("Failed to read lock file")?
                .read_to_string(&mut content)
                .context("Failed to read lock file content")?;

            // Lock file format: "pid:timestamp"
            let parts: Vec<&str> = content.trim().split(':').collect();
            if parts.len() == 2 {
                let pid = parts[0].parse::<u32>().unwrap_or(0);
                let timestamp = parts[1].parse::<u64>().unwrap_or(0);

                let current_time = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_secs();

                if current_time.saturating_sub(timestamp) > STALE_LOCK_TIMEOUT_SECS {
                    fs::remove_file(&lock_path).context("Failed to remove stale lock file")?;
                } else if is_process_running(pid) {
                    return Err(anyhow!(
                        "Another tagprep run is already active in this directory (PID: {}). \
                        If this is incorrect, remove the lock file at: {}",
                        pid,
                        lock_path.display()
                    ));
                } else {
                    fs::remove_file(&lock_path).context("Failed to remove orphaned lock file")?;
                }
            }
        }

        let pid = process::id();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let lock_content = format!("{}:{}", pid, timestamp);

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).context("Failed to create .tagprep directory")?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true) // Fail if file exists (race condition protection)
            .open(&lock_path)
            .context("Failed to create lock file")?;

        file.write_all(lock_content.as_bytes())
            .context("Failed to write lock file")?;

        Ok(Self {
            path: lock_path,
            pid,
            timestamp,
        })
    }

    /// Release the lock.
    pub fn release(self) -> Result<()> {
        if self.path.exists() {
            // Verify it's our lock before removing
            let mut content = String::new();
            File::open(&self.path)
                .context("Failed to read lock file")?
                .read_to_string(&mut content)
                .context("Failed to read lock file content")?;

            let expected_content = format!("{}:{}", self.pid, self.timestamp);
            if content.trim() == expected_content {
                fs::remove_file(&self.path).context("Failed to remove lock file")?;
            }
        }
        Ok(())
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // Best effort cleanup on drop
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Check if a process with the given PID is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // On Unix, we can check if a process exists by sending signal 0
    #[allow(clippy::cast_possible_wrap)]
    unsafe {
        libc::kill(pid as libc::pid_t, 0) == 0
    }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    // Fallback: assume process is not running if we can't check
    false
}
