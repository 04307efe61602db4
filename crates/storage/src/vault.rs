// SPDX-License-Identifier: MIT

//! Vault path conventions, atomic file I/O, and advisory locking.

use crate::error::VaultStoreError;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::warn;

/// Bounded backoff schedule for lock acquisition: try immediately, then
/// back off up to roughly 2 seconds total before giving up.
const LOCK_RETRY_DELAYS_MS: &[u64] = &[5, 10, 25, 50, 100, 200, 400, 800, 800, 800];

/// A directory tree holding a knowledge corpus plus operational state.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn thoughts_dir(&self) -> PathBuf {
        self.root.join("thoughts")
    }

    pub fn inbox_dir(&self) -> PathBuf {
        self.root.join("inbox")
    }

    pub fn ops_dir(&self) -> PathBuf {
        self.root.join("ops")
    }

    pub fn queue_path(&self) -> PathBuf {
        self.root.join("ops/queue/queue.json")
    }

    pub fn queue_archive_dir(&self) -> PathBuf {
        self.root.join("ops/queue/archive")
    }

    pub fn commitments_path(&self) -> PathBuf {
        self.root.join("ops/commitments.json")
    }

    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("ops/locks")
    }

    pub fn lock_path(&self, kind: &str) -> PathBuf {
        self.locks_dir().join(format!("{kind}.lock"))
    }

    pub fn cursors_path(&self) -> PathBuf {
        self.root.join("ops/runtime/perception-cursors.json")
    }

    pub fn noise_path(&self) -> PathBuf {
        self.root.join("ops/runtime/perception-noise.json")
    }

    pub fn telemetry_path(&self) -> PathBuf {
        self.root.join("ops/runtime/telemetry.jsonl")
    }

    pub fn evaluations_dir(&self) -> PathBuf {
        self.root.join("ops/evaluations")
    }

    pub fn morning_brief_path(&self) -> PathBuf {
        self.root.join("ops/morning-brief.md")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("ops/config.yaml")
    }

    pub fn heartbeat_marker_path(&self) -> PathBuf {
        self.root.join("ops/.heartbeat-marker")
    }

    pub fn observations_dir(&self) -> PathBuf {
        self.root.join("ops/observations")
    }

    pub fn tensions_dir(&self) -> PathBuf {
        self.root.join("ops/tensions")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("ops/sessions")
    }

    /// `self/<name>.md`, falling back to `ops/<name>.md` when the `self/`
    /// copy does not exist, per spec.md §4.1's path-convention note.
    pub fn self_file(&self, name: &str) -> PathBuf {
        let primary = self.root.join("self").join(format!("{name}.md"));
        if primary.exists() {
            primary
        } else {
            self.root.join("ops").join(format!("{name}.md"))
        }
    }

    pub fn working_memory_path(&self) -> PathBuf {
        self.self_file("working-memory")
    }

    pub fn identity_path(&self) -> PathBuf {
        self.self_file("identity")
    }

    pub fn goals_path(&self) -> PathBuf {
        self.self_file("goals")
    }

    /// Read a file's full contents. Returns `Ok(None)` when the file is
    /// absent (this is the sentinel described in spec.md §4.1, not an
    /// error); propagates any other I/O error.
    pub fn read(&self, path: &Path) -> Result<Option<String>, VaultStoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultStoreError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Write `contents` atomically: write to a sibling `.tmp` file, fsync,
    /// then rename over the destination. A crash mid-write leaves either
    /// the old file or nothing, never a truncated one.
    pub fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), VaultStoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VaultStoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let tmp_path = tmp_sibling(path);
        {
            let mut file = File::create(&tmp_path).map_err(|e| VaultStoreError::Io {
                path: tmp_path.display().to_string(),
                source: e,
            })?;
            file.write_all(contents.as_bytes())
                .map_err(|e| VaultStoreError::Io {
                    path: tmp_path.display().to_string(),
                    source: e,
                })?;
            file.sync_all().map_err(|e| VaultStoreError::Io {
                path: tmp_path.display().to_string(),
                source: e,
            })?;
        }
        fs::rename(&tmp_path, path).map_err(|e| VaultStoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// List `.md` files directly inside `dir` (non-recursive), sorted by
    /// filename for determinism. Returns an empty vec if `dir` is absent.
    pub fn list_md(&self, dir: &Path) -> Result<Vec<PathBuf>, VaultStoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VaultStoreError::Io {
                    path: dir.display().to_string(),
                    source: e,
                })
            }
        };
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| VaultStoreError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("md") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    pub fn stat(&self, path: &Path) -> Option<fs::Metadata> {
        fs::metadata(path).ok()
    }

    /// Acquire an exclusive advisory lock for `kind` and run `f` while
    /// holding it. Retries acquisition with bounded backoff (~2s total);
    /// the lock is released on every exit path (including panics, since it
    /// is tied to the `File`'s lifetime) when the guard drops.
    pub fn with_lock<T>(
        &self,
        kind: &str,
        f: impl FnOnce() -> Result<T, VaultStoreError>,
    ) -> Result<T, VaultStoreError> {
        let lock_path = self.lock_path(kind);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| VaultStoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| VaultStoreError::Io {
                path: lock_path.display().to_string(),
                source: e,
            })?;

        let start = Instant::now();
        let mut attempt = 0usize;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) => {
                    let delay = LOCK_RETRY_DELAYS_MS
                        .get(attempt)
                        .copied()
                        .unwrap_or(*LOCK_RETRY_DELAYS_MS.last().unwrap_or(&800));
                    if attempt >= LOCK_RETRY_DELAYS_MS.len() {
                        warn!(kind, elapsed_ms = start.elapsed().as_millis() as u64, "still waiting on vault lock");
                    }
                    std::thread::sleep(Duration::from_millis(delay));
                    attempt += 1;
                    if start.elapsed() > Duration::from_secs(10) {
                        return Err(VaultStoreError::LockTimeout {
                            kind: kind.to_string(),
                        });
                    }
                }
            }
        }

        let result = f();
        let _ = FileExt::unlock(&file);
        result
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
#[path = "vault_tests.rs"]
mod tests;
