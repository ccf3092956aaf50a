use crate::store::{LinkStore, LinkTable};
use std::{
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

/// Distinguishes temporary files of saves running at the same time.
static SAVE_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode links for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl SnapshotError {
    /// `true` when the snapshot simply does not exist yet.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// The on-disk copy of the whole link table, rewritten after every mutation.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the snapshot.
    pub async fn load(&self) -> Result<LinkTable, SnapshotError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SnapshotError::Read {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_slice(&data).map_err(|source| SnapshotError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Populate `store` from the snapshot at startup.
    ///
    /// Never fails: a missing, unreadable or malformed file is logged and the
    /// store is left as it was. Returns the number of links loaded.
    /// Temporary files left behind by an interrupted save are removed first.
    pub async fn load_into(&self, store: &LinkStore) -> usize {
        let swept = self.sweep_tmp_files().await;
        if swept > 0 {
            tracing::warn!("Removed {} stale temporary snapshot file(s)", swept);
        }

        match self.load().await {
            Ok(table) => {
                let count = table.len();
                store.replace(table).await;
                tracing::info!(
                    "Loaded {} link(s) from {}",
                    count,
                    self.path.display()
                );
                count
            }
            Err(e) if e.is_missing() => {
                tracing::warn!(
                    "{} does not exist, starting with an empty table",
                    self.path.display()
                );
                0
            }
            Err(e) => {
                tracing::error!("{}, starting with an empty table", e);
                0
            }
        }
    }

    /// Serialize the whole table and overwrite the snapshot.
    ///
    /// The table is encoded under a shared lock which is released before any
    /// file I/O. Bytes go to a sibling temporary file first and are then
    /// renamed over the target, so readers never observe a half-written
    /// snapshot. Concurrent saves each use their own temporary file; the last
    /// rename wins.
    pub async fn save(&self, store: &LinkStore) -> Result<(), SnapshotError> {
        let data = store
            .to_json()
            .await
            .map_err(|source| SnapshotError::Encode {
                path: self.path.clone(),
                source,
            })?;

        let tmp = self.tmp_path(SAVE_SEQ.fetch_add(1, Ordering::Relaxed));
        let written = match tokio::fs::write(&tmp, &data).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SnapshotError::Write {
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!("Saved {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }

    /// Save after a mutation. Failures are logged and otherwise ignored:
    /// the in-memory table stays authoritative until the next successful save.
    pub async fn persist(&self, store: &LinkStore) {
        if let Err(e) = self.save(store).await {
            tracing::error!("Failed to persist links: {}", e);
        }
    }

    fn tmp_path(&self, seq: u64) -> PathBuf {
        let mut name = self.file_name().into_owned();
        name.push_str(&format!(".{}.{seq}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    fn file_name(&self) -> std::borrow::Cow<'_, str> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| "links.json".into())
    }

    /// `true` for names produced by `tmp_path`: `<name>.<pid>.<seq>.tmp`.
    fn is_tmp_name(&self, candidate: &str) -> bool {
        let prefix = format!("{}.", self.file_name());
        candidate
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".tmp"))
            .and_then(|middle| middle.split_once('.'))
            .is_some_and(|(pid, seq)| {
                !pid.is_empty()
                    && !seq.is_empty()
                    && pid.bytes().all(|b| b.is_ascii_digit())
                    && seq.bytes().all(|b| b.is_ascii_digit())
            })
    }

    /// Delete temporary siblings of the snapshot. Returns how many went.
    async fn sweep_tmp_files(&self) -> usize {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot scan {} for temporary files: {}", dir.display(), e);
                return 0;
            }
        };

        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            if !self.is_tmp_name(&name.to_string_lossy()) {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to remove {}: {}", entry.path().display(), e),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_file_sits_next_to_the_snapshot() {
        let pid = std::process::id();

        let snapshot = SnapshotFile::new("/data/links.json");
        assert_eq!(
            snapshot.tmp_path(3),
            PathBuf::from(format!("/data/links.json.{pid}.3.tmp"))
        );

        let snapshot = SnapshotFile::new("links.json");
        assert_ne!(snapshot.tmp_path(0), snapshot.tmp_path(1));
        assert_eq!(snapshot.tmp_path(0).parent(), Some(Path::new("")));
    }

    #[test]
    fn recognizes_only_its_own_tmp_names() {
        let snapshot = SnapshotFile::new("/data/links.json");
        assert!(snapshot.is_tmp_name("links.json.4242.0.tmp"));
        assert!(snapshot.is_tmp_name(
            snapshot.tmp_path(7).file_name().unwrap().to_str().unwrap()
        ));

        assert!(!snapshot.is_tmp_name("links.json"));
        assert!(!snapshot.is_tmp_name("links.json.tmp"));
        assert!(!snapshot.is_tmp_name("links.json.backup.tmp"));
        assert!(!snapshot.is_tmp_name("other.json.1.2.tmp"));
        assert!(!snapshot.is_tmp_name("links.json.1.2.tmp.bak"));
    }

    #[test]
    fn only_not_found_counts_as_missing() {
        let missing = SnapshotError::Read {
            path: "links.json".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(missing.is_missing());

        let denied = SnapshotError::Read {
            path: "links.json".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!denied.is_missing());
    }
}
