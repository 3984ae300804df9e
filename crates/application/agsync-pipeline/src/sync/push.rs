use agsync_config::SELF_MARKER;
use agsync_core::compare::{is_same_type, remote_is_newer};
use agsync_core::path::{join_url, PathKind};
use agsync_core::{to_name_map, NameMap, SyncError};
use camino::{Utf8Path, Utf8PathBuf};
use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use crate::sync::events::{SyncAction, TransferReason};
use crate::sync::local;
use crate::sync::{RootMode, SyncEngine, SyncStats};

impl SyncEngine {
    /// Mirror the local directory `source` into the remote directory `dest_url`.
    pub async fn push(
        &self,
        source: &Utf8Path,
        dest_url: &str,
        mode: RootMode,
        name: Option<&str>,
    ) -> Result<SyncStats, SyncError> {
        let mut stats = SyncStats::default();
        match mode {
            RootMode::Contents => {
                self.push_dir(source.to_owned(), dest_url.to_string(), 0, &mut stats)
                    .await?
            }
            RootMode::Nest => {
                let dir_name = match name {
                    Some(n) => n.to_string(),
                    None => local::dir_name(source)?,
                };
                let nested = self
                    .open_remote_dir(dest_url, &dir_name, 0, &mut stats)
                    .await?;
                self.push_dir(source.to_owned(), nested, 1, &mut stats)
                    .await?;
            }
        }
        Ok(stats)
    }

    /// Listing of a remote directory keyed by name; the directory must exist.
    pub(crate) async fn remote_dir_map(&self, dir_url: &str) -> Result<NameMap, SyncError> {
        let map = to_name_map(self.list_source(dir_url, PathKind::Remote).await?);
        if !map.get(SELF_MARKER).is_some_and(|d| d.is_dir()) {
            return Err(SyncError::Listing {
                url: dir_url.to_string(),
                reason: "not a valid directory".into(),
            });
        }
        Ok(map)
    }

    fn push_dir<'a>(
        &'a self,
        source: Utf8PathBuf,
        dir_url: String,
        depth: usize,
        stats: &'a mut SyncStats,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        async move {
            let remote = self.remote_dir_map(&dir_url).await?;

            for entry in local::read_entries(&source)? {
                let path = &entry.path;
                let name = entry.name.as_str();
                let existing = remote.get(name).filter(|d| is_same_type(path, d));

                if let Some(remote_entry) = existing {
                    if path.is_dir() || remote_is_newer(path, remote_entry)? {
                        self.note(stats, depth, SyncAction::Exists, name);
                    } else {
                        self.note(stats, depth, SyncAction::Upload(TransferReason::Modified), name);
                        stats.bytes_transferred +=
                            self.remote.upload(path, &dir_url, None).await?;
                    }
                } else if path.is_file() {
                    self.note(stats, depth, SyncAction::Upload(TransferReason::New), name);
                    stats.bytes_transferred += self.remote.upload(path, &dir_url, None).await?;
                } else if path.is_dir() {
                    self.note(stats, depth, SyncAction::MakeDir, name);
                    self.remote.mkdir(name, &dir_url).await?;
                } else {
                    warn!("Skipping {}: not a regular file or directory", path);
                    continue;
                }

                if path.is_dir() {
                    let child_url = join_url(&dir_url, name);
                    self.push_dir(entry.path.clone(), child_url, depth + 1, &mut *stats)
                        .await?;
                }
            }
            Ok(())
        }
        .boxed()
    }
}
