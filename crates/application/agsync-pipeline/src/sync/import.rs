use agsync_core::compare::remote_is_newer_than_remote;
use agsync_core::path::{join_url, PathKind};
use agsync_core::{EntryType, SyncError};
use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use crate::sync::engine::{split_self_marker, Level, Open};
use crate::sync::events::{SyncAction, TransferReason};
use crate::sync::{RootMode, SyncEngine, SyncStats};

impl SyncEngine {
    /// Copy the tree at `source` into the remote directory `dest_url` with
    /// server-side ingest requests; no file bytes pass through this process.
    pub async fn import(
        &self,
        source: &str,
        kind: PathKind,
        dest_url: &str,
        mode: RootMode,
        name: Option<&str>,
    ) -> Result<SyncStats, SyncError> {
        let mut stats = SyncStats::default();
        let level = Level {
            source: source.to_string(),
            kind,
            dest: dest_url.to_string(),
            depth: 0,
            open: Open::root(mode, name, source),
        };
        self.import_level(level, &mut stats).await?;
        Ok(stats)
    }

    fn import_level<'a>(
        &'a self,
        level: Level<String>,
        stats: &'a mut SyncStats,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        async move {
            let entries = self.list_source(&level.source, level.kind).await?;
            let (marker, entries) = split_self_marker(&level.source, entries);

            let (dest_url, depth) = match level.open.dir_name(marker.as_ref()) {
                Some(dir_name) => {
                    let url = self
                        .open_remote_dir(&level.dest, &dir_name, level.depth, stats)
                        .await?;
                    (url, level.depth + 1)
                }
                None => (level.dest, level.depth),
            };
            // Re-list after the open step: the directory may have just been created.
            let existing = self.remote_dir_map(&dest_url).await?;

            for entry in entries {
                if entry.is_dir() {
                    let child = Level {
                        source: join_url(&level.source, &entry.name),
                        kind: level.kind,
                        dest: dest_url.clone(),
                        depth,
                        open: Open::child(&entry.name),
                    };
                    self.import_level(child, &mut *stats).await?;
                    continue;
                }

                let reason = match existing.get(&entry.name) {
                    None => Some(TransferReason::New),
                    Some(dest) if dest.is_dir() => {
                        warn!(
                            "{} is a directory at the destination but a file at the source",
                            join_url(&dest_url, &entry.name)
                        );
                        self.note(stats, depth, SyncAction::TypeConflict, entry.name.as_str());
                        continue;
                    }
                    Some(dest) if remote_is_newer_than_remote(&entry, dest)? => {
                        Some(TransferReason::Modified)
                    }
                    Some(_) => None,
                };

                match reason {
                    Some(reason) => {
                        self.note(stats, depth, SyncAction::Import(reason), entry.name.as_str());
                        let source_url = join_url(&level.source, &entry.name);
                        self.remote
                            .ingest(&source_url, &dest_url, Some(&entry.name))
                            .await?;
                    }
                    None => self.note(stats, depth, SyncAction::Exists, entry.name.as_str()),
                }
            }
            Ok(())
        }
        .boxed()
    }

    /// Directory-open step on the destination service: returns the child URL.
    pub(crate) async fn open_remote_dir(
        &self,
        parent_url: &str,
        name: &str,
        depth: usize,
        stats: &mut SyncStats,
    ) -> Result<String, SyncError> {
        let parent = self.remote_dir_map(parent_url).await?;
        match parent.get(name).map(|d| d.entry_type) {
            Some(EntryType::Dir) => self.note(stats, depth, SyncAction::Exists, name),
            Some(EntryType::File) => {
                return Err(SyncError::InvalidPath(format!(
                    "{} exists and is not a directory",
                    join_url(parent_url, name)
                )))
            }
            None => {
                self.note(stats, depth, SyncAction::MakeDir, join_url(parent_url, name));
                self.remote.mkdir(name, parent_url).await?;
            }
        }
        Ok(join_url(parent_url, name))
    }
}
