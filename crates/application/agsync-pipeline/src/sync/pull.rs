use agsync_core::compare::remote_is_newer;
use agsync_core::path::{join_url, safe_entry_name, PathKind};
use agsync_core::{FileDescriptor, SyncError};
use camino::{Utf8Path, Utf8PathBuf};
use futures::future::{BoxFuture, FutureExt};
use tracing::warn;

use crate::sync::engine::{split_self_marker, Level, Open};
use crate::sync::events::{SyncAction, TransferReason};
use crate::sync::local;
use crate::sync::{RootMode, SyncEngine, SyncStats};

impl SyncEngine {
    /// Mirror the remote tree at `source` into the local directory `dest`.
    pub async fn pull(
        &self,
        source: &str,
        kind: PathKind,
        dest: &Utf8Path,
        mode: RootMode,
        name: Option<&str>,
    ) -> Result<SyncStats, SyncError> {
        let mut stats = SyncStats::default();
        let level = Level {
            source: source.to_string(),
            kind,
            dest: dest.to_owned(),
            depth: 0,
            open: Open::root(mode, name, source),
        };
        self.pull_level(level, &mut stats).await?;
        Ok(stats)
    }

    fn pull_level<'a>(
        &'a self,
        level: Level<Utf8PathBuf>,
        stats: &'a mut SyncStats,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        async move {
            let entries = self.list_source(&level.source, level.kind).await?;
            let (marker, entries) = split_self_marker(&level.source, entries);

            let (dest, depth) = match level.open.dir_name(marker.as_ref()) {
                Some(dir_name) => {
                    let dest = self.open_local_dir(&level.dest, &dir_name, level.depth, stats)?;
                    (dest, level.depth + 1)
                }
                None => (level.dest, level.depth),
            };
            let present = local::entry_names(&dest)?;

            for entry in entries {
                safe_entry_name(&entry.name)?;
                if entry.is_dir() {
                    let child = Level {
                        source: join_url(&level.source, &entry.name),
                        kind: level.kind,
                        dest: dest.clone(),
                        depth,
                        open: Open::child(&entry.name),
                    };
                    self.pull_level(child, &mut *stats).await?;
                    continue;
                }

                let target = dest.join(&entry.name);
                let reason = if !present.contains(&entry.name) {
                    Some(TransferReason::New)
                } else if target.is_dir() {
                    warn!("{} is a local directory but a remote file", target);
                    self.note(stats, depth, SyncAction::TypeConflict, entry.name.as_str());
                    continue;
                } else if remote_is_newer(&target, &entry)? {
                    Some(TransferReason::Modified)
                } else {
                    None
                };

                match reason {
                    Some(reason) => {
                        self.fetch_file(&level.source, &entry, &dest, reason, depth, stats)
                            .await?
                    }
                    None => self.note(stats, depth, SyncAction::Exists, entry.name.as_str()),
                }
            }
            Ok(())
        }
        .boxed()
    }

    /// Directory-open step: returns the extended destination.
    fn open_local_dir(
        &self,
        parent: &Utf8Path,
        name: &str,
        depth: usize,
        stats: &mut SyncStats,
    ) -> Result<Utf8PathBuf, SyncError> {
        let dest = parent.join(safe_entry_name(name)?);
        if dest.is_dir() {
            self.note(stats, depth, SyncAction::Exists, name);
        } else {
            self.note(stats, depth, SyncAction::MakeDir, dest.as_str());
            local::create_dir(&dest)?;
        }
        Ok(dest)
    }

    /// Zero-length files are recreated locally instead of downloaded.
    async fn fetch_file(
        &self,
        dir_url: &str,
        entry: &FileDescriptor,
        dest: &Utf8Path,
        reason: TransferReason,
        depth: usize,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        if entry.is_empty_file() {
            self.note(stats, depth, SyncAction::Touch(reason), entry.name.as_str());
            return local::touch(&dest.join(&entry.name));
        }
        self.note(stats, depth, SyncAction::Download(reason), entry.name.as_str());
        let url = join_url(dir_url, &entry.name);
        stats.bytes_transferred += self.remote.download(&url, dest, &entry.name).await?;
        Ok(())
    }
}
