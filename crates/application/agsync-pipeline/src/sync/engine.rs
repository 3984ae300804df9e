use std::sync::Arc;

use agsync_core::path::{basename, PathKind, ServiceRoot, SyncPath};
use agsync_core::{FileDescriptor, SyncError};
use agsync_infra::ApiClient;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use crate::sync::events::{EventSink, SyncAction, SyncEvent, TransferReason};
use crate::sync::remote::RemoteService;
use crate::sync::{RootMode, SyncDirection, SyncOutcome, SyncRequest, SyncStats};

/// Runs one synchronization request against a remote service, one request at
/// a time, stopping at the first failure.
pub struct SyncEngine {
    pub(crate) remote: Box<dyn RemoteService>,
    pub(crate) service: ServiceRoot,
    pub(crate) sink: Arc<dyn EventSink>,
}

/// What to do with the directory a listing describes before visiting its entries.
#[derive(Debug, Clone)]
pub(crate) enum Open {
    /// Create (or reuse) a destination directory for this level. `name`
    /// overrides the listed name; `fallback` is used when the listing has no
    /// self-marker.
    Into {
        name: Option<String>,
        fallback: String,
    },
    /// Place this level's entries directly in the current destination.
    Flatten,
}

impl Open {
    pub(crate) fn child(name: &str) -> Self {
        Open::Into {
            name: None,
            fallback: name.to_string(),
        }
    }

    pub(crate) fn root(mode: RootMode, name: Option<&str>, source: &str) -> Self {
        match mode {
            RootMode::Contents => Open::Flatten,
            RootMode::Nest => Open::Into {
                name: name.map(str::to_string),
                fallback: basename(source).to_string(),
            },
        }
    }

    /// Destination directory name for this level, `None` when flattening.
    pub(crate) fn dir_name(&self, marker: Option<&FileDescriptor>) -> Option<String> {
        match self {
            Open::Flatten => None,
            Open::Into {
                name: Some(name), ..
            } => Some(name.clone()),
            Open::Into { name: None, fallback } => Some(
                marker
                    .map(|m| m.dir_name().to_string())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| fallback.clone()),
            ),
        }
    }
}

/// One directory of the source tree still to be walked.
#[derive(Debug, Clone)]
pub(crate) struct Level<D> {
    pub source: String,
    pub kind: PathKind,
    pub dest: D,
    pub depth: usize,
    pub open: Open,
}

/// Pull the self-marker out of a listing so the directory-open step can run
/// before any sibling, whatever position the service put it in.
pub(crate) fn split_self_marker(
    url: &str,
    mut entries: Vec<FileDescriptor>,
) -> (Option<FileDescriptor>, Vec<FileDescriptor>) {
    let marker = match entries.iter().position(FileDescriptor::is_self_marker) {
        Some(0) => Some(entries.remove(0)),
        Some(idx) => {
            warn!(
                "Self-marker of {} listed at position {}; opening the directory first",
                url, idx
            );
            Some(entries.remove(idx))
        }
        None => {
            warn!("Listing of {} has no self-marker; naming the directory from its path", url);
            None
        }
    };
    let before = entries.len();
    entries.retain(|e| !e.is_self_marker());
    if entries.len() != before {
        warn!("Ignoring duplicate self-markers in listing of {}", url);
    }
    (marker, entries)
}

impl SyncEngine {
    pub fn new(api: ApiClient, sink: Arc<dyn EventSink>) -> Self {
        let service = api.session().service().clone();
        Self::with_components(Box::new(api), service, sink)
    }

    pub fn with_components(
        remote: Box<dyn RemoteService>,
        service: ServiceRoot,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            remote,
            service,
            sink,
        }
    }

    pub(crate) fn note(
        &self,
        stats: &mut SyncStats,
        depth: usize,
        action: SyncAction,
        name: impl Into<String>,
    ) {
        let event = SyncEvent::new(depth, action, name);
        stats.record(&event);
        self.sink.emit(&event);
    }

    /// List a source directory, translating service paths to listing form.
    pub(crate) async fn list_source(
        &self,
        url: &str,
        kind: PathKind,
    ) -> Result<Vec<FileDescriptor>, SyncError> {
        let listing_url = match kind {
            PathKind::Remote => self.service.to_listing_form(url)?,
            PathKind::Url | PathKind::Local => url.to_string(),
        };
        debug!("Listing {}", listing_url);
        self.remote.list(&listing_url).await
    }

    /// Execute a classified request: one of the three tree walks, or a
    /// single-file transfer when not recursive.
    pub async fn run(&self, req: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        let direction = req.validate()?;
        info!(
            "Starting {:?} (recursive={}) from {} to {}",
            direction, req.recursive, req.source, req.destination
        );
        let mode = req.root_mode();
        let name = req.new_name.as_deref();
        let source = req.source_str();
        let kind = req.source.kind();
        let mut response = None;

        let stats = match (direction, req.recursive) {
            (SyncDirection::Pull, true) => {
                let dest = local_destination(&req.destination)?;
                self.pull(source, kind, dest, mode, name).await?
            }
            (SyncDirection::Pull, false) => {
                let dest = local_destination(&req.destination)?;
                self.download_one(source, dest, name).await?
            }
            (SyncDirection::Push, true) => {
                self.push(Utf8Path::new(source), req.destination_str(), mode, name)
                    .await?
            }
            (SyncDirection::Push, false) => {
                self.upload_one(Utf8Path::new(source), req.destination_str(), name)
                    .await?
            }
            (SyncDirection::Import, true) => {
                self.import(source, kind, req.destination_str(), mode, name)
                    .await?
            }
            (SyncDirection::Import, false) => {
                let mut stats = SyncStats::default();
                self.note(
                    &mut stats,
                    0,
                    SyncAction::Import(TransferReason::New),
                    name.unwrap_or_else(|| basename(source)),
                );
                response = Some(
                    self.remote
                        .ingest(req.source.as_str(), req.destination_str(), name)
                        .await?,
                );
                stats
            }
        };

        info!("Finished {:?}: {} change(s)", direction, stats.changes());
        Ok(SyncOutcome {
            direction,
            stats,
            response,
        })
    }

    async fn download_one(
        &self,
        url: &str,
        dest: &Utf8Path,
        name: Option<&str>,
    ) -> Result<SyncStats, SyncError> {
        let (dir, file_name): (Utf8PathBuf, String) = if dest.is_dir() {
            (
                dest.to_owned(),
                name.unwrap_or_else(|| basename(url)).to_string(),
            )
        } else {
            let parent = dest.parent().unwrap_or(Utf8Path::new("."));
            let existing = dest.file_name().unwrap_or_else(|| basename(url));
            (parent.to_owned(), name.unwrap_or(existing).to_string())
        };
        let mut stats = SyncStats::default();
        self.note(
            &mut stats,
            0,
            SyncAction::Download(TransferReason::New),
            file_name.as_str(),
        );
        stats.bytes_transferred += self.remote.download(url, &dir, &file_name).await?;
        Ok(stats)
    }

    async fn upload_one(
        &self,
        source: &Utf8Path,
        dest_url: &str,
        name: Option<&str>,
    ) -> Result<SyncStats, SyncError> {
        let mut stats = SyncStats::default();
        let shown = name.unwrap_or_else(|| basename(source.as_str()));
        self.note(&mut stats, 0, SyncAction::Upload(TransferReason::New), shown);
        stats.bytes_transferred += self.remote.upload(source, dest_url, name).await?;
        Ok(stats)
    }
}

fn local_destination(path: &SyncPath) -> Result<&Utf8Path, SyncError> {
    match path {
        SyncPath::Local(p) => Ok(p.as_path()),
        other => Err(SyncError::TypeMismatch {
            path: other.to_string(),
            expected: PathKind::Local,
            actual: other.kind(),
        }),
    }
}
