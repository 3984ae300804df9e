use agsync_core::path::{trim_trailing_slash, PathKind, ServiceRoot, SyncPath};
use agsync_core::SyncError;
use serde::{Deserialize, Serialize};

pub mod engine;
pub mod events;
mod import;
pub mod local;
mod pull;
mod push;
pub mod remote;

pub use engine::SyncEngine;
pub use events::{EventSink, MemorySink, SyncAction, SyncEvent, TransferReason};
pub use remote::RemoteService;

/// Which tree is walked and in which direction data moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncDirection {
    /// Remote service or URL -> local filesystem.
    Pull,
    /// Local filesystem -> remote service.
    Push,
    /// Remote service or URL -> remote service, server side.
    Import,
}

impl SyncDirection {
    pub fn select(source: PathKind, destination: PathKind) -> Result<Self, SyncError> {
        match (source, destination) {
            (PathKind::Remote | PathKind::Url, PathKind::Local) => Ok(SyncDirection::Pull),
            (PathKind::Local, PathKind::Remote) => Ok(SyncDirection::Push),
            (PathKind::Remote | PathKind::Url, PathKind::Remote) => Ok(SyncDirection::Import),
            (s, d) => Err(SyncError::Usage(format!(
                "cannot have source type {s} and destination type {d}"
            ))),
        }
    }
}

/// How the top of a recursive source maps onto the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMode {
    /// `src` -> `dest/src/...`
    Nest,
    /// `src/` -> `dest/...`
    Contents,
}

#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub source: SyncPath,
    pub destination: SyncPath,
    pub recursive: bool,
    pub new_name: Option<String>,
}

impl SyncRequest {
    /// Classify raw CLI arguments and check their combination.
    pub fn resolve(
        source: &str,
        destination: &str,
        service: &ServiceRoot,
        recursive: bool,
        new_name: Option<String>,
    ) -> Result<Self, SyncError> {
        let req = Self {
            source: SyncPath::resolve(source, service)?,
            destination: SyncPath::resolve(destination, service)?,
            recursive,
            new_name,
        };
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> Result<SyncDirection, SyncError> {
        let direction = SyncDirection::select(self.source.kind(), self.destination.kind())?;
        if !self.recursive && self.source.has_trailing_slash() {
            return Err(SyncError::Usage(format!(
                "trailing slash on {} requires --recursive",
                self.source
            )));
        }
        if let SyncPath::Local(p) = &self.source {
            if self.recursive && !p.is_dir() {
                return Err(SyncError::Usage(format!(
                    "recursive source {p} is not a directory"
                )));
            }
            if !self.recursive && !p.is_file() {
                return Err(SyncError::Usage(format!(
                    "{p} is a directory (use --recursive)"
                )));
            }
        }
        Ok(direction)
    }

    pub fn root_mode(&self) -> RootMode {
        if self.source.has_trailing_slash() {
            RootMode::Contents
        } else {
            RootMode::Nest
        }
    }

    pub fn source_str(&self) -> &str {
        trim_trailing_slash(self.source.as_str())
    }

    pub fn destination_str(&self) -> &str {
        trim_trailing_slash(self.destination.as_str())
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub dirs_created: u64,
    pub files_downloaded: u64,
    pub files_touched: u64,
    pub files_uploaded: u64,
    pub files_imported: u64,
    pub skipped: u64,
    pub bytes_transferred: u64,
}

impl SyncStats {
    pub fn record(&mut self, event: &SyncEvent) {
        match event.action {
            SyncAction::MakeDir => self.dirs_created += 1,
            SyncAction::Exists | SyncAction::TypeConflict => self.skipped += 1,
            SyncAction::Download(_) => self.files_downloaded += 1,
            SyncAction::Touch(_) => self.files_touched += 1,
            SyncAction::Upload(_) => self.files_uploaded += 1,
            SyncAction::Import(_) => self.files_imported += 1,
        }
    }

    /// Number of calls that changed the destination.
    pub fn changes(&self) -> u64 {
        self.dirs_created
            + self.files_downloaded
            + self.files_touched
            + self.files_uploaded
            + self.files_imported
    }
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub direction: SyncDirection,
    pub stats: SyncStats,
    /// Service response of a single (non-recursive) import.
    pub response: Option<serde_json::Value>,
}
