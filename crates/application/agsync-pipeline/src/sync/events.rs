//! Per-entry decisions of a traversal and the sinks that receive them.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferReason {
    New,
    Modified,
}

impl fmt::Display for TransferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferReason::New => f.write_str("new"),
            TransferReason::Modified => f.write_str("modified"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncAction {
    MakeDir,
    Exists,
    /// Same name, different entry type on each side; left alone.
    TypeConflict,
    Download(TransferReason),
    /// Zero-length remote file recreated locally without a download.
    Touch(TransferReason),
    Upload(TransferReason),
    Import(TransferReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub depth: usize,
    pub action: SyncAction,
    /// Entry name, or the full destination path for `MakeDir`.
    pub name: String,
}

impl SyncEvent {
    pub fn new(depth: usize, action: SyncAction, name: impl Into<String>) -> Self {
        Self {
            depth,
            action,
            name: name.into(),
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        match self.action {
            SyncAction::MakeDir => write!(f, "mkdir {name}"),
            SyncAction::Exists => write!(f, "skipping {name} (exists)"),
            SyncAction::TypeConflict => write!(f, "skipping {name} (type differs)"),
            SyncAction::Download(r) => write!(f, "downloading {name} ({r})"),
            SyncAction::Touch(r) => write!(f, "touching {name} ({r}, empty)"),
            SyncAction::Upload(r) => write!(f, "uploading {name} ({r})"),
            SyncAction::Import(r) => write!(f, "importing {name} ({r})"),
        }
    }
}

/// Receives every decision as it is made, before the matching request runs.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Keeps every decision in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<SyncEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
