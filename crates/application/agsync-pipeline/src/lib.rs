pub mod sync;

// Re-export the engine and its request/response types
pub use sync::{
    EventSink, MemorySink, RemoteService, RootMode, SyncAction, SyncDirection, SyncEngine,
    SyncEvent, SyncOutcome, SyncRequest, SyncStats, TransferReason,
};

pub use agsync_core::{SyncError, SyncErrorKind};
