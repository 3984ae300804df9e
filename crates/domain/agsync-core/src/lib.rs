pub mod compare;
pub mod descriptor;
pub mod error;
pub mod path;

pub use descriptor::{to_name_map, EntryType, FileDescriptor, NameMap};
pub use error::{Operation, SyncError, SyncErrorKind};
pub use path::{classify, PathKind, ServiceRoot, SyncPath};

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
