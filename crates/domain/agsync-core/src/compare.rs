//! Existence, type, and modification-time comparisons between trees.

use agsync_config::{TIMESTAMP_FORMAT, TIMESTAMP_SUFFIX_LEN};
use camino::Utf8Path;
use chrono::{DateTime, Local, NaiveDateTime};

use crate::{FileDescriptor, Result, SyncError};

/// Both sides are files, or both are directories.
pub fn is_same_type(local: &Utf8Path, descriptor: &FileDescriptor) -> bool {
    (local.is_file() && descriptor.is_file()) || (local.is_dir() && descriptor.is_dir())
}

/// Local mtime as naive wall-clock time, comparable with remote timestamps.
pub fn local_mod_time(local: &Utf8Path) -> Result<NaiveDateTime> {
    let modified = std::fs::metadata(local)
        .and_then(|meta| meta.modified())
        .map_err(|e| SyncError::io(local, e))?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// Parse a `lastModified` value; the trailing offset suffix is dropped unread.
pub fn parse_remote_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let malformed = |detail: String| SyncError::MalformedTimestamp {
        value: raw.to_string(),
        detail,
    };
    let cut = raw
        .char_indices()
        .rev()
        .nth(TIMESTAMP_SUFFIX_LEN - 1)
        .map(|(idx, _)| idx)
        .ok_or_else(|| malformed(format!("shorter than {TIMESTAMP_SUFFIX_LEN} characters")))?;
    NaiveDateTime::parse_from_str(&raw[..cut], TIMESTAMP_FORMAT)
        .map_err(|e| malformed(e.to_string()))
}

pub fn remote_mod_time(descriptor: &FileDescriptor) -> Result<NaiveDateTime> {
    parse_remote_timestamp(&descriptor.last_modified)
}

pub fn remote_is_newer(local: &Utf8Path, descriptor: &FileDescriptor) -> Result<bool> {
    Ok(remote_mod_time(descriptor)? > local_mod_time(local)?)
}

pub fn remote_is_newer_than_remote(
    source: &FileDescriptor,
    destination: &FileDescriptor,
) -> Result<bool> {
    Ok(remote_mod_time(source)? > remote_mod_time(destination)?)
}
