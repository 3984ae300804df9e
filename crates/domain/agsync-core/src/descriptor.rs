use std::collections::HashMap;

use agsync_config::SELF_MARKER;
use serde::{Deserialize, Serialize};

use crate::path::basename;
use crate::{Result, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub path: String,
    pub last_modified: String,
    #[serde(default)]
    pub length: Option<u64>,
}

impl FileDescriptor {
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    /// The `.` entry stands for the listed directory, not a child of it.
    pub fn is_self_marker(&self) -> bool {
        self.is_dir() && self.name == SELF_MARKER
    }

    /// Name of the directory a self-marker describes.
    pub fn dir_name(&self) -> &str {
        basename(&self.path)
    }

    pub fn is_empty_file(&self) -> bool {
        self.is_file() && self.length == Some(0)
    }
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    result: Option<Vec<FileDescriptor>>,
}

/// Decode a listing payload, keeping the service's entry order.
pub fn parse_listing(url: &str, body: &[u8]) -> Result<Vec<FileDescriptor>> {
    let response: ListingResponse =
        serde_json::from_slice(body).map_err(|e| SyncError::MalformedResponse {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
    response.result.ok_or_else(|| SyncError::MalformedResponse {
        url: url.to_string(),
        detail: "missing key \"result\"".to_string(),
    })
}

pub type NameMap = HashMap<String, FileDescriptor>;

pub fn to_name_map(entries: Vec<FileDescriptor>) -> NameMap {
    entries.into_iter().map(|d| (d.name.clone(), d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "status": "success",
        "result": [
            {"name": ".", "type": "dir", "path": "user/project", "lastModified": "2024-03-01T10:00:00.000-06:00", "length": 4096, "permissions": "ALL"},
            {"name": "a.txt", "type": "file", "path": "user/project/a.txt", "lastModified": "2024-03-01T10:05:00.000-06:00", "length": 0},
            {"name": "nested", "type": "dir", "path": "user/project/nested", "lastModified": "2024-03-01T09:00:00.000-06:00"}
        ]
    }"#;

    #[test]
    fn parse_listing_preserves_order_and_ignores_extra_fields() {
        let entries = parse_listing("u", LISTING.as_bytes()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".", "a.txt", "nested"]);
        assert!(entries[0].is_self_marker());
        assert_eq!(entries[0].dir_name(), "project");
        assert!(entries[1].is_empty_file());
        assert_eq!(entries[2].length, None);
    }

    #[test]
    fn missing_result_key_is_malformed() {
        let err = parse_listing("https://x/listings/a", br#"{"status":"error"}"#).unwrap_err();
        match err {
            SyncError::MalformedResponse { url, detail } => {
                assert_eq!(url, "https://x/listings/a");
                assert!(detail.contains("result"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_listing("u", b"<html>").unwrap_err();
        assert!(matches!(err, SyncError::MalformedResponse { .. }));
    }

    #[test]
    fn name_map_keys_by_entry_name() {
        let map = to_name_map(parse_listing("u", LISTING.as_bytes()).unwrap());
        assert_eq!(map.len(), 3);
        assert_eq!(map["nested"].entry_type, EntryType::Dir);
        assert!(map.contains_key("."));
    }

    #[test]
    fn dot_file_is_not_a_self_marker() {
        let d = FileDescriptor {
            name: ".".into(),
            entry_type: EntryType::File,
            path: "x/.".into(),
            last_modified: String::new(),
            length: Some(1),
        };
        assert!(!d.is_self_marker());
    }
}
