#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use agsync_core::path::ServiceRoot;
use agsync_core::{EntryType, FileDescriptor, Operation, SyncError};
use agsync_pipeline::{MemorySink, RemoteService, SyncEngine};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Duration, Local, NaiveDateTime, TimeZone};
use filetime::FileTime;

pub const BASE: &str = "https://api.test";
pub const OLD: &str = "2020-01-01T00:00:00.000-06:00";
pub const FUTURE: &str = "2099-01-01T00:00:00.000-06:00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Download(String),
    Upload(String, String),
    Mkdir(String, String),
    Ingest(String, String, String),
}

impl Call {
    pub fn is_list(&self) -> bool {
        matches!(self, Call::List(_))
    }
}

#[derive(Default)]
struct Inner {
    dirs: Mutex<BTreeMap<String, Vec<FileDescriptor>>>,
    calls: Mutex<Vec<Call>>,
    fail_name: Mutex<Option<String>>,
}

/// In-memory files service keyed by system-relative directory path.
#[derive(Clone, Default)]
pub struct FakeFiles {
    inner: Arc<Inner>,
}

pub fn service() -> ServiceRoot {
    ServiceRoot::new(BASE)
}

pub fn media_url(key: &str) -> String {
    format!("{BASE}/files/v2/media/system/{key}")
}

fn key_of(url: &str) -> String {
    let media = service().to_media_form(url).unwrap_or_else(|_| url.to_string());
    media
        .strip_prefix(&format!("{BASE}/files/v2/media/system/"))
        .unwrap_or(&media)
        .trim_end_matches('/')
        .to_string()
}

fn stamp_now() -> String {
    let at = Local::now().naive_local() + Duration::seconds(2);
    format!("{}.000-06:00", at.format("%Y-%m-%dT%H:%M:%S"))
}

pub fn marker(key: &str) -> FileDescriptor {
    FileDescriptor {
        name: ".".into(),
        entry_type: EntryType::Dir,
        path: format!("/{key}"),
        last_modified: OLD.into(),
        length: Some(4096),
    }
}

pub fn file_entry(dir: &str, name: &str, length: u64, last_modified: &str) -> FileDescriptor {
    FileDescriptor {
        name: name.into(),
        entry_type: EntryType::File,
        path: format!("/{dir}/{name}"),
        last_modified: last_modified.into(),
        length: Some(length),
    }
}

impl FakeFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory (and link it into its parent's listing if present).
    pub fn dir(&self, key: &str) -> &Self {
        let mut dirs = self.inner.dirs.lock().unwrap();
        if dirs.contains_key(key) {
            return self;
        }
        dirs.insert(key.to_string(), vec![marker(key)]);
        if let Some((parent, name)) = key.rsplit_once('/') {
            if let Some(listing) = dirs.get_mut(parent) {
                listing.push(FileDescriptor {
                    name: name.into(),
                    entry_type: EntryType::Dir,
                    path: format!("/{key}"),
                    last_modified: OLD.into(),
                    length: Some(4096),
                });
            }
        }
        self
    }

    pub fn file(&self, dir: &str, name: &str, length: u64, last_modified: &str) -> &Self {
        let mut dirs = self.inner.dirs.lock().unwrap();
        let listing = dirs.get_mut(dir).expect("directory registered first");
        listing.retain(|e| e.name != name);
        listing.push(file_entry(dir, name, length, last_modified));
        self
    }

    /// Replace a directory listing verbatim, e.g. to reorder entries.
    pub fn raw_listing(&self, key: &str, entries: Vec<FileDescriptor>) -> &Self {
        self.inner
            .dirs
            .lock()
            .unwrap()
            .insert(key.to_string(), entries);
        self
    }

    pub fn fail_transfers_of(&self, name: &str) {
        *self.inner.fail_name.lock().unwrap() = Some(name.to_string());
    }

    pub fn listing(&self, key: &str) -> Option<Vec<FileDescriptor>> {
        self.inner.dirs.lock().unwrap().get(key).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Calls that change something (everything but listings).
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !c.is_list()).collect()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.inner.calls.lock().unwrap().push(call);
    }

    fn check_fail(&self, op: Operation, name: &str, url: &str) -> Result<(), SyncError> {
        if self.inner.fail_name.lock().unwrap().as_deref() == Some(name) {
            return Err(SyncError::transfer(op, url, "status code 500, not 202"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteService for FakeFiles {
    async fn list(&self, listing_url: &str) -> Result<Vec<FileDescriptor>, SyncError> {
        assert!(
            listing_url.contains("/files/v2/listings/"),
            "listing requested on non-listing url {listing_url}"
        );
        let key = key_of(listing_url);
        self.record(Call::List(key.clone()));
        self.listing(&key).ok_or_else(|| SyncError::Listing {
            url: listing_url.to_string(),
            reason: "status code 404".into(),
        })
    }

    async fn download(
        &self,
        url: &str,
        dest_dir: &Utf8Path,
        name: &str,
    ) -> Result<u64, SyncError> {
        let key = key_of(url);
        self.record(Call::Download(key.clone()));
        self.check_fail(Operation::Download, name, url)?;
        let body = format!("remote:{key}");
        std::fs::write(dest_dir.join(name), &body).map_err(|e| SyncError::io(dest_dir, e))?;
        Ok(body.len() as u64)
    }

    async fn upload(
        &self,
        local: &Utf8Path,
        dir_url: &str,
        new_name: Option<&str>,
    ) -> Result<u64, SyncError> {
        let key = key_of(dir_url);
        let name = new_name
            .or_else(|| local.file_name())
            .unwrap_or_default()
            .to_string();
        self.record(Call::Upload(key.clone(), name.clone()));
        self.check_fail(Operation::Upload, &name, dir_url)?;
        let len = std::fs::metadata(local)
            .map_err(|e| SyncError::io(local, e))?
            .len();
        self.file(&key, &name, len, &stamp_now());
        Ok(len)
    }

    async fn mkdir(&self, name: &str, parent_url: &str) -> Result<(), SyncError> {
        let parent = key_of(parent_url);
        self.record(Call::Mkdir(parent.clone(), name.to_string()));
        self.check_fail(Operation::Mkdir, name, parent_url)?;
        self.dir(&format!("{parent}/{name}"));
        Ok(())
    }

    async fn ingest(
        &self,
        source: &str,
        dir_url: &str,
        file_name: Option<&str>,
    ) -> Result<serde_json::Value, SyncError> {
        let key = key_of(dir_url);
        let name = file_name.unwrap_or_default().to_string();
        self.record(Call::Ingest(source.to_string(), key.clone(), name.clone()));
        self.check_fail(Operation::Import, &name, dir_url)?;
        if self.listing(&key).is_some() {
            self.file(&key, &name, 1, &stamp_now());
        }
        Ok(serde_json::json!({"status": "success"}))
    }
}

pub fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

/// Pin a local mtime to a wall-clock `YYYY-MM-DDTHH:MM:SS` in the local zone.
pub fn pin_mtime(path: &Utf8Path, stamp: &str) {
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S").unwrap();
    let local = Local.from_local_datetime(&naive).earliest().unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(local.timestamp(), 0)).unwrap();
}

/// Engine wired to `fake`, with a sink that keeps every decision.
pub fn engine(fake: &FakeFiles) -> (SyncEngine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let engine = SyncEngine::with_components(Box::new(fake.clone()), service(), sink.clone());
    (engine, sink)
}
