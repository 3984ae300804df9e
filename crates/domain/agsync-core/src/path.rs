use std::fmt;

use agsync_config::{LISTINGS_SEGMENT, MEDIA_SEGMENT, REMOTE_SCHEME, SYSTEM_SEGMENT};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::{Result, SyncError};

/// Characters escaped when a single entry name is appended to a service URL.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Local,
    Remote,
    Url,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PathKind::Local => "local",
            PathKind::Remote => "agave",
            PathKind::Url => "url",
        };
        f.write_str(name)
    }
}

/// Kind implied by the scheme alone, without touching the filesystem.
fn scheme_kind(raw: &str) -> Option<PathKind> {
    if raw.starts_with(REMOTE_SCHEME) {
        return Some(PathKind::Remote);
    }
    let (scheme, rest) = raw.split_once("://")?;
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let has_host = rest.split('/').next().is_some_and(|host| !host.is_empty());
    (valid_scheme && has_host).then_some(PathKind::Url)
}

/// Classify a user-supplied path. Remote scheme wins over generic URLs; anything
/// else must exist on disk.
pub fn classify(raw: &str) -> Result<PathKind> {
    if let Some(kind) = scheme_kind(raw) {
        return Ok(kind);
    }
    let local = Utf8Path::new(raw);
    if local.is_file() || local.is_dir() {
        Ok(PathKind::Local)
    } else {
        Err(SyncError::InvalidPath(format!(
            "{raw} is not an {REMOTE_SCHEME} path, a URL, or an existing local path"
        )))
    }
}

/// A classified path. Remote paths hold their canonical media-form URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPath {
    Local(Utf8PathBuf),
    Remote(String),
    Url(String),
}

impl SyncPath {
    pub fn resolve(raw: &str, service: &ServiceRoot) -> Result<Self> {
        match classify(raw)? {
            PathKind::Local => Ok(SyncPath::Local(Utf8PathBuf::from(raw))),
            PathKind::Remote => Ok(SyncPath::Remote(service.build_remote_path(raw)?)),
            PathKind::Url => Ok(SyncPath::Url(raw.to_string())),
        }
    }

    pub fn kind(&self) -> PathKind {
        match self {
            SyncPath::Local(_) => PathKind::Local,
            SyncPath::Remote(_) => PathKind::Remote,
            SyncPath::Url(_) => PathKind::Url,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SyncPath::Local(p) => p.as_str(),
            SyncPath::Remote(s) | SyncPath::Url(s) => s,
        }
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.as_str().len() > 1 && self.as_str().ends_with('/')
    }
}

impl fmt::Display for SyncPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API base of the files service, e.g. `https://api.example.org`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRoot {
    base: String,
}

impl ServiceRoot {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn media_root(&self) -> String {
        format!("{}{}", self.base, MEDIA_SEGMENT)
    }

    fn listings_root(&self) -> String {
        format!("{}{}", self.base, LISTINGS_SEGMENT)
    }

    /// `agave://sys/dir` -> `<base>/files/v2/media/system/sys/dir`.
    pub fn build_remote_path(&self, shorthand: &str) -> Result<String> {
        let Some(rest) = shorthand.strip_prefix(REMOTE_SCHEME) else {
            return Err(SyncError::TypeMismatch {
                path: shorthand.to_string(),
                expected: PathKind::Remote,
                actual: scheme_kind(shorthand).unwrap_or(PathKind::Local),
            });
        };
        Ok(format!("{}{}{}", self.media_root(), SYSTEM_SEGMENT, rest))
    }

    pub fn to_listing_form(&self, canonical: &str) -> Result<String> {
        swap_root(canonical, &self.media_root(), &self.listings_root())
    }

    pub fn to_media_form(&self, listing: &str) -> Result<String> {
        swap_root(listing, &self.listings_root(), &self.media_root())
    }
}

fn swap_root(url: &str, from: &str, to: &str) -> Result<String> {
    match url.strip_prefix(from) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => Ok(format!("{to}{rest}")),
        _ => Err(SyncError::InvalidPath(format!(
            "{url} does not start with {from}"
        ))),
    }
}

/// Append one entry name to a service URL.
pub fn join_url(base: &str, name: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        utf8_percent_encode(name, SEGMENT)
    )
}

/// Last non-empty segment of a slash-separated path or URL.
pub fn basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

pub fn trim_trailing_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        path
    } else {
        trimmed
    }
}

/// Check that a service-supplied entry name is a single plain path component,
/// so joining it onto a local directory cannot leave that directory.
pub fn safe_entry_name(name: &str) -> Result<&str> {
    let mut components = Utf8Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(part)), None) if part == name
    );
    if single && !name.contains('\\') {
        Ok(name)
    } else {
        Err(SyncError::InvalidPath(format!(
            "Security: entry name {name:?} is not a plain file name"
        )))
    }
}
