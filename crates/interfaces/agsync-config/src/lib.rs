//! Central configuration constants for the files service and the sync engine.

/// Scheme prefix that marks a path as living on the remote files service.
pub const REMOTE_SCHEME: &str = "agave://";

/// Path segment of media (download/upload) endpoints, relative to the API base.
pub const MEDIA_SEGMENT: &str = "/files/v2/media";

/// Path segment of listing endpoints, relative to the API base.
pub const LISTINGS_SEGMENT: &str = "/files/v2/listings";

/// Storage-system prefix appended after the media segment for shorthand paths.
pub const SYSTEM_SEGMENT: &str = "/system/";

/// Listing entry name that denotes the listed directory itself.
pub const SELF_MARKER: &str = ".";

/// Date-time layout of `lastModified` once the offset suffix is removed.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Width of the trailing `lastModified` suffix (e.g. `.000-05:00`) that is discarded.
pub const TIMESTAMP_SUFFIX_LEN: usize = 10;

/// Status expected from a multipart upload.
pub const UPLOAD_STATUS: u16 = 202;

/// Status expected from a directory creation.
pub const MKDIR_STATUS: u16 = 201;

/// Status expected from an ingest-by-URL import.
pub const IMPORT_STATUS: u16 = 202;

/// Multipart field carrying uploaded bytes.
pub const UPLOAD_FIELD: &str = "fileToUpload";

/// Credential cache location, relative to the home directory.
pub const CREDENTIALS_RELATIVE_PATH: &str = ".agave/current";

/// Environment variable that overrides the cached access token.
pub const ENV_ACCESS_TOKEN: &str = "AGAVE_ACCESS_TOKEN";

/// Environment variable that overrides the cached API base URL.
pub const ENV_BASE_URL: &str = "AGAVE_BASEURL";

/// Environment variable naming an alternative credential cache file.
pub const ENV_CREDENTIALS_FILE: &str = "AGSYNC_CREDENTIALS";

/// Suffix of the temporary file a download is streamed into before rename.
pub const PARTIAL_DOWNLOAD_EXTENSION: &str = "part";
