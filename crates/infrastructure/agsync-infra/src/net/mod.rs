use std::time::Duration;

use agsync_config::{
    IMPORT_STATUS, MKDIR_STATUS, PARTIAL_DOWNLOAD_EXTENSION, UPLOAD_FIELD, UPLOAD_STATUS,
};
use agsync_core::descriptor::parse_listing;
use agsync_core::path::{basename, safe_entry_name};
use agsync_core::{FileDescriptor, Operation, SyncError};
use camino::{Utf8Path, Utf8PathBuf};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::credentials::Session;

pub fn default_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("agsync/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .build()
}

/// Thin request helpers for the files service. Every call is awaited to
/// completion and never retried.
pub struct ApiClient {
    client: Client,
    session: Session,
}

fn status_mismatch(resp: &Response, expected: u16) -> String {
    format!("status code {}, not {expected}", resp.status().as_u16())
}

impl ApiClient {
    pub fn new(client: Client, session: Session) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(self.session.access_token())
    }

    /// GET a listing-form URL and decode its entries in service order.
    pub async fn list(&self, url: &str) -> Result<Vec<FileDescriptor>, SyncError> {
        let listing_err = |reason: String| SyncError::Listing {
            url: url.to_string(),
            reason,
        };
        let resp = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| listing_err(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(listing_err(format!("status code {}", resp.status().as_u16())));
        }
        let body = resp.bytes().await.map_err(|e| listing_err(e.to_string()))?;
        parse_listing(url, &body)
    }

    /// Stream `url` into `dest_dir/name` through a `.part` sibling.
    pub async fn download(
        &self,
        url: &str,
        dest_dir: &Utf8Path,
        name: &str,
    ) -> Result<u64, SyncError> {
        let name = safe_entry_name(name)?;
        let resp = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| SyncError::transfer(Operation::Download, url, e.to_string()))?;
        if resp.status() != StatusCode::OK {
            return Err(SyncError::transfer(
                Operation::Download,
                url,
                status_mismatch(&resp, StatusCode::OK.as_u16()),
            ));
        }

        let target = dest_dir.join(name);
        let tmp = Utf8PathBuf::from(format!("{target}.{PARTIAL_DOWNLOAD_EXTENSION}"));
        let written = match write_body(url, resp, &tmp).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&tmp).await;
                return Err(e);
            }
        };
        tokio::fs::rename(&tmp, &target)
            .await
            .map_err(|e| SyncError::io(&target, e))?;
        debug!("Downloaded {} ({} bytes) to {}", url, written, target);
        Ok(written)
    }

    /// Multipart POST of a local file into the directory at `url`.
    pub async fn upload(
        &self,
        local: &Utf8Path,
        url: &str,
        new_name: Option<&str>,
    ) -> Result<u64, SyncError> {
        if !local.is_file() {
            return Err(SyncError::InvalidPath(format!(
                "local file {local} does not exist or is a directory"
            )));
        }
        let name = new_name.unwrap_or_else(|| basename(local.as_str())).to_string();
        let file = File::open(local)
            .await
            .map_err(|e| SyncError::io(local, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| SyncError::io(local, e))?
            .len();
        let part = Part::stream_with_length(Body::from(file), size).file_name(name);
        let form = Form::new().part(UPLOAD_FIELD, part);

        let resp = self
            .authorized(self.client.post(url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SyncError::transfer(Operation::Upload, url, e.to_string()))?;
        if resp.status().as_u16() != UPLOAD_STATUS {
            return Err(SyncError::transfer(
                Operation::Upload,
                url,
                status_mismatch(&resp, UPLOAD_STATUS),
            ));
        }
        debug!("Uploaded {} ({} bytes) to {}", local, size, url);
        Ok(size)
    }

    /// Create directory `name` inside the directory at `url`.
    pub async fn mkdir(&self, name: &str, url: &str) -> Result<(), SyncError> {
        let resp = self
            .authorized(self.client.put(url))
            .form(&[("action", "mkdir"), ("path", name)])
            .send()
            .await
            .map_err(|e| SyncError::transfer(Operation::Mkdir, url, e.to_string()))?;
        if resp.status().as_u16() != MKDIR_STATUS {
            return Err(SyncError::transfer(
                Operation::Mkdir,
                format!("{url} ({name})"),
                status_mismatch(&resp, MKDIR_STATUS),
            ));
        }
        Ok(())
    }

    /// Ask the service to fetch `source` into the directory at `url`.
    pub async fn ingest(
        &self,
        source: &str,
        url: &str,
        file_name: Option<&str>,
    ) -> Result<serde_json::Value, SyncError> {
        let mut fields = vec![("urlToIngest", source)];
        if let Some(name) = file_name {
            fields.push(("fileName", name));
        }
        let resp = self
            .authorized(self.client.post(url))
            .form(&fields)
            .send()
            .await
            .map_err(|e| SyncError::transfer(Operation::Import, url, e.to_string()))?;
        if resp.status().as_u16() != IMPORT_STATUS {
            return Err(SyncError::transfer(
                Operation::Import,
                url,
                status_mismatch(&resp, IMPORT_STATUS),
            ));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| SyncError::transfer(Operation::Import, url, e.to_string()))?;
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}

async fn write_body(url: &str, resp: Response, tmp: &Utf8Path) -> Result<u64, SyncError> {
    let mut file = File::create(tmp).await.map_err(|e| SyncError::io(tmp, e))?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| SyncError::transfer(Operation::Download, url, e.to_string()))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| SyncError::io(tmp, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| SyncError::io(tmp, e))?;
    Ok(written)
}
